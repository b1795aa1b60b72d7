//! Module declaration discovery
//!
//! Parses a module and collects every top-level `import` and `export`
//! declaration together with the byte range the code generator has to
//! rewrite. Everything else in the module is left untouched.

use std::ops::Range;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclaration, ImportDeclarationSpecifier,
    ModuleDeclaration as AstDeclaration, Program,
};
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use crate::error::AnalysisError;

/// A binding introduced by `import { imported as local }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportSpecifier {
    pub(crate) imported: String,
    pub(crate) local: String,
}

/// A name published by `export { local as exported }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportSpecifier {
    pub(crate) local: String,
    pub(crate) exported: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ImportClause {
    pub(crate) default: Option<String>,
    pub(crate) namespace: Option<String>,
    pub(crate) named: Vec<ImportSpecifier>,
}

impl ImportClause {
    pub(crate) fn is_empty(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeclarationKind {
    /// `import ... from "source"` or `import "source"`
    Import { source: String, clause: ImportClause },
    /// `export { a, b as c }` with an optional `from "source"`
    ExportNamed {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    /// `export * from "source"` or `export * as name from "source"`
    ExportAll {
        source: String,
        alias: Option<String>,
    },
    /// `export function f`, `export class C`, `export const a = ...`;
    /// the range covers only the `export` keyword and the space after it
    ExportDeclaration { names: Vec<String> },
    /// `export default function f` or `export default class C`;
    /// the range covers `export default` and the space after it
    ExportDefaultDeclaration { name: String },
    /// `export default <expression>`, including anonymous functions and
    /// classes; the range ends where the expression starts
    ExportDefaultExpression,
}

/// One module declaration and the source range it occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModuleDeclaration {
    pub(crate) range: Range<usize>,
    pub(crate) kind: DeclarationKind,
}

impl ModuleDeclaration {
    /// Module this declaration loads, if any
    pub(crate) fn source(&self) -> Option<&str> {
        match &self.kind {
            DeclarationKind::Import { source, .. } | DeclarationKind::ExportAll { source, .. } => {
                Some(source)
            }
            DeclarationKind::ExportNamed { source, .. } => source.as_deref(),
            DeclarationKind::ExportDeclaration { .. }
            | DeclarationKind::ExportDefaultDeclaration { .. }
            | DeclarationKind::ExportDefaultExpression => None,
        }
    }
}

/// All module declarations of one source file, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ModuleSyntax {
    pub(crate) declarations: Vec<ModuleDeclaration>,
    /// Byte length of a leading `#!` line
    pub(crate) hashbang_len: usize,
}

impl ModuleSyntax {
    /// Import targets in the order they appear, duplicates preserved
    pub(crate) fn import_targets(&self) -> Vec<String> {
        self.declarations
            .iter()
            .filter_map(ModuleDeclaration::source)
            .map(str::to_owned)
            .collect()
    }

    pub(crate) fn has_exports(&self) -> bool {
        self.declarations
            .iter()
            .any(|declaration| !matches!(declaration.kind, DeclarationKind::Import { .. }))
    }
}

pub(crate) fn parse_module(source: &str) -> Result<ModuleSyntax, AnalysisError> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = parsed.errors.first() {
        return Err(diagnostic_error(source, error));
    }
    if parsed.panicked {
        return Err(AnalysisError::new("unrecoverable syntax error", 1));
    }
    collect_declarations(source, &parsed.program)
}

fn collect_declarations(source: &str, program: &Program<'_>) -> Result<ModuleSyntax, AnalysisError> {
    let mut declarations = Vec::new();
    for statement in &program.body {
        if let Some(declaration) = statement.as_module_declaration() {
            declarations.push(lower_declaration(source, declaration)?);
        }
    }
    Ok(ModuleSyntax {
        declarations,
        hashbang_len: program
            .hashbang
            .as_ref()
            .map_or(0, |hashbang| hashbang.span.end as usize),
    })
}

fn lower_declaration(
    source: &str,
    declaration: &AstDeclaration<'_>,
) -> Result<ModuleDeclaration, AnalysisError> {
    let (range, kind) = match declaration {
        AstDeclaration::ImportDeclaration(import) => (
            range(import.span),
            DeclarationKind::Import {
                source: import.source.value.to_string(),
                clause: import_clause(import),
            },
        ),
        AstDeclaration::ExportAllDeclaration(export) => (
            range(export.span),
            DeclarationKind::ExportAll {
                source: export.source.value.to_string(),
                alias: export.exported.as_ref().map(|name| name.name().to_string()),
            },
        ),
        AstDeclaration::ExportNamedDeclaration(export) => match &export.declaration {
            Some(inner) => {
                let Some(names) = declared_names(inner) else {
                    return Err(unsupported(source, export.span));
                };
                (
                    export.span.start as usize..inner.span().start as usize,
                    DeclarationKind::ExportDeclaration { names },
                )
            }
            None => (
                range(export.span),
                DeclarationKind::ExportNamed {
                    specifiers: export
                        .specifiers
                        .iter()
                        .map(|specifier| ExportSpecifier {
                            local: specifier.local.name().to_string(),
                            exported: specifier.exported.name().to_string(),
                        })
                        .collect(),
                    source: export.source.as_ref().map(|source| source.value.to_string()),
                },
            ),
        },
        AstDeclaration::ExportDefaultDeclaration(export) => {
            let (name, body) = match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(function) => (
                    function.id.as_ref().map(|id| id.name.to_string()),
                    function.span,
                ),
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    (class.id.as_ref().map(|id| id.name.to_string()), class.span)
                }
                other => match other.as_expression() {
                    Some(expression) => (None, expression.span()),
                    None => return Err(unsupported(source, export.span)),
                },
            };
            let range = export.span.start as usize..body.start as usize;
            match name {
                Some(name) => (range, DeclarationKind::ExportDefaultDeclaration { name }),
                None => (range, DeclarationKind::ExportDefaultExpression),
            }
        }
        other => return Err(unsupported(source, other.span())),
    };
    Ok(ModuleDeclaration { range, kind })
}

fn import_clause(import: &ImportDeclaration<'_>) -> ImportClause {
    let mut clause = ImportClause::default();
    let Some(specifiers) = &import.specifiers else {
        return clause;
    };
    for specifier in specifiers.iter() {
        match specifier {
            ImportDeclarationSpecifier::ImportSpecifier(named) => {
                clause.named.push(ImportSpecifier {
                    imported: named.imported.name().to_string(),
                    local: named.local.name.to_string(),
                });
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(default) => {
                clause.default = Some(default.local.name.to_string());
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace) => {
                clause.namespace = Some(namespace.local.name.to_string());
            }
        }
    }
    clause
}

/// Bindings created by an exported declaration, destructured ones included
fn declared_names(declaration: &Declaration<'_>) -> Option<Vec<String>> {
    match declaration {
        Declaration::VariableDeclaration(variables) => Some(
            variables
                .declarations
                .iter()
                .flat_map(|declarator| declarator.id.get_binding_identifiers())
                .map(|binding| binding.name.to_string())
                .collect(),
        ),
        Declaration::FunctionDeclaration(function) => {
            function.id.as_ref().map(|id| vec![id.name.to_string()])
        }
        Declaration::ClassDeclaration(class) => {
            class.id.as_ref().map(|id| vec![id.name.to_string()])
        }
        _ => None,
    }
}

fn range(span: Span) -> Range<usize> {
    span.start as usize..span.end as usize
}

fn unsupported(source: &str, span: Span) -> AnalysisError {
    AnalysisError::new(
        "unsupported module declaration",
        line_at(source, span.start as usize),
    )
}

fn diagnostic_error(source: &str, error: &OxcDiagnostic) -> AnalysisError {
    let offset = error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map_or(0, |label| label.offset());
    AnalysisError::new(error.message.to_string(), line_at(source, offset))
}

/// 1-based line containing byte `offset`
fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|byte| **byte == b'\n').count() + 1
}
