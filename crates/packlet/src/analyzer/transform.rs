//! Rewrites module declarations into the loader's calling convention
//!
//! Every module body runs with exactly three bindings: `localRequire`,
//! `module` and `exports`. Imports become `localRequire` calls bound with
//! `const`, and exported names become enumerable getters on `exports` that are
//! installed before the body runs, so hoisted functions and later
//! assignments are both visible to importers.

use std::fmt::Write;

use oxc_syntax::identifier::is_identifier_name;

use super::syntax::{DeclarationKind, ImportClause, ModuleSyntax};
use crate::util::js_string_literal as quote;

/// Rewrite `source` using the declarations found in it
pub(crate) fn compile_module(source: &str, syntax: &ModuleSyntax) -> String {
    let mut emitter = BodyEmitter::default();
    let mut body = String::with_capacity(source.len());
    let mut cursor = 0;

    if syntax.hashbang_len > 0 {
        // Keep the line, but as a comment so it is legal inside a function
        body.push_str("//");
        body.push_str(&source[2..syntax.hashbang_len]);
        cursor = syntax.hashbang_len;
    }

    for declaration in &syntax.declarations {
        body.push_str(&source[cursor..declaration.range.start]);
        let replaced = &source[declaration.range.clone()];
        body.push_str(&emitter.rewrite(&declaration.kind));
        // Keep line numbers stable for error messages from the bundle
        for _ in replaced.matches('\n') {
            body.push('\n');
        }
        cursor = declaration.range.end;
    }
    body.push_str(&source[cursor..]);

    if !syntax.has_exports() {
        return body;
    }

    // The getters share the first line with the body
    let mut output = String::with_capacity(body.len() + 128 * (emitter.getters.len() + 1));
    output.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });");
    for (exported, expression) in &emitter.getters {
        let _ = write!(
            output,
            " Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ \
             return {expression}; }} }});",
            quote(exported)
        );
    }
    output.push(' ');
    output.push_str(&body);
    output
}

/// Accumulates generated names and export getters while rewriting
#[derive(Debug, Default)]
struct BodyEmitter {
    /// Exported name -> expression reading its current value
    getters: Vec<(String, String)>,
    next_temp: usize,
}

impl BodyEmitter {
    fn temp(&mut self, prefix: &str) -> String {
        let name = format!("__{prefix}_{}__", self.next_temp);
        self.next_temp += 1;
        name
    }

    fn export(&mut self, exported: &str, expression: String) {
        self.getters.push((exported.to_owned(), expression));
    }

    fn rewrite(&mut self, kind: &DeclarationKind) -> String {
        match kind {
            DeclarationKind::Import { source, clause } => self.rewrite_import(source, clause),
            DeclarationKind::ExportNamed {
                specifiers,
                source: None,
            } => {
                for specifier in specifiers {
                    self.export(&specifier.exported, specifier.local.clone());
                }
                String::new()
            }
            DeclarationKind::ExportNamed {
                specifiers,
                source: Some(source),
            } => {
                let temp = self.temp("reexport");
                for specifier in specifiers {
                    let expression = format!("{temp}{}", member(&specifier.local));
                    self.export(&specifier.exported, expression);
                }
                format!("const {temp} = localRequire({});", quote(source))
            }
            DeclarationKind::ExportAll {
                source,
                alias: Some(alias),
            } => {
                let temp = self.temp("reexport");
                self.export(alias, temp.clone());
                format!("const {temp} = localRequire({});", quote(source))
            }
            DeclarationKind::ExportAll {
                source,
                alias: None,
            } => {
                let temp = self.temp("reexport");
                format!(
                    "const {temp} = localRequire({source}); Object.keys({temp}).forEach(function \
                     (key) {{ if (key === \"default\" || key === \"__esModule\" || \
                     Object.prototype.hasOwnProperty.call(exports, key)) return; \
                     Object.defineProperty(exports, key, {{ enumerable: true, get: function () \
                     {{ return {temp}[key]; }} }}); }});",
                    source = quote(source)
                )
            }
            DeclarationKind::ExportDeclaration { names } => {
                for name in names {
                    self.export(name, name.clone());
                }
                String::new()
            }
            DeclarationKind::ExportDefaultDeclaration { name } => {
                self.export("default", name.clone());
                String::new()
            }
            DeclarationKind::ExportDefaultExpression => "exports.default = ".to_owned(),
        }
    }

    fn rewrite_import(&mut self, source: &str, clause: &ImportClause) -> String {
        let call = format!("localRequire({})", quote(source));
        if clause.is_empty() {
            return format!("{call};");
        }
        if clause.default.is_none() && clause.namespace.is_none() {
            return format!("const {} = {call};", destructure(clause));
        }

        let temp = self.temp("import");
        let mut out = format!("const {temp} = {call};");
        if let Some(default) = &clause.default {
            let _ = write!(
                out,
                " const {default} = {temp} && {temp}.__esModule ? {temp}.default : {temp};"
            );
        }
        if let Some(namespace) = &clause.namespace {
            let _ = write!(out, " const {namespace} = {temp};");
        }
        if !clause.named.is_empty() {
            let _ = write!(out, " const {} = {temp};", destructure(clause));
        }
        out
    }
}

/// `{ a, b: c, "d-e": de }` for the named bindings of an import
fn destructure(clause: &ImportClause) -> String {
    let bindings: Vec<String> = clause
        .named
        .iter()
        .map(|specifier| {
            if specifier.imported == specifier.local {
                specifier.local.clone()
            } else {
                format!("{}: {}", property_key(&specifier.imported), specifier.local)
            }
        })
        .collect();
    format!("{{ {} }}", bindings.join(", "))
}

fn property_key(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// `.name` or `["odd-name"]`
fn member(name: &str) -> String {
    if is_identifier_name(name) {
        format!(".{name}")
    } else {
        format!("[{}]", quote(name))
    }
}
