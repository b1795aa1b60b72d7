//! Source analysis capability consumed by the graph builder
//!
//! The graph builder only needs two things from a module's text: the ordered
//! list of import targets and an executable body. [`SourceAnalyzer`] is that
//! seam; [`EsModuleAnalyzer`] is the built-in implementation for JavaScript
//! modules written with `import`/`export` declarations.

mod syntax;
mod transform;

use crate::error::AnalysisError;

/// Result of analyzing one module's source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedModule {
    /// Raw import targets in source order, duplicates preserved
    pub imports: Vec<String>,
    /// Executable body, opaque to the bundler
    pub code: String,
}

/// Extracts dependencies from, and compiles, a module's source text
pub trait SourceAnalyzer {
    /// Import targets of `source`, exactly as written and in source order
    fn extract_imports(&self, source: &str) -> Result<Vec<String>, AnalysisError>;

    /// Executable body for `source` that reaches its dependencies only through
    /// `localRequire` and publishes through `module`/`exports`
    fn compile_body(&self, source: &str) -> Result<String, AnalysisError>;

    /// Both of the above; implementations may override this to parse once
    fn analyze(&self, source: &str) -> Result<AnalyzedModule, AnalysisError> {
        Ok(AnalyzedModule {
            imports: self.extract_imports(source)?,
            code: self.compile_body(source)?,
        })
    }
}

impl<T: SourceAnalyzer + ?Sized> SourceAnalyzer for &T {
    fn extract_imports(&self, source: &str) -> Result<Vec<String>, AnalysisError> {
        (**self).extract_imports(source)
    }

    fn compile_body(&self, source: &str) -> Result<String, AnalysisError> {
        (**self).compile_body(source)
    }

    fn analyze(&self, source: &str) -> Result<AnalyzedModule, AnalysisError> {
        (**self).analyze(source)
    }
}

/// Analyzer for JavaScript sources using ES module declarations, parsed
/// with oxc as strict-mode modules
///
/// CommonJS sources pass through unchanged apart from having no imports,
/// since `require` calls are not module declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct EsModuleAnalyzer;

impl EsModuleAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl SourceAnalyzer for EsModuleAnalyzer {
    fn extract_imports(&self, source: &str) -> Result<Vec<String>, AnalysisError> {
        Ok(syntax::parse_module(source)?.import_targets())
    }

    fn compile_body(&self, source: &str) -> Result<String, AnalysisError> {
        let module = syntax::parse_module(source)?;
        Ok(transform::compile_module(source, &module))
    }

    fn analyze(&self, source: &str) -> Result<AnalyzedModule, AnalysisError> {
        let module = syntax::parse_module(source)?;
        log::trace!("Found {} module declarations", module.declarations.len());
        Ok(AnalyzedModule {
            imports: module.import_targets(),
            code: transform::compile_module(source, &module),
        })
    }
}
