//! Error types for the bundler

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// A source file the analyzer could not process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct AnalysisError {
    pub message: String,
    /// 1-based line the problem was found on
    pub line: usize,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Every way a build can fail; all of them abort before output is written
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot read source {}: {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot analyze {}: {error}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        error: AnalysisError,
    },

    #[error("circular dependency detected: {}", CycleChain(cycle))]
    CyclicDependency { cycle: Vec<PathBuf> },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("cannot write artifact {}: {source}", path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Renders a cycle as `a.js -> b.js -> a.js`
struct CycleChain<'a>(&'a [PathBuf]);

impl fmt::Display for CycleChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, path) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let error = BuildError::CyclicDependency {
            cycle: vec![
                PathBuf::from("/src/a.js"),
                PathBuf::from("/src/b.js"),
                PathBuf::from("/src/a.js"),
            ],
        };
        assert_eq!(
            error.to_string(),
            "circular dependency detected: /src/a.js -> /src/b.js -> /src/a.js"
        );
    }

    #[test]
    fn test_analysis_message_includes_line() {
        let error = BuildError::Analysis {
            path: PathBuf::from("/src/a.js"),
            error: AnalysisError::new("unterminated string literal", 3),
        };
        assert_eq!(
            error.to_string(),
            "cannot analyze /src/a.js: unterminated string literal (line 3)"
        );
    }
}
