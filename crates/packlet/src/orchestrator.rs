//! End-to-end build: discovery, synthesis and artifact output

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
    analyzer::{EsModuleAnalyzer, SourceAnalyzer},
    code_generator::synthesize,
    config::Config,
    error::{BuildError, Result},
    graph_builder::GraphBuilder,
    module_graph::ModuleGraph,
};

/// Outcome of a build that wrote its artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub module_count: usize,
    pub bytes: usize,
    pub output: PathBuf,
}

/// Runs builds for one configuration
#[derive(Debug, Clone)]
pub struct Bundler<A = EsModuleAnalyzer> {
    config: Config,
    analyzer: A,
}

impl Bundler {
    pub fn new(config: Config) -> Self {
        Self::with_analyzer(config, EsModuleAnalyzer)
    }
}

impl<A: SourceAnalyzer> Bundler<A> {
    pub fn with_analyzer(config: Config, analyzer: A) -> Self {
        Self { config, analyzer }
    }

    /// Discover the module graph of the configured entry
    pub fn graph(&self) -> Result<ModuleGraph> {
        info!("Bundling from entry {}", self.config.entry.display());
        GraphBuilder::new(&self.analyzer)
            .with_dedupe(self.config.dedupe)
            .build(&self.config.entry)
    }

    /// Build the artifact text without writing anything
    pub fn bundle_string(&self) -> Result<(ModuleGraph, String)> {
        let graph = self.graph()?;
        let artifact = synthesize(&graph);
        Ok((graph, artifact))
    }

    /// Build and write the artifact to the configured output
    ///
    /// Any failure leaves the output path untouched.
    pub fn bundle(&self) -> Result<BundleSummary> {
        let (graph, artifact) = self.bundle_string()?;
        write_artifact(&self.config.output, &artifact)?;
        info!(
            "Wrote {} modules ({} bytes) to {}",
            graph.len(),
            artifact.len(),
            self.config.output.display()
        );
        Ok(BundleSummary {
            module_count: graph.len(),
            bytes: artifact.len(),
            output: self.config.output.clone(),
        })
    }
}

/// Replace `path` with `content` atomically
///
/// The content goes to a temporary file in the destination directory which
/// is then renamed over `path`, so readers never see a partial artifact.
pub fn write_artifact(path: &Path, content: &str) -> Result<()> {
    let to_error = |source| BuildError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(to_error)?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(to_error)?;
    temp_file.write_all(content.as_bytes()).map_err(to_error)?;
    temp_file.flush().map_err(to_error)?;
    temp_file
        .persist(path)
        .map_err(|error| to_error(error.error))?;

    debug!("Persisted {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_artifact_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let output = temp_dir.path().join("dist/nested/bundle.js");

        write_artifact(&output, "first").expect("first write");
        write_artifact(&output, "second").expect("second write");

        assert_eq!(fs::read_to_string(&output).expect("read artifact"), "second");
        let leftovers = fs::read_dir(output.parent().expect("parent"))
            .expect("list dir")
            .count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_artifact_reports_the_path() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "").expect("write blocker");
        let output = blocker.join("bundle.js");

        let error = write_artifact(&output, "x").expect_err("parent is a file");

        assert!(matches!(error, BuildError::WriteArtifact { ref path, .. } if *path == output));
    }

    #[test]
    fn test_bundle_summary() {
        let temp_dir = TempDir::new().expect("create temp dir");
        fs::write(temp_dir.path().join("a.js"), "import b from './b.js';\nconsole.log(b);\n")
            .expect("write a");
        fs::write(temp_dir.path().join("b.js"), "export default 1;\n").expect("write b");

        let config = Config::for_entry(Path::new("a.js"), temp_dir.path());
        let summary = Bundler::new(config.clone()).bundle().expect("bundle");

        let written = fs::read_to_string(&config.output).expect("read artifact");
        assert_eq!(
            summary,
            BundleSummary {
                module_count: 2,
                bytes: written.len(),
                output: config.output,
            }
        );
    }
}
