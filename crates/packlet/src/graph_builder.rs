//! Graph builder that discovers every module reachable from an entry file
//!
//! Discovery is a depth-first pre-order walk over import declarations. The
//! walk runs on an explicit stack of frames rather than recursion; the paths
//! of the frames on the stack form the current resolution chain, and meeting
//! one of them again is reported as a circular dependency.
//!
//! Every import statement is discovered on its own: a file imported twice
//! yields two modules with separate identities unless path deduplication is
//! switched on.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    analyzer::SourceAnalyzer,
    error::{BuildError, Result},
    module_graph::{ModuleDescriptor, ModuleGraph},
    resolver::{normalize_path, resolve_import},
    types::ModuleId,
};

/// Builds a ModuleGraph from an entry file
#[derive(Debug, Clone)]
pub struct GraphBuilder<A> {
    analyzer: A,
    dedupe: bool,
}

impl<A: SourceAnalyzer> GraphBuilder<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            dedupe: false,
        }
    }

    /// Reuse the first module discovered for a resolved path instead of
    /// analyzing the file again for every import statement
    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Discover every module reachable from `entry`
    ///
    /// The entry module receives identity 0 and every other module the next
    /// unused identity in depth-first pre-order. Nothing outlives the call,
    /// so building twice over an unchanged tree yields equal graphs.
    pub fn build(&self, entry: &Path) -> Result<ModuleGraph> {
        let mut walk = Walk::new(&self.analyzer, self.dedupe);
        walk.enter(normalize_path(entry))?;

        while let Some(frame) = walk.stack.last_mut() {
            let importer = frame.module;
            let Some(module) = walk.graph.get(importer) else {
                break;
            };
            let Some(target) = module.imports.get(frame.next_import).cloned() else {
                walk.leave();
                continue;
            };
            frame.next_import += 1;

            let dependency_path = resolve_import(&module.path, &target);
            trace!(
                "Resolved '{}' from {} to {}",
                target,
                module.path.display(),
                dependency_path.display()
            );

            if walk.active.contains(&dependency_path) {
                return Err(walk.cycle_error(dependency_path));
            }

            let dependency = match walk.existing(&dependency_path) {
                Some(id) => id,
                None => walk.enter(dependency_path)?,
            };
            walk.graph.record_dependency(importer, &target, dependency);
        }

        debug!("Discovered {} modules", walk.graph.len());
        Ok(walk.graph)
    }
}

/// One module whose imports are being walked
#[derive(Debug)]
struct Frame {
    module: ModuleId,
    next_import: usize,
}

/// State of a single build; dropped when the build returns
struct Walk<'a, A> {
    analyzer: &'a A,
    graph: ModuleGraph,
    stack: Vec<Frame>,
    /// Paths of the modules currently on the stack
    active: FxHashSet<PathBuf>,
    /// First identity discovered per path, filled only when deduplicating
    discovered: Option<FxHashMap<PathBuf, ModuleId>>,
}

impl<'a, A: SourceAnalyzer> Walk<'a, A> {
    fn new(analyzer: &'a A, dedupe: bool) -> Self {
        Self {
            analyzer,
            graph: ModuleGraph::new(),
            stack: Vec::new(),
            active: FxHashSet::default(),
            discovered: dedupe.then(FxHashMap::default),
        }
    }

    fn existing(&self, path: &Path) -> Option<ModuleId> {
        self.discovered.as_ref()?.get(path).copied()
    }

    /// Read and analyze `path`, append it to the graph and push its frame
    fn enter(&mut self, path: PathBuf) -> Result<ModuleId> {
        let source = fs::read_to_string(&path).map_err(|source| BuildError::UnreadableSource {
            path: path.clone(),
            source,
        })?;
        let analyzed = self
            .analyzer
            .analyze(&source)
            .map_err(|error| BuildError::Analysis {
                path: path.clone(),
                error,
            })?;

        let id = self.graph.next_id();
        debug!(
            "Module {} is {} ({} imports)",
            id,
            path.display(),
            analyzed.imports.len()
        );

        if let Some(discovered) = &mut self.discovered {
            discovered.insert(path.clone(), id);
        }
        self.active.insert(path.clone());
        self.graph.push(ModuleDescriptor::new(
            id,
            path,
            analyzed.imports,
            analyzed.code,
        ));
        self.stack.push(Frame {
            module: id,
            next_import: 0,
        });
        Ok(id)
    }

    /// Pop the finished frame at the top of the stack
    fn leave(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if let Some(module) = self.graph.get(frame.module) {
                self.active.remove(&module.path);
            }
        }
    }

    /// The resolution chain from the first visit of `path` back to it
    fn cycle_error(&self, path: PathBuf) -> BuildError {
        let mut cycle: Vec<PathBuf> = self
            .stack
            .iter()
            .filter_map(|frame| self.graph.get(frame.module))
            .map(|module| module.path.clone())
            .skip_while(|candidate| *candidate != path)
            .collect();
        cycle.push(path);
        warn!("Circular dependency through {} modules", cycle.len() - 1);
        BuildError::CyclicDependency { cycle }
    }
}

#[cfg(test)]
mod tests;
