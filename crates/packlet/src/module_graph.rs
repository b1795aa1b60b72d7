//! Module graph produced by the graph builder
//!
//! The ModuleGraph is the single source of truth for module identity between
//! discovery and code generation. Descriptors are stored in identity order, so
//! a descriptor's identity is also its position in the graph.

use std::path::PathBuf;

use crate::types::{FxIndexMap, ModuleId};

/// Everything known about one discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Unique identifier for this module
    pub id: ModuleId,
    /// Resolved file path on disk; never written into the artifact
    pub path: PathBuf,
    /// Raw import targets in source order, duplicates preserved
    pub imports: Vec<String>,
    /// Executable body produced by the source analyzer
    pub code: String,
    /// Raw import target -> identity of the module it resolved to
    pub path_to_id: FxIndexMap<String, ModuleId>,
}

impl ModuleDescriptor {
    pub fn new(id: ModuleId, path: PathBuf, imports: Vec<String>, code: String) -> Self {
        Self {
            id,
            path,
            imports,
            code,
            path_to_id: FxIndexMap::default(),
        }
    }

    /// Identity a raw import target of this module resolved to
    pub fn resolve(&self, target: &str) -> Option<ModuleId> {
        self.path_to_id.get(target).copied()
    }
}

/// Ordered collection of every descriptor discovered in one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleGraph {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly discovered descriptor
    ///
    /// Identities are dense, so the descriptor must carry the next unused one.
    pub(crate) fn push(&mut self, descriptor: ModuleDescriptor) {
        debug_assert_eq!(descriptor.id.index(), self.modules.len());
        self.modules.push(descriptor);
    }

    /// Record that `target`, written in `importer`, resolved to `dependency`
    pub(crate) fn record_dependency(
        &mut self,
        importer: ModuleId,
        target: &str,
        dependency: ModuleId,
    ) {
        if let Some(module) = self.modules.get_mut(importer.index()) {
            module.path_to_id.insert(target.to_owned(), dependency);
        }
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleDescriptor> {
        self.modules.get(id.index())
    }

    /// The entry module, if anything has been discovered
    pub fn entry(&self) -> Option<&ModuleDescriptor> {
        self.modules.first()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Descriptors in ascending identity order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }

    /// Identity that will be handed to the next discovered module
    pub(crate) fn next_id(&self) -> ModuleId {
        ModuleId::new(self.modules.len() as u32)
    }
}

impl<'a> IntoIterator for &'a ModuleGraph {
    type Item = &'a ModuleDescriptor;
    type IntoIter = std::slice::Iter<'a, ModuleDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}
