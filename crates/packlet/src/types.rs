//! Shared type definitions for the packlet crate
//!
//! This module contains the small value types used by both the graph builder
//! and the code generator, so neither has to depend on the other.

use std::{fmt, hash::BuildHasherDefault};

use indexmap::IndexMap;
use rustc_hash::FxHasher;

/// Insertion-ordered map using the Fx hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Unique identifier for a module within one build
///
/// Identities are handed out in discovery order starting at zero, so the
/// entry module is always `ModuleId::ENTRY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Identity of the entry module
    pub const ENTRY: Self = Self(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value of the ModuleId
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Position of this module in the graph's descriptor list
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
