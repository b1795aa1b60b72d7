//! Artifact synthesis
//!
//! Turns a [`ModuleGraph`] into a single self-contained JavaScript program:
//! a self-invoking wrapper whose argument is the module registry. The
//! wrapper carries its own loader runtime and starts execution by requiring
//! the entry module, identity 0.

mod module_registry;
mod runtime;

use log::debug;

use crate::module_graph::ModuleGraph;

/// Produce the bundle text for `graph`
///
/// Registry entries appear in ascending identity order, so synthesizing the
/// same graph twice yields byte-identical output.
pub fn synthesize(graph: &ModuleGraph) -> String {
    let body_len: usize = graph.iter().map(|module| module.code.len() + 96).sum();
    let mut out =
        String::with_capacity(runtime::WRAPPER_OPEN.len() + body_len + runtime::WRAPPER_CLOSE.len());

    out.push_str(runtime::WRAPPER_OPEN);
    for module in graph {
        module_registry::write_registry_entry(&mut out, module);
    }
    out.push_str(runtime::WRAPPER_CLOSE);

    debug!(
        "Synthesized {} registry entries into {} bytes",
        graph.len(),
        out.len()
    );
    out
}
