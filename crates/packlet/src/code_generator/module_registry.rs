//! Registry literal emission
//!
//! Each module becomes one entry of the registry object:
//!
//! ```text
//! 1: [
//!   (localRequire, module, exports) => {
//! <compiled body>
//!   },
//!   {"./dep.js": 2},
//! ],
//! ```
//!
//! Compiled bodies are copied verbatim; re-indenting them would change the
//! contents of multi-line template literals.

use std::fmt::Write;

use super::runtime::MODULE_PARAMS;
use crate::{module_graph::ModuleDescriptor, util::js_string_literal};

/// Append the registry entry for `module` to `out`
pub(crate) fn write_registry_entry(out: &mut String, module: &ModuleDescriptor) {
    let _ = writeln!(out, "{}: [", module.id);
    let _ = writeln!(out, "  {MODULE_PARAMS} => {{");
    out.push_str(&module.code);
    if !module.code.is_empty() && !module.code.ends_with('\n') {
        // A trailing line comment must not swallow the closing brace
        out.push('\n');
    }
    out.push_str("  },\n");
    let _ = writeln!(out, "  {},", mapping_literal(module));
    out.push_str("],\n");
}

/// `{"./a.js": 1, "./b.js": 2}` in import order
pub(crate) fn mapping_literal(module: &ModuleDescriptor) -> String {
    if module.path_to_id.is_empty() {
        return "{}".to_owned();
    }
    let entries: Vec<String> = module
        .path_to_id
        .iter()
        .map(|(target, id)| format!("{}: {id}", js_string_literal(target)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}
