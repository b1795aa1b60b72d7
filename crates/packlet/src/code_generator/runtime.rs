//! The fixed loader runtime embedded in every bundle
//!
//! The runtime depends on nothing but the registry passed to the wrapper:
//! `modules[id]` is `[moduleFunction, mapping]`, where `mapping` translates
//! the import strings written in that module to registry identities.

/// Opens the self-invoking wrapper and defines the loader
pub(crate) const WRAPPER_OPEN: &str = r#"(function (modules) {
  const cache = {};

  function require(id) {
    if (Object.prototype.hasOwnProperty.call(cache, id)) {
      return cache[id].exports;
    }
    if (!Object.prototype.hasOwnProperty.call(modules, id)) {
      throw new Error("Module " + id + " is not part of this bundle");
    }
    const [fn, mapping] = modules[id];

    function localRequire(name) {
      if (!Object.prototype.hasOwnProperty.call(mapping, name)) {
        const error = new Error('Cannot resolve "' + name + '" from module ' + id);
        error.name = "UnresolvedImportError";
        error.code = "UNRESOLVED_IMPORT";
        throw error;
      }
      return require(mapping[name]);
    }

    const module = { exports: {} };
    cache[id] = module;
    fn(localRequire, module, module.exports);
    return module.exports;
  }

  require(0);
})({
"#;

/// Closes the registry literal and invokes the wrapper with it
pub(crate) const WRAPPER_CLOSE: &str = "});\n";

/// Parameter list every module function is declared with
pub(crate) const MODULE_PARAMS: &str = "(localRequire, module, exports)";
