//! Small helpers shared by the analyzer and the code generator

/// JavaScript string literal for `value`
///
/// JSON string syntax is valid JavaScript once the two line separators that
/// JSON leaves unescaped are escaped as well.
pub fn js_string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_owned())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
