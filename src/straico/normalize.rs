use serde_json::Value;

/// Appends a response to the output sequence, splicing top-level arrays
/// one level deep.
pub fn normalize(value: Value, output: &mut Vec<Value>) {
    match value {
        Value::Array(elements) => output.extend(elements),
        other => output.push(other),
    }
}
