use serde_json::Value;
use std::collections::BTreeMap;

/// Field name to value. Values are usually strings; anything else (numbers,
/// booleans, file descriptors from the host) passes through untouched.
pub type FormData = BTreeMap<String, Value>;

/// Trim leading and trailing whitespace from every string value.
pub fn trim_strings(mut data: FormData) -> FormData {
    for value in data.values_mut() {
        if let Value::String(text) = value {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_owned();
            }
        }
    }
    data
}
