//! Lenient field decoding for server payloads.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

/// Decodes an identifier sent either as a JSON string or as a JSON number.
///
/// Integer columns reach the client as numbers from some backends and as
/// strings from others; both become the same text.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Unsigned(n) => n.to_string(),
    })
}
