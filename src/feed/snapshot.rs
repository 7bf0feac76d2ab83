use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One poll's match state, as loosely typed as the feed delivers it.
///
/// Every field is optional: the feed sends `null` for unknown values, omits
/// keys on partial rows and mixes numbers with numeric strings. Identifiers
/// and scores keep their raw rendering; interpretation happens in the
/// announcement rules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(deserialize_with = "lenient_text")]
    pub match_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub map_number: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub team_name1: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub team_name2: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub score_left: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub score_right: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub map_info: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub map_count1: Option<i64>,
    #[serde(deserialize_with = "lenient_count")]
    pub map_count2: Option<i64>,
    #[serde(deserialize_with = "lenient_text")]
    pub match_format: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub win_team: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub win_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub win_line: Option<String>,
}

impl Snapshot {
    /// Parse the `/api/display/live` object. Returns `None` only when the
    /// payload is not an object at all; bad fields become `None`.
    pub fn from_json(raw: &Value) -> Option<Self> {
        // Derived struct impls also accept sequences, which the feed never sends.
        if !raw.is_object() {
            return None;
        }
        Snapshot::deserialize(raw).ok()
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(&Value::deserialize(d)?))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(scalar_count(&Value::deserialize(d)?))
}

/// Strings pass through, numbers and booleans are rendered, anything else is absent.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_count(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}
