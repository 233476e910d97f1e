pub mod company;
pub mod contact;
pub mod erp;
pub mod payload;
pub mod sync_report;

pub use company::*;
pub use contact::*;
pub use erp::*;
pub use payload::*;
pub use sync_report::*;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Accepts ids sent as JSON strings or numbers and keeps them as text.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Signed(number) => number.to_string(),
        RawId::Unsigned(number) => number.to_string(),
        // Exports sometimes render integral ids as `4711.0`.
        RawId::Float(number) if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 => {
            format!("{}", number as i64)
        }
        RawId::Float(number) => number.to_string(),
    }))
}

/// `null` and missing flags both mean "not set".
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Which fields count when deciding whether a stored CRM row changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeScope {
    /// Every mutable field of the CRM row.
    #[default]
    All,
    /// Only the fields that are forwarded to the ERP staging tables.
    Propagated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct IdHolder {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        id: Option<String>,
    }

    fn parse_id(value: serde_json::Value) -> Option<String> {
        serde_json::from_value::<IdHolder>(json!({ "id": value })).unwrap().id
    }

    #[test]
    fn test_numeric_ids_become_text() {
        assert_eq!(parse_id(json!("ACC-1")).as_deref(), Some("ACC-1"));
        assert_eq!(parse_id(json!(4711)).as_deref(), Some("4711"));
        assert_eq!(parse_id(json!(-3)).as_deref(), Some("-3"));
        assert_eq!(parse_id(json!(18446744073709551615u64)).as_deref(), Some("18446744073709551615"));
        assert_eq!(parse_id(json!(4711.0)).as_deref(), Some("4711"));
        assert_eq!(parse_id(json!(47.5)).as_deref(), Some("47.5"));
        assert_eq!(parse_id(json!(null)), None);
    }
}
