use serde::{Deserialize, Deserializer};

/// Tell an absent field from an explicit `null` in a partial update.
///
/// Use with `#[serde(default, deserialize_with = "nullable::deserialize")]`
/// on an `Option<Option<T>>`: absent stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "super::deserialize")]
        note: Option<Option<String>>,
    }

    fn parse(value: serde_json::Value) -> Option<Option<String>> {
        serde_json::from_value::<Body>(value).unwrap().note
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        assert_eq!(parse(json!({})), None);
        assert_eq!(parse(json!({ "note": null })), Some(None));
        assert_eq!(parse(json!({ "note": "hi" })), Some(Some("hi".to_string())));
    }
}
