use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Scalar::Text(text.clone())),
            Value::Number(number) => number.as_f64().map(Scalar::Number),
            Value::Bool(flag) => Some(Scalar::Text(flag.to_string())),
            Value::Object(map) => map.get("value").and_then(Scalar::from_json),
            Value::Null | Value::Array(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Scalar::Text(text) => text.clone(),
            Scalar::Number(number) => number.to_string(),
        }
    }

    pub fn as_integer(&self) -> i64 {
        match self {
            Scalar::Text(text) => parse_int(text),
            Scalar::Number(number) if number.is_finite() => number.trunc() as i64,
            Scalar::Number(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    fields: IndexMap<String, Scalar>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Scalar>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn from_binding(value: &Value) -> Self {
        let mut fields = IndexMap::new();
        if let Some(map) = value.as_object() {
            for (name, raw) in map {
                if let Some(scalar) = Scalar::from_json(raw) {
                    fields.insert(name.clone(), scalar);
                }
            }
        }
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    pub fn first_of(&self, keys: &[&str]) -> Option<&Scalar> {
        keys.iter().find_map(|key| self.fields.get(*key))
    }

    pub fn text(&self, keys: &[&str]) -> String {
        self.first_of(keys).map(Scalar::as_text).unwrap_or_default()
    }

    pub fn non_empty_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .map(Scalar::as_text)
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    pub fn integer(&self, keys: &[&str]) -> i64 {
        self.first_of(keys).map(Scalar::as_integer).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

pub fn rows_from_results(body: &Value) -> Vec<ResultRow> {
    match body.get("results").and_then(|results| results.get("bindings")) {
        Some(bindings) => rows_from_value(bindings),
        None => {
            warn!("response has no results.bindings; treating as zero rows");
            Vec::new()
        }
    }
}

pub fn rows_from_value(value: &Value) -> Vec<ResultRow> {
    match value.as_array() {
        Some(items) => items.iter().map(ResultRow::from_binding).collect(),
        None => {
            warn!("bindings are not an array; treating as zero rows");
            Vec::new()
        }
    }
}

/// Leading-integer parse: optional whitespace and sign, then the longest run
/// of ASCII digits. No digits yields 0.
pub fn parse_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0i64, |acc, byte| {
            acc.saturating_mul(10).saturating_add(i64::from(byte - b'0'))
        });
    if negative { -digits } else { digits }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_int_matches_leading_digits() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("  17 genes"), 17);
        assert_eq!(parse_int("-3"), -3);
        assert_eq!(parse_int("3.9"), 3);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
    }

    #[test]
    fn binding_wrappers_and_bare_scalars() {
        let row = ResultRow::from_binding(&json!({
            "diseaseLabel": {"type": "literal", "xml:lang": "en", "value": "obesity"},
            "geneCount": {"type": "literal", "datatype": "xsd:integer", "value": "12"},
            "count": 4,
            "ignored": null,
            "nested": {"type": "uri"}
        }));
        assert_eq!(row.text(&["diseaseLabel"]), "obesity");
        assert_eq!(row.integer(&["geneCount"]), 12);
        assert_eq!(row.integer(&["count"]), 4);
        assert!(row.get("ignored").is_none());
        assert!(row.get("nested").is_none());
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn field_order_is_preserved() {
        let row = ResultRow::from_binding(&json!({"b": "1", "a": "2"}));
        let names: Vec<&str> = row.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn missing_results_path_is_zero_rows() {
        assert!(rows_from_results(&json!({"head": {"vars": []}})).is_empty());
        assert!(rows_from_results(&json!({"results": {"bindings": "nope"}})).is_empty());
        assert!(rows_from_value(&json!({"not": "an array"})).is_empty());
    }
}
