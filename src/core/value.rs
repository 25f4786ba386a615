//! Field values and sparse field patches.
//!
//! Override data has no fixed schema: a patch maps field names to arbitrary nested values.
//! [`FieldValue`] models those values and [`FieldPatch`] the patch itself. Both serialise to
//! plain JSON, which is the encoding stored in the `data` column.

use crate::errors::Result;
use serde::{Deserialize, Serialize, Serializer, ser};
use std::collections::BTreeMap;

// JSON has no NaN or infinity; serde_json would silently write them as null.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_finite<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(ser::Error::custom(format!("cannot encode non-finite number {value}")))
    }
}

/// A single field value, possibly nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit null
    Null,
    /// Boolean flag
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating point number, finite when encoded
    Float(#[serde(serialize_with = "serialize_finite")] f64),
    /// Text
    String(String),
    /// Ordered sequence, e.g. the deltas of a multi-value field
    List(Vec<FieldValue>),
    /// Named properties, e.g. `{ value, format }`
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns the inner string, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner mapping, if this is a map value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a property of a map value.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(name))
    }

    /// Whether the value would render as an empty string (`""`, null or `false`).
    ///
    /// Submitted field properties with blank values are dropped before storage.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<Self>> for FieldValue {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Self>> for FieldValue {
    fn from(value: BTreeMap<String, Self>) -> Self {
        Self::Map(value)
    }
}

impl<K: Into<String>, V: Into<Self>> FromIterator<(K, V)> for FieldValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Sparse mapping from field name to replacement value.
///
/// Only fields present in the patch are overridden; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(BTreeMap<String, FieldValue>);

impl FieldPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets the replacement value for a field, returning the previous one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Returns the replacement value for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Whether the patch overrides the given field.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterates over `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Number of overridden fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the patch overrides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the patch for the `data` column.
    ///
    /// # Errors
    /// Returns [`Error::Encoding`](crate::errors::Error::Encoding) if the patch holds a NaN or
    /// infinite number.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(Into::into)
    }

    /// Decodes a patch previously produced by [`FieldPatch::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        serde_json::from_str(encoded).map_err(Into::into)
    }
}

impl From<BTreeMap<String, FieldValue>> for FieldPatch {
    fn from(value: BTreeMap<String, FieldValue>) -> Self {
        Self(value)
    }
}

impl From<FieldPatch> for FieldValue {
    fn from(value: FieldPatch) -> Self {
        Self::Map(value.0)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldPatch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldPatch {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;

    fn body_value() -> FieldValue {
        [("value", "Overridden body"), ("format", "basic_html")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_decode_nested_patch() -> Result<()> {
        let patch = FieldPatch::decode(
            r#"{
                "title": {"value": "Custom title"},
                "price": {"number": "9.99", "currency_code": "USD"},
                "stores": [{"target_id": 1}, {"target_id": 2}],
                "weight": 1.5,
                "featured": true,
                "sticky": null
            }"#,
        )?;

        assert_eq!(patch.len(), 6);
        assert_eq!(
            patch.get("title").and_then(|v| v.property("value")),
            Some(&FieldValue::from("Custom title"))
        );
        assert_eq!(
            patch.get("stores"),
            Some(&FieldValue::List(vec![
                [("target_id", 1_i64)].into_iter().collect(),
                [("target_id", 2_i64)].into_iter().collect(),
            ]))
        );
        assert_eq!(patch.get("weight"), Some(&FieldValue::Float(1.5)));
        assert_eq!(patch.get("featured"), Some(&FieldValue::Bool(true)));
        assert_eq!(patch.get("sticky"), Some(&FieldValue::Null));
        assert!(!patch.contains("body"));
        Ok(())
    }

    #[test]
    fn test_encoding_preserves_number_kinds() -> Result<()> {
        let mut patch = FieldPatch::new();
        patch.insert("quantity", 3_i64);
        patch.insert("ratio", 1.0_f64);
        patch.insert("body", body_value());

        let decoded = FieldPatch::decode(&patch.encode()?)?;
        assert_eq!(decoded.get("quantity"), Some(&FieldValue::Integer(3)));
        assert_eq!(decoded.get("ratio"), Some(&FieldValue::Float(1.0)));
        assert_eq!(decoded, patch);
        Ok(())
    }

    #[test]
    fn test_empty_patch_encodes_as_empty_object() -> Result<()> {
        let patch = FieldPatch::new();
        assert_eq!(patch.encode()?, "{}");
        assert!(FieldPatch::decode("{}")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_encode_rejects_non_finite_numbers() {
        for number in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut patch = FieldPatch::new();
            patch.insert("limit", number);
            assert!(matches!(patch.encode(), Err(Error::Encoding(_))));
        }

        let nested: FieldPatch = [("price", FieldValue::List(vec![FieldValue::Float(f64::NAN)]))]
            .into_iter()
            .collect();
        assert!(nested.encode().is_err());
    }

    #[test]
    fn test_decode_rejects_non_mapping() {
        assert!(FieldPatch::decode(r#""INVALID""#).is_err());
        assert!(FieldPatch::decode("[1, 2]").is_err());
    }

    #[test]
    fn test_is_blank() {
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::Bool(false).is_blank());
        assert!(!FieldValue::Bool(true).is_blank());
        assert!(!FieldValue::Integer(0).is_blank());
        assert!(!FieldValue::from("0").is_blank());
        assert!(!body_value().is_blank());
    }
}
