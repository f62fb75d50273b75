use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

/// The `result` object returned by the analysis service for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<serde_json::Value>,
    pub contents: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "valueString", default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

impl FieldValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: Some("string".to_string()),
            value_string: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// Field mapping of a content block, kept in the order the service sent it.
///
/// Display order and color assignment both depend on that order, so this is an
/// association list rather than a map. Names are unique: inserting an existing
/// name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<Field>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.0.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.0.push(Field { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<N: Into<String>> FromIterator<(N, FieldValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (N, FieldValue)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

struct FieldsVisitor;

impl<'de> Visitor<'de> for FieldsVisitor {
    type Value = Fields;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of named fields")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Fields, E> {
        Ok(Fields::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Fields, E> {
        Ok(Fields::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
        let mut fields = Fields::new();
        while let Some(name) = access.next_key::<String>()? {
            // null, scalars and malformed objects all render as an empty value
            let raw = access.next_value::<serde_json::Value>()?;
            let value = serde_json::from_value::<FieldValue>(raw).unwrap_or_default();
            fields.insert(name, value);
        }
        Ok(fields)
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_document_order() {
        let block: ContentBlock = serde_json::from_str(
            r#"{"fields": {"zeta": {"valueString": "1"}, "alpha": {}, "mid": {"type": "string", "valueString": "3"}}}"#,
        )
        .unwrap();

        let names: Vec<&str> = block.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(block.fields.get("alpha"), Some(&FieldValue::default()));
        assert_eq!(block.fields.get("mid").unwrap().kind.as_deref(), Some("string"));
    }

    #[test]
    fn duplicate_names_keep_first_position_and_last_value() {
        let block: ContentBlock = serde_json::from_str(
            r#"{"fields": {"a": {"valueString": "old"}, "b": {}, "a": {"valueString": "new"}}}"#,
        )
        .unwrap();

        assert_eq!(block.fields.len(), 2);
        let first = block.fields.iter().next().unwrap();
        assert_eq!(first.name, "a");
        assert_eq!(first.value.value_string.as_deref(), Some("new"));
    }

    #[test]
    fn non_object_field_values_render_as_empty() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"contents": [{"fields": {"a": {"valueString": "x"}, "b": "plain", "c": 7, "d": {"valueString": 3}}}]}"#,
        )
        .unwrap();

        let fields = &result.contents[0].fields;
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        assert_eq!(fields.get("a").unwrap().value_string.as_deref(), Some("x"));
        assert_eq!(fields.get("b"), Some(&FieldValue::default()));
        assert_eq!(fields.get("c"), Some(&FieldValue::default()));
        assert_eq!(fields.get("d"), Some(&FieldValue::default()));
    }

    #[test]
    fn absent_or_null_fields_are_empty() {
        let block: ContentBlock = serde_json::from_str(r#"{"markdown": "text"}"#).unwrap();
        assert!(block.fields.is_empty());

        let block: ContentBlock = serde_json::from_str(r#"{"fields": null}"#).unwrap();
        assert!(block.fields.is_empty());

        let block: ContentBlock = serde_json::from_str(r#"{"fields": {"x": null}}"#).unwrap();
        assert_eq!(block.fields.get("x"), Some(&FieldValue::default()));
    }

    #[test]
    fn result_requires_contents() {
        let err = serde_json::from_str::<AnalysisResult>(r#"{"analyzerId": "video_tag"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn video_block_metadata_is_read() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{
                "analyzerId": "video_tag_1",
                "apiVersion": "2024-12-01-preview",
                "warnings": [{"code": "W1"}],
                "contents": [
                    {"kind": "audioVisual", "startTimeMs": 0, "endTimeMs": 12500, "markdown": "a"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(result.analyzer_id.as_deref(), Some("video_tag_1"));
        assert_eq!(result.warnings.len(), 1);
        let block = &result.contents[0];
        assert_eq!(block.kind.as_deref(), Some("audioVisual"));
        assert_eq!(block.end_time_ms, Some(12_500));
    }

    #[test]
    fn fields_serialize_in_order() {
        let fields: Fields = [
            ("second", FieldValue::string("2")),
            ("first", FieldValue::default()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"second":{"type":"string","valueString":"2"},"first":{}}"#);
    }
}
