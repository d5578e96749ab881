//! Field mappings and document validation.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{DeployerError, Result};

/// How a single field is indexed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldMapping {
    /// Analyzed full text.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        analyzer: Option<String>,
    },
    /// Exact-match string, not analyzed.
    Keyword,
    Boolean,
    Float,
}

impl FieldMapping {
    /// A text field analyzed with the named analyzer.
    pub fn text<S: Into<String>>(analyzer: S) -> Self {
        FieldMapping::Text {
            analyzer: Some(analyzer.into()),
        }
    }

    /// The mapping type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldMapping::Text { .. } => "text",
            FieldMapping::Keyword => "keyword",
            FieldMapping::Boolean => "boolean",
            FieldMapping::Float => "float",
        }
    }

    /// The analyzer of a text field; `standard` when none is set.
    pub fn analyzer(&self) -> Option<&str> {
        match self {
            FieldMapping::Text { analyzer } => Some(analyzer.as_deref().unwrap_or("standard")),
            _ => None,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (_, Value::Array(values)) => values.iter().all(|v| !v.is_array() && self.accepts(v)),
            (FieldMapping::Text { .. } | FieldMapping::Keyword, Value::String(_)) => true,
            (FieldMapping::Boolean, Value::Bool(_)) => true,
            (FieldMapping::Float, Value::Number(_)) => true,
            _ => false,
        }
    }
}

/// The field mapping of an index.
///
/// Fields marked required must be present and non-empty in every document;
/// the engine itself has no notion of required fields, so [`validate`](Self::validate)
/// enforces it before a document is sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexMapping {
    properties: BTreeMap<String, FieldMapping>,
    required: BTreeSet<String>,
    meta: BTreeMap<String, Value>,
}

impl IndexMapping {
    /// `_meta` key holding the analysis settings fingerprint.
    pub const FINGERPRINT_META: &'static str = "analysis_fingerprint";

    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an optional field.
    pub fn with_field<S: Into<String>>(mut self, name: S, field: FieldMapping) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    /// Add a required field.
    pub fn with_required_field<S: Into<String>>(mut self, name: S, field: FieldMapping) -> Self {
        let name = name.into();
        self.required.insert(name.clone());
        self.properties.insert(name, field);
        self
    }

    /// Set a `_meta` entry.
    pub fn with_meta<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.properties.get(name)
    }

    /// All fields, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldMapping)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the text fields, ordered by name.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|(_, f)| matches!(f, FieldMapping::Text { .. }))
            .map(|(name, _)| name)
    }

    /// Whether the field must be present.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// A `_meta` entry.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Render as the engine's `mappings` body.
    pub fn to_json(&self) -> Result<Value> {
        let mut body = json!({ "properties": serde_json::to_value(&self.properties)? });
        if !self.meta.is_empty() {
            body["_meta"] = serde_json::to_value(&self.meta)?;
        }
        Ok(body)
    }

    /// Check a document source against the mapping.
    ///
    /// Required fields must be present and not null or empty; present fields
    /// must have the mapped type. Unmapped fields are accepted.
    pub fn validate(&self, source: &Value) -> Result<()> {
        let object = source
            .as_object()
            .ok_or_else(|| DeployerError::validation("document source must be a JSON object"))?;

        for name in &self.required {
            if is_empty(object, name) {
                return Err(DeployerError::validation(format!(
                    "[{name}] value required for this field"
                )));
            }
        }

        for (name, field) in &self.properties {
            if let Some(value) = object.get(name)
                && !field.accepts(value)
            {
                return Err(DeployerError::validation(format!(
                    "[{name}] expected {} value, got {value}",
                    field.type_name()
                )));
            }
        }

        Ok(())
    }
}

fn is_empty(object: &Map<String, Value>, name: &str) -> bool {
    match object.get(name) {
        None | Some(Value::Null) => true,
        Some(Value::Array(values)) => values.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
