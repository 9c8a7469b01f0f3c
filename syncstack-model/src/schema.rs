use crate::RecordHooks;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syncstack_types::{PropertyMap, Value};

/// Mapping from logical property name to persistent-store field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.insert(property, field);
        self
    }

    /// Maps a property onto a store field.
    pub fn insert(&mut self, property: impl Into<String>, field: impl Into<String>) {
        self.0.insert(property.into(), field.into());
    }

    /// The store field for a property.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    /// Iterates `(property, field)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, f)| (p.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<String>, F: Into<String>> FromIterator<(P, F)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (P, F)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, f)| (p.into(), f.into())).collect())
    }
}

/// Declarative record type: resource location, defaults and store mapping.
///
/// Covers record types that need no custom parse/validate logic; implement
/// [`RecordHooks`] directly for anything more.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSchema {
    pub type_name: String,
    /// Base URL of the remote endpoint.
    pub url: String,
    /// Resource name appended to the base URL.
    pub name: String,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub defaults: PropertyMap,
}

impl RecordSchema {
    /// A schema for `type_name` served at `url/name`.
    pub fn new(type_name: impl Into<String>, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            url: url.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a property → store field mapping.
    pub fn field(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.fields.insert(property, field);
        self
    }

    /// Adds a default property value.
    pub fn default_value(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(property.into(), value.into());
        self
    }
}

impl RecordHooks for RecordSchema {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn defaults(&self) -> PropertyMap {
        let mut defaults = self.defaults.clone();
        defaults.insert(crate::URL.into(), Value::String(self.url.clone()));
        defaults.insert(crate::NAME.into(), Value::String(self.name.clone()));
        defaults
    }

    fn map_fields(&self) -> FieldMap {
        self.fields.clone()
    }
}
