use crate::{LeadCaptureError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::hash::Hash;

/// Suffix that marks a field as carrying multiple values.
pub const MULTI_VALUE_SUFFIX: &str = "[]";

/// An ordered collection of `(name, value)` pairs in which names may repeat.
///
/// This is the shape a browser's `FormData` has: multi-select inputs and
/// repeated checkboxes produce several pairs under one name, and the order
/// of the pairs is the order the controls appear in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pairs: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping any existing pairs with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(name, _)| name.as_str())
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Every value recorded under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().filter(move |(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (name, value) in iter {
            mapping.append(name, value);
        }
        mapping
    }
}

impl From<Vec<(String, String)>> for FieldMapping {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl IntoIterator for FieldMapping {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// A [`FieldMapping`] after bracket encoding, ready to be put on the wire.
///
/// Every name that occurred more than once in the source mapping carries
/// the `[]` suffix on all of its occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedPayload {
    fields: FieldMapping,
}

impl EncodedPayload {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    pub fn as_mapping(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn into_mapping(self) -> FieldMapping {
        self.fields
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.append(name, value);
    }

    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.fields.pairs.retain(|(name, _)| keep(name));
    }
}

/// Names that occur more than once in `items`, each listed once, in the
/// order of their first occurrence.
pub fn find_duplicates<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen_once = HashSet::new();
    let mut seen_twice = HashSet::new();
    let mut duplicates = Vec::new();

    for item in items {
        if seen_once.insert(item.clone()) {
            continue;
        }
        if seen_twice.insert(item.clone()) {
            duplicates.push(item);
        }
    }

    duplicates
}

/// Rename every occurrence of a repeated name `x` to `x[]`.
///
/// Names that already end in `[]` are left alone, as are names that occur
/// only once. Pair count, pair order and values are preserved.
pub fn bracketize(fields: &FieldMapping) -> EncodedPayload {
    let duplicates: HashSet<&str> = find_duplicates(fields.names()).into_iter().collect();

    let encoded = fields
        .iter()
        .map(|(name, value)| {
            if duplicates.contains(name) && !name.ends_with(MULTI_VALUE_SUFFIX) {
                (format!("{name}{MULTI_VALUE_SUFFIX}"), value.to_string())
            } else {
                (name.to_string(), value.to_string())
            }
        })
        .collect::<Vec<_>>();

    EncodedPayload {
        fields: FieldMapping::from(encoded),
    }
}

/// An insertion-ordered key/value record, the structured counterpart of a
/// [`FieldMapping`].
///
/// Values are flattened into form fields when the record is submitted:
/// strings pass through, numbers and booleans are rendered as text, `null`
/// drops the field, arrays become one `name[]` pair per element and nested
/// objects are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    entries: Map<String, Value>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from anything that serializes to a JSON object.
    ///
    /// ```rust
    /// use lead_capture::FieldRecord;
    ///
    /// #[derive(serde::Serialize)]
    /// struct Lead {
    ///     #[serde(rename = "FirstName")]
    ///     first_name: String,
    /// }
    ///
    /// let record = FieldRecord::from_serialize(&Lead { first_name: "Billy".into() }).unwrap();
    /// assert_eq!(record.get("FirstName").and_then(|v| v.as_str()), Some("Billy"));
    /// ```
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| LeadCaptureError::InvalidFieldData(e.to_string()))?;
        Self::try_from(value)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten the record into ordered form fields.
    pub fn to_mapping(&self) -> Result<FieldMapping> {
        let mut mapping = FieldMapping::new();

        for (name, value) in &self.entries {
            match value {
                Value::Array(items) => {
                    let multi_name = if name.ends_with(MULTI_VALUE_SUFFIX) {
                        name.clone()
                    } else {
                        format!("{name}{MULTI_VALUE_SUFFIX}")
                    };
                    for item in items {
                        if let Some(text) = scalar_text(name, item)? {
                            mapping.append(multi_name.clone(), text);
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(name, other)? {
                        mapping.append(name.clone(), text);
                    }
                }
            }
        }

        Ok(mapping)
    }
}

impl TryFrom<Value> for FieldRecord {
    type Error = LeadCaptureError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(LeadCaptureError::InvalidFieldData(format!(
                "expected a key-value object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for FieldRecord {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for FieldRecord
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { entries }
    }
}

/// Field data accepted by the mapping path: either shape is submitted the
/// same way once flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Mapping(FieldMapping),
    Record(FieldRecord),
}

impl FieldData {
    /// Interpret loosely-typed JSON as field data.
    ///
    /// Objects become records. Arrays must hold `[name, value]` pairs and
    /// become mappings, which lets callers express repeated names.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(FieldData::Record(FieldRecord::from(entries))),
            Value::Array(items) => {
                let mut mapping = FieldMapping::new();
                for item in items {
                    match item {
                        Value::Array(pair) if pair.len() == 2 => {
                            let name = pair[0].as_str().ok_or_else(|| {
                                LeadCaptureError::InvalidFieldData(
                                    "field names must be strings".to_string(),
                                )
                            })?;
                            if let Some(text) = scalar_text(name, &pair[1])? {
                                mapping.append(name, text);
                            }
                        }
                        other => {
                            return Err(LeadCaptureError::InvalidFieldData(format!(
                                "expected a [name, value] pair, got {}",
                                json_kind(&other)
                            )))
                        }
                    }
                }
                Ok(FieldData::Mapping(mapping))
            }
            other => Err(LeadCaptureError::InvalidFieldData(format!(
                "expected a key-value object or a list of pairs, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn into_mapping(self) -> Result<FieldMapping> {
        match self {
            FieldData::Mapping(mapping) => Ok(mapping),
            FieldData::Record(record) => record.to_mapping(),
        }
    }
}

impl From<FieldMapping> for FieldData {
    fn from(mapping: FieldMapping) -> Self {
        FieldData::Mapping(mapping)
    }
}

impl From<FieldRecord> for FieldData {
    fn from(record: FieldRecord) -> Self {
        FieldData::Record(record)
    }
}

fn scalar_text(name: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(LeadCaptureError::InvalidFieldData(format!(
            "field '{name}' holds a nested {} which cannot be sent as a form value",
            json_kind(other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
