//! Records — the flat, named field sets produced by one source per cycle.
//!
//! Every source type lists its template-visible fields explicitly through
//! [`IntoRecord`]; the renderer only ever sees the resulting [`Record`], so
//! field discovery needs no reflection.

/// Marker placed between list elements when a list field is rendered.
pub const LINE_BREAK: &str = "<br>";

/// A renderable field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// String form substituted into templates.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(LINE_BREAK),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// Immutable field table for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    source: String,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Start an empty record for `source`.
    pub fn builder(source: &str) -> RecordBuilder {
        RecordBuilder {
            source: source.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects fields before freezing them into a [`Record`].
pub struct RecordBuilder {
    source: String,
    fields: Vec<(String, FieldValue)>,
}

impl RecordBuilder {
    /// Add a field. A later field with the same name replaces the earlier one.
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn build(self) -> Record {
        Record {
            source: self.source,
            fields: self.fields,
        }
    }
}

/// Typed source output that knows its own field table.
pub trait IntoRecord {
    fn into_record(self, source: &str) -> Record;
}
