use indexmap::IndexMap;

use crate::value::Value;

/// A bound field value: a scalar or raw list, a nested object, or an array of
/// bound values.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Object(Record),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Value(v) => v.kind_name(),
            FieldValue::Object(_) => "structure",
            FieldValue::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            FieldValue::Object(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Value(v)
    }
}

impl From<Record> for FieldValue {
    fn from(r: Record) -> Self {
        FieldValue::Object(r)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(items)
    }
}

/// Field values of one object, keyed by descriptor label.
///
/// A label that is not present means the field is absent; a field that is
/// present but null holds `FieldValue::Value(Value::Null)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: IndexMap<&'static str, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        label: &'static str,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(label, value.into())
    }

    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields.get(label)
    }

    /// Removes a field and returns it.
    pub fn take(&mut self, label: &str) -> Option<FieldValue> {
        self.fields.shift_remove(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.fields.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}
