use bytes::Bytes;
use indexmap::IndexMap;

use crate::element::ContainerKind;
use crate::list::TaggedList;
use crate::primitive::{checked_signed, checked_unsigned};
use crate::tag::Tag;
use crate::EncodeError;

/// A decoded or to-be-encoded element.
///
/// This is the closed set of value kinds the writer knows how to put and the
/// reader produces. Signed and unsigned integers are distinct kinds: an
/// unsigned value always round-trips as [`Value::Unsigned`], a signed value as
/// [`Value::Signed`], whatever their magnitude.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Bytes),
    Null,
    Structure(Structure),
    Array(Vec<Value>),
    List(TaggedList),
}

impl Value {
    /// Builds a signed value from a wider integer.
    ///
    /// # Errors
    /// Returns `EncodeError::Range` outside the signed 64-bit range.
    pub fn checked_signed(v: i128) -> Result<Value, EncodeError> {
        checked_signed(v).map(Value::Signed)
    }

    /// Builds an unsigned value from a wider integer.
    ///
    /// # Errors
    /// Returns `EncodeError::Range` for negative values or values above `2^64 - 1`.
    pub fn checked_unsigned(v: i128) -> Result<Value, EncodeError> {
        checked_unsigned(v).map(Value::Unsigned)
    }

    /// Name of the value kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Signed(_) => "signed integer",
            Value::Unsigned(_) => "unsigned integer",
            Value::Bool(_) => "boolean",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Text(_) => "utf-8 string",
            Value::Bytes(_) => "octet string",
            Value::Null => "null",
            Value::Structure(_) => "structure",
            Value::Array(_) => "array",
            Value::List(_) => "list",
        }
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Value::Structure(_) => Some(ContainerKind::Structure),
            Value::Array(_) => Some(ContainerKind::Array),
            Value::List(_) => Some(ContainerKind::List),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_signed(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TaggedList> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_value_from {
    ($variant:ident as $wide:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $wide)
                }
            }
        )+
    };
}

impl_value_from!(Signed as i64: i8, i16, i32, i64);
impl_value_from!(Unsigned as u64: u8, u16, u32, u64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Structure> for Value {
    fn from(v: Structure) -> Self {
        Value::Structure(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<TaggedList> for Value {
    fn from(v: TaggedList) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Tag-keyed container: the in-memory form of a Structure.
///
/// Keys are unique, so at most one anonymous member can exist. Members keep
/// the order in which they were inserted or decoded and are written back in
/// that order, but equality compares tag sets and ignores order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Structure {
    members: IndexMap<Tag, Value>,
}

impl Structure {
    pub fn new() -> Self {
        Self {
            members: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts a member, returning the previous value stored under `tag`.
    pub fn insert(&mut self, tag: impl Into<Tag>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(tag.into(), value.into())
    }

    pub fn get(&self, tag: impl Into<Tag>) -> Option<&Value> {
        self.members.get(&tag.into())
    }

    pub fn contains_tag(&self, tag: impl Into<Tag>) -> bool {
        self.members.contains_key(&tag.into())
    }

    /// Removes a member, keeping the order of the remaining ones.
    pub fn remove(&mut self, tag: impl Into<Tag>) -> Option<Value> {
        self.members.shift_remove(&tag.into())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Tag, Value> {
        self.members.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.members.keys().copied()
    }
}

impl<T: Into<Tag>, V: Into<Value>> FromIterator<(T, V)> for Structure {
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let mut structure = Structure::new();
        for (tag, value) in iter {
            structure.insert(tag, value);
        }
        structure
    }
}

impl IntoIterator for Structure {
    type Item = (Tag, Value);
    type IntoIter = indexmap::map::IntoIter<Tag, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a Structure {
    type Item = (&'a Tag, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Tag, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
