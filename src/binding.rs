//! Encoding and decoding typed objects through their descriptors.
//!
//! Objects go through an intermediate [`Record`] so that the schema walk is
//! the same for derived types and hand-written descriptors.

use bytes::Bytes;

use crate::descriptor::{Descriptor, FieldDescriptor, FieldType};
use crate::record::{FieldValue, Record};
use crate::tag::Tag;
use crate::value::{Structure, Value};
use crate::writer::Writer;
use crate::{DecodeError, EncodeError, Error, SchemaError};

/// A type bound to a structure by a static [`Descriptor`].
///
/// Usually implemented with `#[derive(TlvObject)]`.
pub trait TlvObject: Sized {
    fn descriptor() -> &'static Descriptor;

    /// Collects the field values of `self` by label.
    fn to_record(&self) -> Record;

    /// Rebuilds an object from a record that has been checked against
    /// [`TlvObject::descriptor`].
    fn from_record(record: Record) -> Result<Self, SchemaError>;
}

/// A Rust type usable as an object field.
pub trait TlvField: Sized {
    fn field_type() -> FieldType;

    fn to_field(&self) -> FieldValue;

    fn from_field(field: FieldValue) -> Result<Self, SchemaError>;
}

/// Writes `record` as a structure tagged `tag`, in descriptor field order.
///
/// Absent optional fields are omitted and absent nullable fields are written
/// as null.
///
/// # Errors
/// - `SchemaError::MissingField` for an absent field that is neither optional nor nullable.
/// - `SchemaError::Mismatch` when a value does not have its declared type.
/// - `SchemaError::OutOfRange` when signedness normalization overflows.
/// - Any error raised by the writer.
///
/// On error the writer is left as it was before the call.
pub fn encode_record(
    writer: &mut Writer,
    tag: impl Into<Tag>,
    record: &Record,
    descriptor: &Descriptor,
) -> Result<(), EncodeError> {
    let checkpoint = writer.checkpoint();
    write_record(writer, tag.into(), record, descriptor).map_err(|e| {
        writer.rewind(checkpoint);
        e
    })
}

fn write_record(
    writer: &mut Writer,
    tag: Tag,
    record: &Record,
    descriptor: &Descriptor,
) -> Result<(), EncodeError> {
    writer.open_structure(tag)?;
    for field in descriptor.fields() {
        match record.get(field.label) {
            None if field.optional => {}
            None if field.nullable => writer.put(field.context_tag(), &Value::Null)?,
            None => {
                return Err(SchemaError::MissingField {
                    field: field.label,
                    object: descriptor.name(),
                }
                .into())
            }
            Some(value) => write_member(writer, field, value)?,
        }
    }
    writer.close()
}

fn write_member(
    writer: &mut Writer,
    field: &FieldDescriptor,
    value: &FieldValue,
) -> Result<(), EncodeError> {
    if value.is_null() {
        if !field.nullable {
            return Err(SchemaError::mismatch(field.ty.name(), "null")
                .in_field(field.label)
                .into());
        }
        return writer.put(field.context_tag(), &Value::Null);
    }
    write_field(writer, field.context_tag(), value, &field.ty).map_err(|e| match e {
        EncodeError::Schema(e) => EncodeError::Schema(e.in_field(field.label)),
        other => other,
    })
}

fn write_field(
    writer: &mut Writer,
    tag: Tag,
    value: &FieldValue,
    ty: &FieldType,
) -> Result<(), EncodeError> {
    match (ty, value) {
        (FieldType::Struct(descriptor), FieldValue::Object(record)) => {
            write_record(writer, tag, record, descriptor())
        }
        (FieldType::ListOf(item_ty), FieldValue::Array(items)) => {
            writer.open_array(tag)?;
            for item in items {
                write_field(writer, Tag::Anonymous, item, item_ty)?;
            }
            writer.close()
        }
        (_, FieldValue::Value(v)) => match normalize(v, ty)? {
            Some(normalized) => writer.put(tag, &normalized),
            None => writer.put(tag, v),
        },
        (_, other) => Err(SchemaError::mismatch(ty.name(), other.kind_name()).into()),
    }
}

/// Checks a generic structure against `descriptor` and converts it into a record.
///
/// Members whose tag the descriptor does not name are ignored.
///
/// # Errors
/// - `SchemaError::MissingField` for an absent field that is not optional.
/// - `SchemaError::Mismatch` for a member of the wrong kind, or null in a field that is not nullable.
/// - `SchemaError::OutOfRange` when signedness normalization overflows.
pub fn decode_record(
    mut structure: Structure,
    descriptor: &Descriptor,
) -> Result<Record, SchemaError> {
    let mut record = Record::new();
    for field in descriptor.fields() {
        match structure.remove(field.context_tag()) {
            None if field.optional => {}
            None => {
                return Err(SchemaError::MissingField {
                    field: field.label,
                    object: descriptor.name(),
                })
            }
            Some(Value::Null) if field.nullable => {
                record.insert(field.label, Value::Null);
            }
            Some(value) => {
                let value = read_field(value, &field.ty).map_err(|e| e.in_field(field.label))?;
                record.insert(field.label, value);
            }
        }
    }
    if !structure.is_empty() {
        log::debug!(
            "{}: ignoring {} unknown member(s)",
            descriptor.name(),
            structure.len()
        );
    }
    Ok(record)
}

fn read_field(value: Value, ty: &FieldType) -> Result<FieldValue, SchemaError> {
    match (ty, value) {
        (FieldType::Struct(descriptor), Value::Structure(members)) => {
            decode_record(members, descriptor()).map(FieldValue::Object)
        }
        (FieldType::ListOf(item_ty), Value::Array(items)) => items
            .into_iter()
            .map(|item| read_field(item, item_ty))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Array),
        (_, value) => Ok(FieldValue::Value(normalize(&value, ty)?.unwrap_or(value))),
    }
}

/// Checks a scalar or raw list against its declared type.
///
/// Integers are accepted across signedness when the value fits; the converted
/// value is returned in that case. Every other kind must match exactly.
fn normalize(value: &Value, ty: &FieldType) -> Result<Option<Value>, SchemaError> {
    match (ty, value) {
        (FieldType::Signed, Value::Signed(_))
        | (FieldType::Unsigned, Value::Unsigned(_))
        | (FieldType::Bool, Value::Bool(_))
        | (FieldType::Float, Value::Float(_))
        | (FieldType::Double, Value::Double(_))
        | (FieldType::Text, Value::Text(_))
        | (FieldType::Bytes, Value::Bytes(_))
        | (FieldType::List, Value::List(_)) => Ok(None),
        (FieldType::Signed, Value::Unsigned(v)) => i64::try_from(*v)
            .map(|v| Some(Value::Signed(v)))
            .map_err(|_| SchemaError::OutOfRange {
                ty: "signed integer",
                value: *v as i128,
            }),
        (FieldType::Unsigned, Value::Signed(v)) => u64::try_from(*v)
            .map(|v| Some(Value::Unsigned(v)))
            .map_err(|_| SchemaError::OutOfRange {
                ty: "unsigned integer",
                value: *v as i128,
            }),
        (ty, value) => Err(SchemaError::mismatch(ty.name(), value.kind_name())),
    }
}

/// Writes `object` as a structure tagged `tag`.
pub fn encode_object<T: TlvObject>(
    writer: &mut Writer,
    tag: impl Into<Tag>,
    object: &T,
) -> Result<(), EncodeError> {
    encode_record(writer, tag, &object.to_record(), T::descriptor())
}

/// Builds an object from a generic structure.
pub fn decode_object<T: TlvObject>(structure: Structure) -> Result<T, SchemaError> {
    T::from_record(decode_record(structure, T::descriptor())?)
}

/// Encodes `object` as a single anonymous top-level structure.
///
/// # Example
/// ```rust
/// use tlv_codec::{to_bytes, TlvObject};
///
/// #[derive(TlvObject)]
/// struct Level {
///     #[tlv(tag = 1)]
///     value: u8,
/// }
///
/// assert_eq!(&to_bytes(&Level { value: 3 }).unwrap()[..], &[0x15, 0x24, 0x01, 0x03, 0x18]);
/// ```
pub fn to_bytes<T: TlvObject>(object: &T) -> crate::Result<Bytes> {
    let mut writer = Writer::new();
    encode_object(&mut writer, Tag::Anonymous, object)?;
    Ok(writer.finish()?)
}

/// Decodes an object from a single top-level structure.
///
/// # Errors
/// Always `Error::Decode`: any error from [`crate::decode`],
/// `SchemaError::Mismatch` when the top-level element is not a structure, or a
/// schema error for its members.
pub fn from_bytes<T: TlvObject>(input: impl Into<Bytes>) -> crate::Result<T> {
    let (_, value) = crate::decode(input)?;
    let object = match value {
        Value::Structure(structure) => decode_object(structure),
        other => Err(SchemaError::mismatch("structure", other.kind_name())),
    };
    object.map_err(|e| {
        log::debug!("{}: {}", T::descriptor().name(), e);
        Error::Decode(DecodeError::Schema(e))
    })
}
