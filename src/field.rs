//! [`TlvField`] implementations for primitive and std types.

use bytes::Bytes;

use crate::binding::TlvField;
use crate::descriptor::FieldType;
use crate::list::TaggedList;
use crate::record::FieldValue;
use crate::value::Value;
use crate::SchemaError;

fn mismatch(expected: &FieldType, found: &FieldValue) -> SchemaError {
    SchemaError::mismatch(expected.name(), found.kind_name())
}

macro_rules! impl_signed_field {
    ($($t:ty),*) => {
        $(
            impl TlvField for $t {
                fn field_type() -> FieldType {
                    FieldType::Signed
                }

                fn to_field(&self) -> FieldValue {
                    FieldValue::Value(Value::Signed(*self as i64))
                }

                fn from_field(field: FieldValue) -> Result<Self, SchemaError> {
                    let wide = match field {
                        FieldValue::Value(Value::Signed(v)) => v as i128,
                        FieldValue::Value(Value::Unsigned(v)) => v as i128,
                        other => return Err(mismatch(&FieldType::Signed, &other)),
                    };
                    <$t>::try_from(wide).map_err(|_| SchemaError::OutOfRange {
                        ty: stringify!($t),
                        value: wide,
                    })
                }
            }
        )*
    };
}

macro_rules! impl_unsigned_field {
    ($($t:ty),*) => {
        $(
            impl TlvField for $t {
                fn field_type() -> FieldType {
                    FieldType::Unsigned
                }

                fn to_field(&self) -> FieldValue {
                    FieldValue::Value(Value::Unsigned(*self as u64))
                }

                fn from_field(field: FieldValue) -> Result<Self, SchemaError> {
                    let wide = match field {
                        FieldValue::Value(Value::Unsigned(v)) => v as i128,
                        FieldValue::Value(Value::Signed(v)) => v as i128,
                        other => return Err(mismatch(&FieldType::Unsigned, &other)),
                    };
                    <$t>::try_from(wide).map_err(|_| SchemaError::OutOfRange {
                        ty: stringify!($t),
                        value: wide,
                    })
                }
            }
        )*
    };
}

impl_signed_field!(i8, i16, i32, i64);
impl_unsigned_field!(u8, u16, u32, u64);

/// Scalars that map one-to-one onto a value kind.
macro_rules! impl_scalar_field {
    ($t:ty, $ty:ident, $variant:ident) => {
        impl TlvField for $t {
            fn field_type() -> FieldType {
                FieldType::$ty
            }

            fn to_field(&self) -> FieldValue {
                FieldValue::Value(Value::$variant(self.clone()))
            }

            fn from_field(field: FieldValue) -> Result<Self, SchemaError> {
                match field {
                    FieldValue::Value(Value::$variant(v)) => Ok(v),
                    other => Err(mismatch(&FieldType::$ty, &other)),
                }
            }
        }
    };
}

impl_scalar_field!(bool, Bool, Bool);
impl_scalar_field!(f32, Float, Float);
impl_scalar_field!(f64, Double, Double);
impl_scalar_field!(String, Text, Text);
impl_scalar_field!(Bytes, Bytes, Bytes);
impl_scalar_field!(TaggedList, List, List);

impl<T: TlvField> TlvField for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::list_of(T::field_type())
    }

    fn to_field(&self) -> FieldValue {
        FieldValue::Array(self.iter().map(T::to_field).collect())
    }

    fn from_field(field: FieldValue) -> Result<Self, SchemaError> {
        match field {
            FieldValue::Array(items) => items.into_iter().map(T::from_field).collect(),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

/// `None` is bound as null. Whether a null field is omitted or written is
/// decided by the field's modifiers.
impl<T: TlvField> TlvField for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_field(&self) -> FieldValue {
        match self {
            Some(v) => v.to_field(),
            None => FieldValue::Value(Value::Null),
        }
    }

    fn from_field(field: FieldValue) -> Result<Self, SchemaError> {
        if field.is_null() {
            return Ok(None);
        }
        T::from_field(field).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_checks_range() {
        assert_eq!(u8::from_field(Value::Unsigned(255).into()).unwrap(), 255);
        assert!(matches!(
            u8::from_field(Value::Unsigned(256).into()),
            Err(SchemaError::OutOfRange { ty: "u8", value: 256 })
        ));
        assert_eq!(i16::from_field(Value::Unsigned(7).into()).unwrap(), 7);
        assert!(u32::from_field(Value::Signed(-1).into()).is_err());
    }

    #[test]
    fn kinds_are_not_coerced() {
        assert!(matches!(
            bool::from_field(Value::Unsigned(1).into()),
            Err(SchemaError::Mismatch {
                expected: "boolean",
                found: "unsigned integer"
            })
        ));
        assert!(f64::from_field(Value::Float(1.0).into()).is_err());
    }

    #[test]
    fn vectors_and_options() {
        let v = vec![1u16, 2, 3];
        assert_eq!(Vec::<u16>::from_field(v.to_field()).unwrap(), v);
        assert_eq!(
            Vec::<u16>::field_type(),
            FieldType::list_of(FieldType::Unsigned)
        );
        assert_eq!(Option::<String>::from_field(None::<String>.to_field()).unwrap(), None);
        assert_eq!(
            Option::<String>::from_field(Value::from("x").into()).unwrap(),
            Some("x".to_string())
        );
    }
}
