//! Static schemas binding typed objects to structures.
//!
//! A [`Descriptor`] lists the fields of one object kind: label, context tag,
//! declared type and the `nullable`/`optional` modifiers. Descriptors are
//! usually generated by `#[derive(TlvObject)]` and live for the whole program.

use std::fmt;

use crate::tag::Tag;

/// Lazily resolves a nested descriptor.
///
/// A function pointer rather than a reference, so that descriptors may refer
/// to each other (or to themselves) without initialization order issues.
pub type DescriptorFn = fn() -> &'static Descriptor;

/// Declared type of a field.
#[derive(Clone)]
pub enum FieldType {
    Signed,
    Unsigned,
    Bool,
    Float,
    Double,
    Text,
    Bytes,
    /// A tagged list, passed through as-is.
    List,
    /// A nested object, bound through its own descriptor.
    Struct(DescriptorFn),
    /// An array whose every element has the given type.
    ListOf(Box<FieldType>),
}

impl FieldType {
    pub fn list_of(item: FieldType) -> Self {
        FieldType::ListOf(Box::new(item))
    }

    /// Human readable name, matching [`crate::Value::kind_name`] for scalars.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Signed => "signed integer",
            FieldType::Unsigned => "unsigned integer",
            FieldType::Bool => "boolean",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Text => "utf-8 string",
            FieldType::Bytes => "octet string",
            FieldType::List => "list",
            FieldType::Struct(_) => "structure",
            FieldType::ListOf(_) => "array",
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Struct(descriptor) => write!(f, "Struct({})", descriptor().name()),
            FieldType::ListOf(item) => f.debug_tuple("ListOf").field(item).finish(),
            other => f.write_str(match other {
                FieldType::Signed => "Signed",
                FieldType::Unsigned => "Unsigned",
                FieldType::Bool => "Bool",
                FieldType::Float => "Float",
                FieldType::Double => "Double",
                FieldType::Text => "Text",
                FieldType::Bytes => "Bytes",
                _ => "List",
            }),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Struct(a), FieldType::Struct(b)) => std::ptr::eq(a(), b()),
            (FieldType::ListOf(a), FieldType::ListOf(b)) => a == b,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

/// One field of a [`Descriptor`].
///
/// # Example
/// ```rust
/// use tlv_codec::{FieldDescriptor, FieldType};
///
/// let field = FieldDescriptor::new("label", 3, FieldType::Text).optional();
/// assert!(field.optional && !field.nullable);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub tag: u8,
    pub ty: FieldType,
    /// Present on the wire, possibly as null.
    pub nullable: bool,
    /// May be omitted from the wire.
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(label: &'static str, tag: u8, ty: FieldType) -> Self {
        Self {
            label,
            tag,
            ty,
            nullable: false,
            optional: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// The context tag this field is written under.
    pub fn context_tag(&self) -> Tag {
        Tag::Context(self.tag)
    }
}

/// Schema of one object kind.
#[derive(Debug, PartialEq)]
pub struct Descriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl Descriptor {
    /// Builds a descriptor from fields in wire order.
    ///
    /// # Panics
    /// Panics if two fields share a tag or a label. Descriptors are static
    /// program data, so this is a programming error.
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            for earlier in &fields[..i] {
                assert!(
                    earlier.tag != field.tag,
                    "{}: fields `{}` and `{}` share tag {}",
                    name,
                    earlier.label,
                    field.label,
                    field.tag
                );
                assert!(
                    earlier.label != field.label,
                    "{}: label `{}` used twice",
                    name,
                    field.label
                );
            }
        }
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, label: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.label == label)
    }

    pub fn field_by_tag(&self, tag: u8) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn point() -> &'static Descriptor {
        static DESCRIPTOR: OnceLock<Descriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            Descriptor::new(
                "Point",
                vec![
                    FieldDescriptor::new("x", 0, FieldType::Signed),
                    FieldDescriptor::new("y", 1, FieldType::Signed),
                ],
            )
        })
    }

    #[test]
    fn lookup_by_label_and_tag() {
        let d = point();
        assert_eq!(d.field("y").unwrap().tag, 1);
        assert_eq!(d.field_by_tag(0).unwrap().label, "x");
        assert!(d.field("z").is_none());
    }

    #[test]
    fn nested_types_compare_by_descriptor() {
        assert_eq!(FieldType::Struct(point), FieldType::Struct(point));
        assert_ne!(FieldType::Struct(point), FieldType::Signed);
        assert_eq!(
            FieldType::list_of(FieldType::Text),
            FieldType::list_of(FieldType::Text)
        );
        assert_ne!(
            FieldType::list_of(FieldType::Text),
            FieldType::list_of(FieldType::Bytes)
        );
        assert_eq!(format!("{:?}", FieldType::Struct(point)), "Struct(Point)");
    }

    #[test]
    #[should_panic(expected = "share tag")]
    fn duplicate_tags_are_rejected() {
        Descriptor::new(
            "Bad",
            vec![
                FieldDescriptor::new("a", 1, FieldType::Bool),
                FieldDescriptor::new("b", 1, FieldType::Bool),
            ],
        );
    }
}
