//! # tlv-codec
//!
//! A compact, self-describing tag-length-value codec for device interaction
//! payloads, with a typed binding layer that maps Rust structs onto it.
//!
//! - Every element starts with a control byte: Tag Control in bits 7-5,
//!   Element Type in bits 4-0. A context tag byte may follow.
//! - Integers and string lengths use the smallest of 1, 2, 4 or 8 little-endian bytes.
//! - Containers are delimited by an end-of-container marker, no lengths are precomputed.
//! - Three container kinds: [`Structure`] (unique tags), array (anonymous
//!   elements, `Vec<Value>`) and [`TaggedList`] (any tags, order kept).
//!
//! ## Generic values
//!
//! ```rust
//! use tlv_codec::{decode, encode, Tag, TaggedList, Value};
//!
//! let mut list = TaggedList::new();
//! list.push(Tag::Anonymous, 1i64);
//! list.push(Tag::Anonymous, 2i64);
//! list.push(1u8, 3i64);
//!
//! let bytes = encode(Tag::Anonymous, &Value::List(list.clone())).unwrap();
//! assert_eq!(&bytes[..], &[0x17, 0x00, 0x01, 0x00, 0x02, 0x20, 0x01, 0x03, 0x18]);
//! assert_eq!(decode(bytes).unwrap(), (Tag::Anonymous, Value::List(list)));
//! ```
//!
//! ## Typed objects
//!
//! `#[derive(TlvObject)]` binds a struct to a structure. Each field needs a
//! context tag; the attributes below adjust how a field is bound.
//!
//! - `#[tlv(tag = N)]` - Context tag of the field (0-255, unique per struct).
//! - `#[tlv(optional)]` - The field may be absent. Implied for `Option<T>` fields.
//! - `#[tlv(nullable)]` - The field is always present but may be null. On an
//!   `Option<T>` field, `None` is written as null instead of being omitted.
//! - `#[tlv(rename = "label")]` - Label used in the descriptor and in error messages.
//!
//! ```rust
//! use tlv_codec::{from_bytes, to_bytes, TlvObject};
//!
//! #[derive(TlvObject, Debug, PartialEq)]
//! struct Attribute {
//!     #[tlv(tag = 0)]
//!     data_version: u32,
//!     #[tlv(tag = 2)]
//!     endpoint: u8,
//!     #[tlv(tag = 3)]
//!     label: Option<String>,
//! }
//!
//! let value = Attribute { data_version: 374710975, endpoint: 1, label: None };
//! let bytes = to_bytes(&value).unwrap();
//! assert_eq!(from_bytes::<Attribute>(bytes).unwrap(), value);
//! ```

pub mod binding;
pub mod config;
pub mod descriptor;
pub mod element;
mod field;
pub mod list;
pub mod primitive;
pub mod reader;
pub mod record;
pub mod tag;
pub mod value;
pub mod writer;

use bytes::Bytes;

pub use binding::{
    decode_object, decode_record, encode_object, encode_record, from_bytes, to_bytes, TlvField,
    TlvObject,
};
pub use config::Config;
pub use descriptor::{Descriptor, DescriptorFn, FieldDescriptor, FieldType};
pub use element::{ContainerKind, ElementType, Width};
pub use list::TaggedList;
pub use reader::{Header, Reader};
pub use record::{FieldValue, Record};
pub use tag::{Tag, TagControl};
pub use tlv_codec_derive::TlvObject;
pub use value::{Structure, Value};
pub use writer::Writer;

/// Errors raised while encoding: the caller built something the format
/// cannot represent. The message must not be sent.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("value {value} is outside the {} 64-bit range", signedness(.signed))]
    Range { value: i128, signed: bool },
    #[error("tag {0} is not representable: only anonymous and one-byte context tags are supported")]
    UnsupportedTag(i128),
    #[error("{tag} tag is not allowed inside an {container}")]
    TagNotAllowed { tag: Tag, container: ContainerKind },
    #[error("structure already has a member tagged {0}")]
    DuplicateTag(Tag),
    #[error("close() called with no open container")]
    NoOpenContainer,
    #[error("{open} container(s) still open")]
    UnterminatedContainer { open: usize },
    #[error("container nesting exceeds the limit of {max}")]
    DepthExceeded { max: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while decoding: the input is malformed, truncated or does
/// not match the expected schema.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("input truncated: needed {needed} byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("unknown element type 0x{0:02X}")]
    UnknownElementType(u8),
    #[error("unsupported tag form {0:?}")]
    UnsupportedTag(TagControl),
    #[error("malformed {tag} tag: {reason}")]
    MalformedTag { tag: Tag, reason: &'static str },
    #[error("input ended with {open} container(s) still open")]
    UnterminatedContainer { open: usize },
    #[error("end of container outside any open container")]
    UnexpectedEndOfContainer,
    #[error("invalid utf-8 string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("container nesting exceeds the limit of {max}")]
    DepthExceeded { max: usize },
    #[error("{0} byte(s) left after the top-level element")]
    TrailingBytes(usize),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A value disagrees with the descriptor it is bound to.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("required field `{field}` missing from {object}")]
    MissingField {
        field: &'static str,
        object: &'static str,
    },
    #[error("value {value} does not fit in {ty}")]
    OutOfRange { ty: &'static str, value: i128 },
    #[error("field `{field}`: {source}")]
    InField {
        field: &'static str,
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    pub(crate) fn mismatch(expected: &'static str, found: &'static str) -> Self {
        SchemaError::Mismatch { expected, found }
    }

    /// Attributes this error to the field labelled `field`.
    pub fn in_field(self, field: &'static str) -> Self {
        SchemaError::InField {
            field,
            source: Box::new(self),
        }
    }

    /// The error with every field attribution removed.
    pub fn root(&self) -> &SchemaError {
        match self {
            SchemaError::InField { source, .. } => source.root(),
            other => other,
        }
    }
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}

/// Either side of the codec failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl Error {
    /// True when the failure came from received data rather than local code.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// The schema error behind this failure, on either side.
    pub fn schema(&self) -> Option<&SchemaError> {
        match self {
            Error::Encode(EncodeError::Schema(e)) | Error::Decode(DecodeError::Schema(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result of the object-level entry points [`to_bytes`] and [`from_bytes`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Encodes a single top-level element.
///
/// # Example
/// ```rust
/// use tlv_codec::{encode, Tag, Value};
///
/// assert_eq!(&encode(Tag::Anonymous, &Value::Unsigned(0xde)).unwrap()[..], &[0x04, 0xDE]);
/// ```
pub fn encode(tag: impl Into<Tag>, value: &Value) -> Result<Bytes, EncodeError> {
    let mut writer = Writer::new();
    writer.put(tag, value)?;
    writer.finish()
}

/// Decodes exactly one top-level element.
///
/// # Errors
/// Returns `DecodeError::TrailingBytes` when input is left after the element,
/// or any error raised by [`Reader::get`].
pub fn decode(input: impl Into<Bytes>) -> Result<(Tag, Value), DecodeError> {
    decode_with_config(input, Config::default())
}

/// Like [`decode`], with explicit limits.
pub fn decode_with_config(
    input: impl Into<Bytes>,
    config: Config,
) -> Result<(Tag, Value), DecodeError> {
    let mut reader = Reader::with_config(input, config);
    let element = reader.get().map_err(|e| {
        log::debug!("rejecting tlv input: {}", e);
        e
    })?;
    if reader.remaining() > 0 {
        log::debug!("rejecting tlv input: {} trailing byte(s)", reader.remaining());
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }
    Ok(element)
}
