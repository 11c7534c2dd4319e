use bytes::{Buf, BufMut, Bytes};

use crate::{DecodeError, EncodeError};

/// Bit offset of the Tag Control field inside a control byte.
pub const TAG_CONTROL_SHIFT: u32 = 5;

/// The Tag Control field of a control byte (bits 7-5).
///
/// Only [`TagControl::Anonymous`] and [`TagControl::ContextSpecific`] have
/// defined behaviour. The profile-scoped forms occupy the bit space but are
/// rejected by both the writer and the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagControl {
    Anonymous = 0,
    ContextSpecific = 1,
    CommonProfile2 = 2,
    CommonProfile4 = 3,
    ImplicitProfile2 = 4,
    ImplicitProfile4 = 5,
    FullyQualified6 = 6,
    FullyQualified8 = 7,
}

impl TagControl {
    /// Extracts the Tag Control field from a full control byte.
    pub const fn from_control(control: u8) -> TagControl {
        match control >> TAG_CONTROL_SHIFT {
            0 => TagControl::Anonymous,
            1 => TagControl::ContextSpecific,
            2 => TagControl::CommonProfile2,
            3 => TagControl::CommonProfile4,
            4 => TagControl::ImplicitProfile2,
            5 => TagControl::ImplicitProfile4,
            6 => TagControl::FullyQualified6,
            _ => TagControl::FullyQualified8,
        }
    }

    /// The control byte bits for this field.
    pub const fn bits(self) -> u8 {
        (self as u8) << TAG_CONTROL_SHIFT
    }
}

/// Identifies an element within its enclosing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tag {
    /// No tag. Used for top-level values and every array element.
    #[default]
    Anonymous,
    /// One tag byte, unique among the element's siblings in a structure.
    Context(u8),
}

impl Tag {
    pub const fn control(self) -> TagControl {
        match self {
            Tag::Anonymous => TagControl::Anonymous,
            Tag::Context(_) => TagControl::ContextSpecific,
        }
    }

    pub const fn is_anonymous(self) -> bool {
        matches!(self, Tag::Anonymous)
    }

    /// Number of tag bytes following the control byte.
    pub const fn encoded_len(self) -> usize {
        match self {
            Tag::Anonymous => 0,
            Tag::Context(_) => 1,
        }
    }

    /// Writes the tag bytes that follow the control byte.
    pub(crate) fn put<B: BufMut>(self, writer: &mut B) {
        if let Tag::Context(n) = self {
            writer.put_u8(n);
        }
    }

    /// Reads the tag bytes selected by `control`.
    ///
    /// # Errors
    /// Returns `DecodeError::UnsupportedTag` for profile-scoped tag forms and
    /// `DecodeError::Truncated` if the context tag byte is missing.
    pub(crate) fn decode(control: TagControl, reader: &mut Bytes) -> Result<Tag, DecodeError> {
        match control {
            TagControl::Anonymous => Ok(Tag::Anonymous),
            TagControl::ContextSpecific => {
                if reader.remaining() < 1 {
                    return Err(DecodeError::Truncated {
                        needed: 1,
                        remaining: 0,
                    });
                }
                Ok(Tag::Context(reader.get_u8()))
            }
            other => Err(DecodeError::UnsupportedTag(other)),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Anonymous => f.write_str("anonymous"),
            Tag::Context(n) => write!(f, "context({})", n),
        }
    }
}

impl From<u8> for Tag {
    fn from(n: u8) -> Self {
        Tag::Context(n)
    }
}

impl From<Option<u8>> for Tag {
    fn from(n: Option<u8>) -> Self {
        n.map_or(Tag::Anonymous, Tag::Context)
    }
}

// Wider integers name a context tag only when they fit in one byte. The
// rejected value is reported saturated to i128.
macro_rules! impl_tag_try_from {
    ($($t:ty),+) => {
        $(
            impl TryFrom<$t> for Tag {
                type Error = EncodeError;

                fn try_from(n: $t) -> Result<Self, Self::Error> {
                    u8::try_from(n).map(Tag::Context).map_err(|_| {
                        EncodeError::UnsupportedTag(i128::try_from(n).unwrap_or(i128::MAX))
                    })
                }
            }
        )+
    };
}

impl_tag_try_from!(i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize);
