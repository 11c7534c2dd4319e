use crate::tag::Tag;
use crate::DecodeError;

/// Mask selecting the Element Type from a control byte.
pub const ELEMENT_TYPE_MASK: u8 = 0x1F;

/// Element types of the wire format.
///
/// These occupy the low five bits of every control byte and select how the
/// payload bytes that follow are interpreted. Sized families carry the width
/// of their integer payload or length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 0x00-0x03
    Signed(Width),
    /// 0x04-0x07
    Unsigned(Width),
    False,
    True,
    Float,
    Double,
    /// UTF-8 string, 0x0C-0x0F
    Utf8(Width),
    /// Octet string, 0x10-0x13
    Octets(Width),
    Null,
    Structure,
    Array,
    List,
    /// Marker closing the innermost open container. Never a standalone value.
    EndOfContainer,
}

/// Byte width of an integer payload or length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    One,
    Two,
    Four,
    Eight,
}

impl Width {
    /// Number of payload bytes for this width.
    pub const fn bytes(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Four => 4,
            Width::Eight => 8,
        }
    }

    /// Offset of this width inside a sized element type family.
    const fn index(self) -> u8 {
        match self {
            Width::One => 0,
            Width::Two => 1,
            Width::Four => 2,
            Width::Eight => 3,
        }
    }

    /// Width selected by the low two bits of a sized element type code.
    const fn from_index(index: u8) -> Width {
        match index & 0x03 {
            0 => Width::One,
            1 => Width::Two,
            2 => Width::Four,
            _ => Width::Eight,
        }
    }
}

/// The three container semantics of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Keyed by unique tags.
    Structure,
    /// Ordered, every child anonymous.
    Array,
    /// Ordered, any mix of tags including repeats.
    List,
}

impl ContainerKind {
    pub const fn element_type(self) -> ElementType {
        match self {
            ContainerKind::Structure => ElementType::Structure,
            ContainerKind::Array => ElementType::Array,
            ContainerKind::List => ElementType::List,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ContainerKind::Structure => "structure",
            ContainerKind::Array => "array",
            ContainerKind::List => "list",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a tag may not appear as the next child of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagViolation {
    /// Structure already holds a member with this tag.
    Duplicate,
    /// Array children must be anonymous.
    NotAnonymous,
}

/// An open container on a writer or reader stack.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) kind: ContainerKind,
    seen: Vec<Tag>,
}

impl Frame {
    pub(crate) fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            seen: Vec::new(),
        }
    }

    /// Records `tag` as the next child, enforcing the container's tag rules.
    pub(crate) fn admit(&mut self, tag: Tag) -> Result<(), TagViolation> {
        match self.kind {
            ContainerKind::Structure => {
                if self.seen.contains(&tag) {
                    return Err(TagViolation::Duplicate);
                }
                self.seen.push(tag);
                Ok(())
            }
            ContainerKind::Array if !tag.is_anonymous() => Err(TagViolation::NotAnonymous),
            ContainerKind::Array | ContainerKind::List => Ok(()),
        }
    }

    /// Number of tags admitted so far.
    pub(crate) fn admitted(&self) -> usize {
        self.seen.len()
    }

    /// Forgets every tag admitted after the first `count`.
    pub(crate) fn forget_after(&mut self, count: usize) {
        self.seen.truncate(count);
    }
}

impl ElementType {
    /// The five-bit wire code.
    pub const fn code(self) -> u8 {
        match self {
            ElementType::Signed(w) => w.index(),
            ElementType::Unsigned(w) => 0x04 | w.index(),
            ElementType::False => 0x08,
            ElementType::True => 0x09,
            ElementType::Float => 0x0A,
            ElementType::Double => 0x0B,
            ElementType::Utf8(w) => 0x0C | w.index(),
            ElementType::Octets(w) => 0x10 | w.index(),
            ElementType::Null => 0x14,
            ElementType::Structure => 0x15,
            ElementType::Array => 0x16,
            ElementType::List => 0x17,
            ElementType::EndOfContainer => 0x18,
        }
    }

    /// The container kind opened by this element type, if any.
    pub const fn container(self) -> Option<ContainerKind> {
        match self {
            ElementType::Structure => Some(ContainerKind::Structure),
            ElementType::Array => Some(ContainerKind::Array),
            ElementType::List => Some(ContainerKind::List),
            _ => None,
        }
    }

    pub const fn is_container(self) -> bool {
        self.container().is_some()
    }

    /// Human readable name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Signed(_) => "signed integer",
            ElementType::Unsigned(_) => "unsigned integer",
            ElementType::False | ElementType::True => "boolean",
            ElementType::Float => "float",
            ElementType::Double => "double",
            ElementType::Utf8(_) => "utf-8 string",
            ElementType::Octets(_) => "octet string",
            ElementType::Null => "null",
            ElementType::Structure => "structure",
            ElementType::Array => "array",
            ElementType::List => "list",
            ElementType::EndOfContainer => "end of container",
        }
    }
}

impl From<ElementType> for u8 {
    fn from(ty: ElementType) -> u8 {
        ty.code()
    }
}

impl TryFrom<u8> for ElementType {
    type Error = DecodeError;

    /// Parses the element type bits of a control byte.
    ///
    /// Only the low five bits are inspected.
    fn try_from(control: u8) -> Result<Self, Self::Error> {
        let code = control & ELEMENT_TYPE_MASK;
        let ty = match code {
            0x00..=0x03 => ElementType::Signed(Width::from_index(code)),
            0x04..=0x07 => ElementType::Unsigned(Width::from_index(code)),
            0x08 => ElementType::False,
            0x09 => ElementType::True,
            0x0A => ElementType::Float,
            0x0B => ElementType::Double,
            0x0C..=0x0F => ElementType::Utf8(Width::from_index(code)),
            0x10..=0x13 => ElementType::Octets(Width::from_index(code)),
            0x14 => ElementType::Null,
            0x15 => ElementType::Structure,
            0x16 => ElementType::Array,
            0x17 => ElementType::List,
            0x18 => ElementType::EndOfContainer,
            other => return Err(DecodeError::UnknownElementType(other)),
        };
        Ok(ty)
    }
}
