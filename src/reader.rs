use bytes::{Buf, Bytes};

use crate::config::Config;
use crate::element::{ContainerKind, ElementType, Frame, TagViolation};
use crate::list::TaggedList;
use crate::primitive::{
    get_f32, get_f64, get_octets, get_signed, get_unsigned, get_utf8, skip_payload,
};
use crate::tag::{Tag, TagControl};
use crate::value::{Structure, Value};
use crate::DecodeError;

/// Tag and element type of an element, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub element_type: ElementType,
}

/// Decoder over an in-memory buffer.
///
/// [`Reader::next`] walks the input one header at a time and never
/// materializes children: after a container header the following call enters
/// the container, after a scalar header it skips the payload.
/// [`Reader::get`] materializes the current element, including everything
/// nested inside it.
///
/// Every container must be closed inside the buffer, container tag rules are
/// enforced, and nesting is bounded by [`Config::max_depth`].
///
/// # Example
/// ```rust
/// use tlv_codec::{Reader, Tag, Value};
///
/// let mut reader = Reader::new(vec![0x00, 0x7C]);
/// assert_eq!(reader.get().unwrap(), (Tag::Anonymous, Value::Signed(0x7c)));
/// assert!(reader.next().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct Reader {
    buf: Bytes,
    frames: Vec<Frame>,
    current: Option<Header>,
    config: Config,
}

impl Reader {
    pub fn new(input: impl Into<Bytes>) -> Self {
        Self::with_config(input, Config::default())
    }

    pub fn with_config(input: impl Into<Bytes>, config: Config) -> Self {
        Self {
            buf: input.into(),
            frames: Vec::new(),
            current: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of containers currently entered.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Unconsumed input bytes.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Advances to the next element header.
    ///
    /// End-of-container markers are returned as headers with
    /// [`ElementType::EndOfContainer`] and leave the container. Returns
    /// `Ok(None)` once the input is exhausted with no container open.
    ///
    /// # Errors
    /// Returns a `DecodeError` for malformed or truncated input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Header>, DecodeError> {
        if let Some(current) = self.current.take() {
            match current.element_type.container() {
                Some(kind) => self.enter(kind)?,
                None => skip_payload(&mut self.buf, current.element_type)?,
            }
        }
        let header = self.read_header()?;
        self.current = header.filter(|h| h.element_type != ElementType::EndOfContainer);
        Ok(header)
    }

    /// Materializes the current element.
    ///
    /// The current element is the one whose header the last [`Reader::next`]
    /// returned, or the next one in the input if there is none. Containers are
    /// decoded completely: structures into [`Structure`], arrays into
    /// `Vec<Value>` and lists into [`TaggedList`].
    ///
    /// # Errors
    /// - `DecodeError::Truncated` when no element is left.
    /// - `DecodeError::UnexpectedEndOfContainer` when positioned on an end-of-container marker.
    /// - Any error raised while decoding the element's payload or children.
    pub fn get(&mut self) -> Result<(Tag, Value), DecodeError> {
        let header = match self.current.take() {
            Some(header) => header,
            None => {
                if self.buf.first().copied() == Some(ElementType::EndOfContainer.code()) {
                    return Err(DecodeError::UnexpectedEndOfContainer);
                }
                self.read_header()?.ok_or(DecodeError::Truncated {
                    needed: 1,
                    remaining: 0,
                })?
            }
        };
        let value = self.read_value(header.element_type)?;
        Ok((header.tag, value))
    }

    fn enter(&mut self, kind: ContainerKind) -> Result<(), DecodeError> {
        if self.frames.len() >= self.config.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        self.frames.push(Frame::new(kind));
        log::trace!("entered {} at depth {}", kind, self.frames.len());
        Ok(())
    }

    /// Reads the control byte and tag of the next element.
    ///
    /// End-of-container markers pop the innermost frame; every other element
    /// is admitted against the tag rules of its parent.
    fn read_header(&mut self) -> Result<Option<Header>, DecodeError> {
        if !self.buf.has_remaining() {
            if !self.frames.is_empty() {
                return Err(DecodeError::UnterminatedContainer {
                    open: self.frames.len(),
                });
            }
            return Ok(None);
        }

        let control = self.buf.get_u8();
        let element_type = ElementType::try_from(control)?;
        let tag = Tag::decode(TagControl::from_control(control), &mut self.buf)?;

        if element_type == ElementType::EndOfContainer {
            if !tag.is_anonymous() {
                return Err(DecodeError::MalformedTag {
                    tag,
                    reason: "end of container carries a tag",
                });
            }
            let frame = self
                .frames
                .pop()
                .ok_or(DecodeError::UnexpectedEndOfContainer)?;
            log::trace!("left {} at depth {}", frame.kind, self.frames.len());
        } else if let Some(frame) = self.frames.last_mut() {
            frame.admit(tag).map_err(|violation| DecodeError::MalformedTag {
                tag,
                reason: match violation {
                    TagViolation::Duplicate => "tag repeated in structure",
                    TagViolation::NotAnonymous => "array element carries a tag",
                },
            })?;
        }

        Ok(Some(Header { tag, element_type }))
    }

    fn read_value(&mut self, ty: ElementType) -> Result<Value, DecodeError> {
        let value = match ty {
            ElementType::Signed(width) => Value::Signed(get_signed(&mut self.buf, width)?),
            ElementType::Unsigned(width) => Value::Unsigned(get_unsigned(&mut self.buf, width)?),
            ElementType::False => Value::Bool(false),
            ElementType::True => Value::Bool(true),
            ElementType::Float => Value::Float(get_f32(&mut self.buf)?),
            ElementType::Double => Value::Double(get_f64(&mut self.buf)?),
            ElementType::Utf8(width) => Value::Text(get_utf8(&mut self.buf, width)?),
            ElementType::Octets(width) => Value::Bytes(get_octets(&mut self.buf, width)?),
            ElementType::Null => Value::Null,
            ElementType::Structure => Value::Structure(self.read_structure()?),
            ElementType::Array => Value::Array(self.read_array()?),
            ElementType::List => Value::List(self.read_list()?),
            ElementType::EndOfContainer => return Err(DecodeError::UnexpectedEndOfContainer),
        };
        Ok(value)
    }

    /// Reads the next child of the innermost container, or `None` at its end.
    fn read_member(&mut self) -> Result<Option<(Tag, Value)>, DecodeError> {
        match self.read_header()? {
            Some(header) if header.element_type == ElementType::EndOfContainer => Ok(None),
            Some(header) => {
                let value = self.read_value(header.element_type)?;
                Ok(Some((header.tag, value)))
            }
            None => Err(DecodeError::UnterminatedContainer {
                open: self.frames.len(),
            }),
        }
    }

    fn read_structure(&mut self) -> Result<Structure, DecodeError> {
        self.enter(ContainerKind::Structure)?;
        let mut structure = Structure::new();
        while let Some((tag, value)) = self.read_member()? {
            structure.insert(tag, value);
        }
        Ok(structure)
    }

    fn read_array(&mut self) -> Result<Vec<Value>, DecodeError> {
        self.enter(ContainerKind::Array)?;
        let mut items = Vec::new();
        while let Some((_, value)) = self.read_member()? {
            items.push(value);
        }
        Ok(items)
    }

    fn read_list(&mut self) -> Result<TaggedList, DecodeError> {
        self.enter(ContainerKind::List)?;
        let mut list = TaggedList::new();
        while let Some((tag, value)) = self.read_member()? {
            list.push(tag, value);
        }
        Ok(list)
    }
}
