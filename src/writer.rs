use bytes::{BufMut, Bytes, BytesMut};

use crate::config::Config;
use crate::element::{ContainerKind, ElementType, Frame, TagViolation, Width};
use crate::primitive::{put_signed, put_unsigned, signed_width, unsigned_width};
use crate::tag::Tag;
use crate::value::Value;
use crate::EncodeError;

/// Writer position saved before an element that may fail half-way.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    len: usize,
    depth: usize,
    admitted: usize,
}

/// Streaming encoder.
///
/// A writer owns its output buffer and a stack of open containers. Elements
/// are only ever appended: [`Writer::put`] serializes one value (a whole
/// subtree for container values), [`Writer::open_structure`],
/// [`Writer::open_array`] and [`Writer::open_list`] start a container that is
/// filled by later calls and ended by [`Writer::close`].
///
/// # Example
/// ```rust
/// use tlv_codec::{Tag, Value, Writer};
///
/// let mut writer = Writer::new();
/// writer.open_structure(Tag::Anonymous).unwrap();
/// writer.put(0u8, &Value::Unsigned(374710975)).unwrap();
/// writer.put(2u8, &Value::Unsigned(1)).unwrap();
/// writer.close().unwrap();
/// let bytes = writer.finish().unwrap();
/// assert_eq!(bytes[0], 0x15);
/// ```
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
    frames: Vec<Frame>,
    config: Config,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            buf: BytesMut::new(),
            frames: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends one element.
    ///
    /// The element type is chosen from the value kind; integers and length
    /// prefixes use the smallest width that represents them. Structure, array
    /// and list values are opened, filled with their members under the
    /// members' own tags and closed again.
    ///
    /// # Errors
    /// - `EncodeError::TagNotAllowed` when a tagged element is put into an array.
    /// - `EncodeError::DuplicateTag` when a structure already holds `tag`.
    /// - `EncodeError::DepthExceeded` when containers nest deeper than the configured limit.
    ///
    /// On error nothing of the element is kept: the writer is left exactly as
    /// it was before the call.
    pub fn put(&mut self, tag: impl Into<Tag>, value: &Value) -> Result<(), EncodeError> {
        let checkpoint = self.checkpoint();
        self.put_value(tag.into(), value).map_err(|e| {
            self.rewind(checkpoint);
            e
        })
    }

    fn put_value(&mut self, tag: Tag, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Signed(v) => {
                let width = signed_width(*v);
                self.header(tag, ElementType::Signed(width))?;
                put_signed(&mut self.buf, *v, width);
            }
            Value::Unsigned(v) => {
                let width = unsigned_width(*v);
                self.header(tag, ElementType::Unsigned(width))?;
                put_unsigned(&mut self.buf, *v, width);
            }
            Value::Bool(v) => {
                let ty = if *v {
                    ElementType::True
                } else {
                    ElementType::False
                };
                self.header(tag, ty)?;
            }
            Value::Float(v) => {
                self.header(tag, ElementType::Float)?;
                self.buf.put_f32_le(*v);
            }
            Value::Double(v) => {
                self.header(tag, ElementType::Double)?;
                self.buf.put_f64_le(*v);
            }
            Value::Text(v) => self.put_sized(tag, ElementType::Utf8, v.as_bytes())?,
            Value::Bytes(v) => self.put_sized(tag, ElementType::Octets, v)?,
            Value::Null => self.header(tag, ElementType::Null)?,
            Value::Structure(members) => {
                self.open(tag, ContainerKind::Structure)?;
                for (member_tag, member) in members {
                    self.put_value(*member_tag, member)?;
                }
                self.close()?;
            }
            Value::Array(items) => {
                self.open(tag, ContainerKind::Array)?;
                for item in items {
                    self.put_value(Tag::Anonymous, item)?;
                }
                self.close()?;
            }
            Value::List(items) => {
                self.open(tag, ContainerKind::List)?;
                for (item_tag, item) in items {
                    self.put_value(*item_tag, item)?;
                }
                self.close()?;
            }
        }
        Ok(())
    }

    pub fn open_structure(&mut self, tag: impl Into<Tag>) -> Result<(), EncodeError> {
        self.open(tag.into(), ContainerKind::Structure)
    }

    pub fn open_array(&mut self, tag: impl Into<Tag>) -> Result<(), EncodeError> {
        self.open(tag.into(), ContainerKind::Array)
    }

    pub fn open_list(&mut self, tag: impl Into<Tag>) -> Result<(), EncodeError> {
        self.open(tag.into(), ContainerKind::List)
    }

    /// Ends the innermost open container.
    ///
    /// # Errors
    /// Returns `EncodeError::NoOpenContainer` if nothing is open.
    pub fn close(&mut self) -> Result<(), EncodeError> {
        let frame = self.frames.pop().ok_or(EncodeError::NoOpenContainer)?;
        self.buf.put_u8(ElementType::EndOfContainer.into());
        log::trace!("closed {} at depth {}", frame.kind, self.frames.len());
        Ok(())
    }

    /// The encoding written so far.
    ///
    /// # Errors
    /// Returns `EncodeError::UnterminatedContainer` while any container is open.
    pub fn encoding(&self) -> Result<&[u8], EncodeError> {
        self.check_closed()?;
        Ok(&self.buf)
    }

    /// Consumes the writer and returns the encoding.
    ///
    /// # Errors
    /// Returns `EncodeError::UnterminatedContainer` while any container is open.
    pub fn finish(self) -> Result<Bytes, EncodeError> {
        self.check_closed()?;
        Ok(self.buf.freeze())
    }

    /// Records the current position so a failed element can be undone.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.buf.len(),
            depth: self.frames.len(),
            admitted: self.frames.last().map_or(0, Frame::admitted),
        }
    }

    /// Drops everything written since `checkpoint`.
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.buf.truncate(checkpoint.len);
        self.frames.truncate(checkpoint.depth);
        if let Some(frame) = self.frames.last_mut() {
            frame.forget_after(checkpoint.admitted);
        }
        log::trace!("rewound to {} byte(s) at depth {}", checkpoint.len, checkpoint.depth);
    }

    fn check_closed(&self) -> Result<(), EncodeError> {
        if !self.frames.is_empty() {
            return Err(EncodeError::UnterminatedContainer {
                open: self.frames.len(),
            });
        }
        Ok(())
    }

    fn open(&mut self, tag: Tag, kind: ContainerKind) -> Result<(), EncodeError> {
        if self.frames.len() >= self.config.max_depth {
            return Err(EncodeError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        self.header(tag, kind.element_type())?;
        self.frames.push(Frame::new(kind));
        log::trace!("opened {} {} at depth {}", kind, tag, self.frames.len());
        Ok(())
    }

    /// Writes a length-prefixed string element.
    fn put_sized(
        &mut self,
        tag: Tag,
        family: fn(Width) -> ElementType,
        payload: &[u8],
    ) -> Result<(), EncodeError> {
        let len = payload.len() as u64;
        let width = unsigned_width(len);
        self.header(tag, family(width))?;
        put_unsigned(&mut self.buf, len, width);
        self.buf.put_slice(payload);
        Ok(())
    }

    /// Writes the control byte and tag bytes of the next element.
    fn header(&mut self, tag: Tag, ty: ElementType) -> Result<(), EncodeError> {
        if let Some(frame) = self.frames.last_mut() {
            frame.admit(tag).map_err(|violation| match violation {
                TagViolation::Duplicate => EncodeError::DuplicateTag(tag),
                TagViolation::NotAnonymous => EncodeError::TagNotAllowed {
                    tag,
                    container: frame.kind,
                },
            })?;
        }
        self.buf.put_u8(tag.control().bits() | u8::from(ty));
        tag.put(&mut self.buf);
        Ok(())
    }
}
