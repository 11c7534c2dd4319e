//! Fixed-width payload codecs and the minimal-width selection rule.
//!
//! Integers are written in the smallest of 1, 2, 4 or 8 little-endian bytes
//! that can represent them under their own signedness. String and octet string
//! lengths follow the unsigned rule. Floats are fixed-width IEEE 754.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::element::{ElementType, Width};
use crate::{DecodeError, EncodeError};

// --- width selection ---

/// Smallest width whose signed range contains `v`.
pub fn signed_width(v: i64) -> Width {
    if i8::try_from(v).is_ok() {
        Width::One
    } else if i16::try_from(v).is_ok() {
        Width::Two
    } else if i32::try_from(v).is_ok() {
        Width::Four
    } else {
        Width::Eight
    }
}

/// Smallest width whose unsigned range contains `v`.
pub fn unsigned_width(v: u64) -> Width {
    if v <= u8::MAX as u64 {
        Width::One
    } else if v <= u16::MAX as u64 {
        Width::Two
    } else if v <= u32::MAX as u64 {
        Width::Four
    } else {
        Width::Eight
    }
}

/// Narrows a wide integer to the signed 64-bit range.
///
/// # Errors
/// Returns `EncodeError::Range` outside `[-2^63, 2^63 - 1]`.
pub fn checked_signed(v: i128) -> Result<i64, EncodeError> {
    i64::try_from(v).map_err(|_| EncodeError::Range {
        value: v,
        signed: true,
    })
}

/// Narrows a wide integer to the unsigned 64-bit range.
///
/// # Errors
/// Returns `EncodeError::Range` for negative values and values above `2^64 - 1`.
pub fn checked_unsigned(v: i128) -> Result<u64, EncodeError> {
    u64::try_from(v).map_err(|_| EncodeError::Range {
        value: v,
        signed: false,
    })
}

// --- encode ---

/// Writes `v` as `width` little-endian two's-complement bytes.
///
/// The caller picks `width` with [`signed_width`]; bytes above the width are
/// dropped.
pub fn put_signed(writer: &mut BytesMut, v: i64, width: Width) {
    match width {
        Width::One => writer.put_i8(v as i8),
        Width::Two => writer.put_i16_le(v as i16),
        Width::Four => writer.put_i32_le(v as i32),
        Width::Eight => writer.put_i64_le(v),
    }
}

/// Writes `v` as `width` little-endian bytes.
pub fn put_unsigned(writer: &mut BytesMut, v: u64, width: Width) {
    match width {
        Width::One => writer.put_u8(v as u8),
        Width::Two => writer.put_u16_le(v as u16),
        Width::Four => writer.put_u32_le(v as u32),
        Width::Eight => writer.put_u64_le(v),
    }
}

// --- decode ---

#[inline]
fn ensure(reader: &Bytes, needed: usize) -> Result<(), DecodeError> {
    if reader.remaining() < needed {
        return Err(DecodeError::Truncated {
            needed,
            remaining: reader.remaining(),
        });
    }
    Ok(())
}

/// Reads a sign-extended integer of the given width.
pub fn get_signed(reader: &mut Bytes, width: Width) -> Result<i64, DecodeError> {
    ensure(reader, width.bytes())?;
    Ok(match width {
        Width::One => reader.get_i8() as i64,
        Width::Two => reader.get_i16_le() as i64,
        Width::Four => reader.get_i32_le() as i64,
        Width::Eight => reader.get_i64_le(),
    })
}

/// Reads an unsigned integer of the given width.
pub fn get_unsigned(reader: &mut Bytes, width: Width) -> Result<u64, DecodeError> {
    ensure(reader, width.bytes())?;
    Ok(match width {
        Width::One => reader.get_u8() as u64,
        Width::Two => reader.get_u16_le() as u64,
        Width::Four => reader.get_u32_le() as u64,
        Width::Eight => reader.get_u64_le(),
    })
}

pub fn get_f32(reader: &mut Bytes) -> Result<f32, DecodeError> {
    ensure(reader, 4)?;
    Ok(reader.get_f32_le())
}

pub fn get_f64(reader: &mut Bytes) -> Result<f64, DecodeError> {
    ensure(reader, 8)?;
    Ok(reader.get_f64_le())
}

/// Reads a length prefix and checks that the announced bytes are present.
fn get_length(reader: &mut Bytes, width: Width) -> Result<usize, DecodeError> {
    let len = get_unsigned(reader, width)?;
    // A length that does not fit in memory can never be satisfied.
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    ensure(reader, len)?;
    Ok(len)
}

/// Reads a length-prefixed octet string without copying.
pub fn get_octets(reader: &mut Bytes, width: Width) -> Result<Bytes, DecodeError> {
    let len = get_length(reader, width)?;
    Ok(reader.split_to(len))
}

/// Reads a length-prefixed UTF-8 string.
///
/// # Errors
/// Returns `DecodeError::InvalidUtf8` if the payload is not valid UTF-8.
pub fn get_utf8(reader: &mut Bytes, width: Width) -> Result<String, DecodeError> {
    let len = get_length(reader, width)?;
    let mut bytes = vec![0u8; len];
    if len > 0 {
        reader.copy_to_slice(&mut bytes);
    }
    String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error()))
}

/// Skips the payload of a scalar element whose header has been consumed.
///
/// Container element types carry no payload of their own and are a no-op here;
/// their children are walked by the reader.
pub fn skip_payload(reader: &mut Bytes, ty: ElementType) -> Result<(), DecodeError> {
    let len = match ty {
        ElementType::Signed(width) | ElementType::Unsigned(width) => width.bytes(),
        ElementType::Float => 4,
        ElementType::Double => 8,
        ElementType::Utf8(width) | ElementType::Octets(width) => get_length(reader, width)?,
        ElementType::False
        | ElementType::True
        | ElementType::Null
        | ElementType::Structure
        | ElementType::Array
        | ElementType::List
        | ElementType::EndOfContainer => 0,
    };
    ensure(reader, len)?;
    reader.advance(len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_width_boundaries() {
        assert_eq!(signed_width(0), Width::One);
        assert_eq!(signed_width(127), Width::One);
        assert_eq!(signed_width(-128), Width::One);
        assert_eq!(signed_width(128), Width::Two);
        assert_eq!(signed_width(-129), Width::Two);
        assert_eq!(signed_width(32767), Width::Two);
        assert_eq!(signed_width(32768), Width::Four);
        assert_eq!(signed_width(2_147_483_647), Width::Four);
        assert_eq!(signed_width(0xDEAD_BEEF), Width::Eight);
        assert_eq!(signed_width(i64::MIN), Width::Eight);
    }

    #[test]
    fn unsigned_width_boundaries() {
        assert_eq!(unsigned_width(255), Width::One);
        assert_eq!(unsigned_width(256), Width::Two);
        assert_eq!(unsigned_width(65535), Width::Two);
        assert_eq!(unsigned_width(65536), Width::Four);
        assert_eq!(unsigned_width(0xDEAD_BEEF), Width::Four);
        assert_eq!(unsigned_width(u64::MAX), Width::Eight);
    }

    #[test]
    fn checked_ranges() {
        assert_eq!(checked_signed(i64::MAX as i128).unwrap(), i64::MAX);
        assert!(checked_signed(i64::MAX as i128 + 1).is_err());
        assert!(checked_signed(i64::MIN as i128 - 1).is_err());
        assert_eq!(checked_unsigned(u64::MAX as i128).unwrap(), u64::MAX);
        assert!(matches!(
            checked_unsigned(-1),
            Err(EncodeError::Range { value: -1, signed: false })
        ));
        assert!(checked_unsigned(u64::MAX as i128 + 1).is_err());
    }

    #[test]
    fn signed_is_sign_extended() {
        let mut writer = BytesMut::new();
        put_signed(&mut writer, -2, Width::Two);
        assert_eq!(&writer[..], &[0xFE, 0xFF]);
        let mut reader = writer.freeze();
        assert_eq!(get_signed(&mut reader, Width::Two).unwrap(), -2);
    }

    #[test]
    fn truncated_payload() {
        let mut reader = Bytes::from_static(&[0x01, 0x02]);
        assert!(matches!(
            get_unsigned(&mut reader, Width::Four),
            Err(DecodeError::Truncated { needed: 4, remaining: 2 })
        ));
    }

    #[test]
    fn length_prefix_beyond_input() {
        let mut reader = Bytes::from_static(&[0x05, b'a', b'b']);
        assert!(matches!(
            get_octets(&mut reader, Width::One),
            Err(DecodeError::Truncated { needed: 5, remaining: 2 })
        ));
    }

    #[test]
    fn invalid_utf8() {
        let mut reader = Bytes::from_static(&[0x02, 0xC3, 0x28]);
        assert!(matches!(
            get_utf8(&mut reader, Width::One),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }
}
