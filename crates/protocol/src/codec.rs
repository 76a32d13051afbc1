//! Control value codec
//!
//! UVC control values are little-endian integers of 1, 2 or 4 bytes. Whether
//! the field is sign-extended depends on the control, so decoding is driven
//! by the declared width and signedness rather than by the buffer length.

use crate::error::{ProtocolError, Result};
use crate::types::{Signedness, Width};
use byteorder::{ByteOrder, LittleEndian};

/// Decode a native control value from a device response
///
/// Bytes past the declared width are ignored.
pub fn decode_value(bytes: &[u8], width: Width, signedness: Signedness) -> Result<i64> {
    let needed = width.len();
    if bytes.len() < needed {
        return Err(ProtocolError::BufferTooSmall {
            needed,
            available: bytes.len(),
        });
    }

    let value = match (width, signedness) {
        (Width::Byte, Signedness::Unsigned) => i64::from(bytes[0]),
        (Width::Byte, Signedness::Signed) => i64::from(bytes[0] as i8),
        (Width::Word, Signedness::Unsigned) => i64::from(LittleEndian::read_u16(bytes)),
        (Width::Word, Signedness::Signed) => i64::from(LittleEndian::read_i16(bytes)),
        (Width::DoubleWord, Signedness::Unsigned) => i64::from(LittleEndian::read_u32(bytes)),
        (Width::DoubleWord, Signedness::Signed) => i64::from(LittleEndian::read_i32(bytes)),
    };

    Ok(value)
}

/// Encode a native control value for a `SET_CUR` data phase
///
/// Fails if the value is not representable in the declared format.
pub fn encode_value(value: i64, width: Width, signedness: Signedness) -> Result<Vec<u8>> {
    let out_of_range = || ProtocolError::ValueOutOfRange { value, width };
    let mut buf = vec![0u8; width.len()];

    match (width, signedness) {
        (Width::Byte, Signedness::Unsigned) => {
            buf[0] = u8::try_from(value).map_err(|_| out_of_range())?;
        }
        (Width::Byte, Signedness::Signed) => {
            buf[0] = i8::try_from(value).map_err(|_| out_of_range())? as u8;
        }
        (Width::Word, Signedness::Unsigned) => {
            LittleEndian::write_u16(&mut buf, u16::try_from(value).map_err(|_| out_of_range())?);
        }
        (Width::Word, Signedness::Signed) => {
            LittleEndian::write_i16(&mut buf, i16::try_from(value).map_err(|_| out_of_range())?);
        }
        (Width::DoubleWord, Signedness::Unsigned) => {
            LittleEndian::write_u32(&mut buf, u32::try_from(value).map_err(|_| out_of_range())?);
        }
        (Width::DoubleWord, Signedness::Signed) => {
            LittleEndian::write_i32(&mut buf, i32::try_from(value).map_err(|_| out_of_range())?);
        }
    }

    Ok(buf)
}
