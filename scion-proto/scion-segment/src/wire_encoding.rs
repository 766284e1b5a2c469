// Copyright 2026 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Utilities for encoding and decoding the canonical wire format.
//!
//! All structures that are signed or transported implement [`WireEncode`] and [`WireDecode`].
//! The encoding is canonical: decoding an encoded value and encoding it again yields the exact
//! same bytes. Signatures are computed over these bytes, so any change to the encoding of an
//! already signed structure invalidates its signature.
//!
//! Integers are encoded big endian. Variable length fields are prefixed with their length,
//! where the width of the prefix depends on the field.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Allows encoding to wire format.
pub trait WireEncode {
    /// The error returned if the value cannot be encoded.
    type Error;

    /// Writes the wire encoding into the provided buffer.
    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error>;

    /// Returns the exact number of bytes [`encode_to`](Self::encode_to) writes.
    fn total_length(&self) -> usize;

    /// Encodes the value into a newly allocated buffer.
    fn encode_to_bytes(&self) -> Result<Bytes, Self::Error> {
        let mut buffer = BytesMut::with_capacity(self.total_length());
        self.encode_to(&mut buffer)?;
        Ok(buffer.freeze())
    }
}

/// Allows decoding from wire format.
pub trait WireDecode<B: Buf>: Sized {
    /// The error returned if the data cannot be decoded.
    type Error;

    /// Decodes a value from the front of the buffer, advancing it past the consumed bytes.
    fn decode(data: &mut B) -> Result<Self, Self::Error>;
}

/// Errors that can occur while decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer is too small to contain the expected structure.
    #[error("buffer too small at {at}: required {required}, actual {actual}")]
    BufferTooSmall {
        /// Location where the buffer was too small
        at: &'static str,
        /// Number of bytes required
        required: usize,
        /// Number of bytes actually available
        actual: usize,
    },
    /// The buffer contains bytes after a complete structure.
    #[error("{remaining} trailing bytes after {at}")]
    TrailingBytes {
        /// Structure that was decoded
        at: &'static str,
        /// Number of bytes left in the buffer
        remaining: usize,
    },
}

/// Errors that can occur while encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// A variable length field exceeds what its length prefix can express.
    #[error("{field} too long: {len} exceeds maximum of {max}")]
    FieldTooLong {
        /// Name of the field
        field: &'static str,
        /// Actual length
        len: usize,
        /// Maximum encodable length
        max: usize,
    },
}

/// Decodes a value that must span the whole buffer.
pub fn decode_exact<T, B>(mut data: B, at: &'static str) -> Result<T, T::Error>
where
    B: Buf,
    T: WireDecode<B>,
    T::Error: From<DecodeError>,
{
    let value = T::decode(&mut data)?;
    if data.has_remaining() {
        return Err(DecodeError::TrailingBytes {
            at,
            remaining: data.remaining(),
        }
        .into());
    }
    Ok(value)
}

/// Fails with [`DecodeError::BufferTooSmall`] if fewer than `required` bytes remain.
pub(crate) fn ensure_remaining<B: Buf>(
    data: &B,
    required: usize,
    at: &'static str,
) -> Result<(), DecodeError> {
    if data.remaining() < required {
        return Err(DecodeError::BufferTooSmall {
            at,
            required,
            actual: data.remaining(),
        });
    }
    Ok(())
}

/// Width of a length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prefix {
    U8,
    U16,
    U32,
}
impl Prefix {
    pub(crate) const fn size_bytes(self) -> usize {
        match self {
            Prefix::U8 => 1,
            Prefix::U16 => 2,
            Prefix::U32 => 4,
        }
    }

    pub(crate) const fn max_len(self) -> usize {
        match self {
            Prefix::U8 => u8::MAX as usize,
            Prefix::U16 => u16::MAX as usize,
            Prefix::U32 => u32::MAX as usize,
        }
    }

    /// Checks that a field of `len` bytes (or elements) can be prefixed.
    pub(crate) fn check(self, field: &'static str, len: usize) -> Result<(), PackError> {
        if len > self.max_len() {
            return Err(PackError::FieldTooLong {
                field,
                len,
                max: self.max_len(),
            });
        }
        Ok(())
    }

    /// Writes a length prefix. The length must have been [checked](Self::check).
    pub(crate) fn put_len<B: BufMut>(self, buffer: &mut B, len: usize) {
        match self {
            Prefix::U8 => buffer.put_u8(len as u8),
            Prefix::U16 => buffer.put_u16(len as u16),
            Prefix::U32 => buffer.put_u32(len as u32),
        }
    }

    /// Reads a length prefix.
    pub(crate) fn get_len<B: Buf>(self, data: &mut B, at: &'static str) -> Result<usize, DecodeError> {
        ensure_remaining(data, self.size_bytes(), at)?;
        Ok(match self {
            Prefix::U8 => data.get_u8() as usize,
            Prefix::U16 => data.get_u16() as usize,
            Prefix::U32 => data.get_u32() as usize,
        })
    }
}

/// Writes `bytes` preceded by its length.
pub(crate) fn put_prefixed<B: BufMut>(
    buffer: &mut B,
    prefix: Prefix,
    field: &'static str,
    bytes: &[u8],
) -> Result<(), PackError> {
    prefix.check(field, bytes.len())?;
    prefix.put_len(buffer, bytes.len());
    buffer.put_slice(bytes);
    Ok(())
}

/// Reads a length prefixed byte field.
pub(crate) fn get_prefixed<B: Buf>(
    data: &mut B,
    prefix: Prefix,
    at: &'static str,
) -> Result<Bytes, DecodeError> {
    let len = prefix.get_len(data, at)?;
    ensure_remaining(data, len, at)?;
    Ok(data.copy_to_bytes(len))
}
