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

use bytes::{Buf, BufMut, Bytes};

use crate::{
    path::{InfoField, InfoFieldLayout},
    wire_encoding::{
        DecodeError, PackError, Prefix, WireDecode, WireEncode, decode_exact, get_prefixed,
        put_prefixed,
    },
};

/// Segment wide data covered by every signature of the segment.
///
/// Holds the encoded info field. The info field is parsed on access, a segment whose info field
/// does not parse fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedData {
    raw_info: Bytes,
}

impl SignedData {
    /// Creates signed data for the given info field.
    pub fn new(info_field: &InfoField) -> Self {
        let mut raw_info = Vec::with_capacity(InfoFieldLayout::SIZE_BYTES);
        match info_field.encode_to(&mut raw_info) {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
        SignedData {
            raw_info: raw_info.into(),
        }
    }

    /// Returns the encoded info field.
    pub fn raw_info(&self) -> &Bytes {
        &self.raw_info
    }

    /// Parses the info field.
    pub fn info_field(&self) -> Result<InfoField, DecodeError> {
        decode_exact(self.raw_info.clone(), "InfoField")
    }

    /// Checks that the signed data is well formed.
    pub fn validate(&self) -> Result<(), DecodeError> {
        self.info_field().map(|_| ())
    }
}

impl WireEncode for SignedData {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        put_prefixed(buffer, Prefix::U16, "info field", &self.raw_info)
    }

    fn total_length(&self) -> usize {
        Prefix::U16.size_bytes() + self.raw_info.len()
    }
}

impl<B: Buf> WireDecode<B> for SignedData {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        let raw_info = get_prefixed(data, Prefix::U16, "SignedData.info")?;
        Ok(SignedData { raw_info })
    }
}
