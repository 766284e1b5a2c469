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

//! Info field of a path segment.

use std::convert::Infallible;

use bytes::{Buf, BufMut};
use chrono::{DateTime, TimeDelta, Utc};

use crate::wire_encoding::{DecodeError, WireDecode, WireEncode, ensure_remaining};

bitflags::bitflags! {
    /// InfoField flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct InfoFieldFlags: u8 {
        /// If set to true then the hop fields are arranged in the direction they have been constructed during beaconing.
        /// (i.e. Core AS where the beacon originated )
        const CONS_DIR = 0b0000_0001;

        /// If set to true then the path is a peering path requiring special handling on the dataplane
        const PEERING = 0b0000_0010;

        /// If set to true then the path is a shortcut crossing over from an up to a down segment.
        const SHORTCUT = 0b0000_0100;

        // Other bits are reserved.
        const _ = !0;
    }
}

/// Layout for the info field of a path segment
pub struct InfoFieldLayout;
impl InfoFieldLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |r r r r r S P C|     Hops      |             SegID             |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |                           Timestamp                           |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Size of info field in bytes
    pub const SIZE_BYTES: usize = 8;
}

/// Info field carried in the signed data of a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InfoField {
    /// Info field flags
    pub flags: InfoFieldFlags,
    /// Number of hop fields in the segment.
    ///
    /// Set when the segment is written as a data-plane segment; zero while the segment is
    /// being constructed.
    pub hops: u8,
    /// Segment ID
    ///
    /// Segment IDs are part of the MAC computation for hop fields.
    pub segment_id: u16,
    /// Timestamp when the segment was created, in seconds since the Unix epoch.
    pub timestamp: u32,
}

impl InfoField {
    /// Creates a new info field for a segment in construction direction.
    pub fn new(segment_id: u16, timestamp: u32) -> Self {
        InfoField {
            flags: InfoFieldFlags::CONS_DIR,
            hops: 0,
            segment_id,
            timestamp,
        }
    }

    /// Returns the creation time of the segment.
    pub fn creation_time(&self) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH + TimeDelta::seconds(i64::from(self.timestamp))
    }
}

impl WireEncode for InfoField {
    type Error = Infallible;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        buffer.put_u8(self.flags.bits());
        buffer.put_u8(self.hops);
        buffer.put_u16(self.segment_id);
        buffer.put_u32(self.timestamp);
        Ok(())
    }

    fn total_length(&self) -> usize {
        InfoFieldLayout::SIZE_BYTES
    }
}

impl<B: Buf> WireDecode<B> for InfoField {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        ensure_remaining(data, InfoFieldLayout::SIZE_BYTES, "InfoField")?;
        Ok(InfoField {
            flags: InfoFieldFlags::from_bits_retain(data.get_u8()),
            hops: data.get_u8(),
            segment_id: data.get_u16(),
            timestamp: data.get_u32(),
        })
    }
}
