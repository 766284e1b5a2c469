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

//! Hop field of a path segment.

use std::{convert::Infallible, fmt::Debug, time::Duration};

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};

use super::{InfoField, add_duration, exp_time_to_duration};
use crate::wire_encoding::{DecodeError, WireDecode, WireEncode, ensure_remaining};

bitflags::bitflags! {
    /// HopField flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct HopFieldFlags: u8 {
        /// If ConsIngress Router Alert is set, the ingress router in construction direction will process the L4 payload in the packet.
        const CONS_INGRESS_ROUTER_ALERT = 0b0000_0001;
        /// If ConsEgress Router Alert is set, the egress router in construction direction will process the L4 payload in the packet.
        const CONS_EGRESS_ROUTER_ALERT = 0b0000_0010;

        // Other bits are reserved.
        const _ = !0;
    }
}

/// MAC (Message Authentication Code) used in HopFields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HopFieldMac(pub [u8; 6]);
impl HopFieldMac {
    /// Returns the byte array representation of the HopFieldMac.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}
impl From<[u8; 6]> for HopFieldMac {
    fn from(bytes: [u8; 6]) -> Self {
        HopFieldMac(bytes)
    }
}
impl Debug for HopFieldMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Layout for a hop field
pub struct HopFieldLayout;
impl HopFieldLayout {
    //  0                   1                   2                   3
    //  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |r r r r r r I E|    ExpTime    |           ConsIngress         |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    // |        ConsEgress             |                               |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
    // |                              MAC                              |
    // +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

    /// Size of hop field in bytes
    pub const SIZE_BYTES: usize = 12;
}

/// Represents a hop field of a path segment
///
/// Hop fields contain the forwarding information of a single AS on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HopField {
    /// Hop field flags
    pub flags: HopFieldFlags,
    /// Hop field expiration units
    ///
    /// The lifetime of a hop field is `(exp_time + 1) * EXP_TIME_UNIT`, see
    /// [`exp_time_to_duration`]. After the lifetime has passed since the segment creation time
    /// (found in the info field), the hop field is considered expired.
    pub exp_time: u8,
    /// Hop field construction ingress interface
    ///
    /// A value of 0 indicates that the hop is at the start of the path segment.
    pub cons_ingress: u16,
    /// Hop field construction egress interface
    ///
    /// A value of 0 indicates that the hop is at the end of the path segment.
    pub cons_egress: u16,
    /// Hop field message authentication code (MAC)
    pub mac: HopFieldMac,
}

impl HopField {
    /// Creates a hop field without flags.
    pub fn new(exp_time: u8, cons_ingress: u16, cons_egress: u16, mac: HopFieldMac) -> Self {
        HopField {
            flags: HopFieldFlags::empty(),
            exp_time,
            cons_ingress,
            cons_egress,
            mac,
        }
    }

    /// Returns the lifetime of the hop field relative to the segment creation time.
    pub fn expiry_duration(&self) -> Duration {
        exp_time_to_duration(self.exp_time)
    }

    /// Returns the absolute expiry time of the hop field.
    pub fn expiry_time(&self, info_field: &InfoField) -> DateTime<Utc> {
        add_duration(info_field.creation_time(), self.expiry_duration())
    }
}

impl WireEncode for HopField {
    type Error = Infallible;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        buffer.put_u8(self.flags.bits());
        buffer.put_u8(self.exp_time);
        buffer.put_u16(self.cons_ingress);
        buffer.put_u16(self.cons_egress);
        buffer.put_slice(&self.mac.0);
        Ok(())
    }

    fn total_length(&self) -> usize {
        HopFieldLayout::SIZE_BYTES
    }
}

impl<B: Buf> WireDecode<B> for HopField {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        ensure_remaining(data, HopFieldLayout::SIZE_BYTES, "HopField")?;
        let flags = HopFieldFlags::from_bits_retain(data.get_u8());
        let exp_time = data.get_u8();
        let cons_ingress = data.get_u16();
        let cons_egress = data.get_u16();
        let mut mac = [0u8; 6];
        data.copy_to_slice(&mut mac);
        Ok(HopField {
            flags,
            exp_time,
            cons_ingress,
            cons_egress,
            mac: HopFieldMac(mac),
        })
    }
}
