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

//! AS entries and hop entries.
//!
//! An [`AsEntry`] is the contribution of a single AS to a path segment. It contains one
//! [`HopEntry`] per link the AS offers on the segment: the first hop entry describes the link
//! the segment arrived on and is used for forwarding along the segment, further hop entries
//! describe peering links.

use bytes::{Buf, BufMut, Bytes};

use crate::{
    address::IsdAsn,
    control_plane::seg::error::AsEntryValidationError,
    path::{HopField, HopFieldLayout},
    wire_encoding::{
        DecodeError, PackError, Prefix, WireDecode, WireEncode, decode_exact, ensure_remaining,
        get_prefixed, put_prefixed,
    },
};

/// A hop entry of an AS entry.
///
/// Wraps the encoded hop field together with information about the neighboring ASes of the
/// hop. The hop field is kept in its encoded form, as it was signed, and parsed on access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HopEntry {
    /// IA of the ingress neighbor, zero if the hop is the start of the segment.
    ///
    /// For peering hop entries this is the IA of the peer.
    pub in_ia: IsdAsn,
    /// Interface ID on the ingress neighbor's side of the link.
    pub remote_in_if: u64,
    /// MTU of the ingress link.
    pub in_mtu: u16,
    /// IA of the egress neighbor, zero if the hop is the end of the segment.
    pub out_ia: IsdAsn,
    /// Interface ID on the egress neighbor's side of the link.
    pub remote_out_if: u64,
    /// The encoded hop field.
    pub raw_hop_field: Bytes,
}

impl HopEntry {
    /// Creates a hop entry for the given hop field without remote interface information.
    pub fn new(in_ia: IsdAsn, out_ia: IsdAsn, hop_field: &HopField) -> Self {
        let mut raw_hop_field = Vec::with_capacity(HopFieldLayout::SIZE_BYTES);
        match hop_field.encode_to(&mut raw_hop_field) {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
        HopEntry {
            in_ia,
            remote_in_if: 0,
            in_mtu: 0,
            out_ia,
            remote_out_if: 0,
            raw_hop_field: raw_hop_field.into(),
        }
    }

    /// Sets the remote interfaces and the ingress MTU.
    pub fn with_remote(mut self, remote_in_if: u64, remote_out_if: u64, in_mtu: u16) -> Self {
        self.remote_in_if = remote_in_if;
        self.remote_out_if = remote_out_if;
        self.in_mtu = in_mtu;
        self
    }

    /// Parses the hop field.
    pub fn hop_field(&self) -> Result<HopField, DecodeError> {
        decode_exact(self.raw_hop_field.clone(), "HopField")
    }
}

impl WireEncode for HopEntry {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        Prefix::U8.check("hop field", self.raw_hop_field.len())?;
        buffer.put_u64(self.in_ia.value());
        buffer.put_u64(self.remote_in_if);
        buffer.put_u16(self.in_mtu);
        buffer.put_u64(self.out_ia.value());
        buffer.put_u64(self.remote_out_if);
        put_prefixed(buffer, Prefix::U8, "hop field", &self.raw_hop_field)
    }

    fn total_length(&self) -> usize {
        HOP_ENTRY_FIXED_SIZE + Prefix::U8.size_bytes() + self.raw_hop_field.len()
    }
}

const HOP_ENTRY_FIXED_SIZE: usize = 8 + 8 + 2 + 8 + 8;

impl<B: Buf> WireDecode<B> for HopEntry {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        ensure_remaining(data, HOP_ENTRY_FIXED_SIZE, "HopEntry")?;
        let in_ia = IsdAsn(data.get_u64());
        let remote_in_if = data.get_u64();
        let in_mtu = data.get_u16();
        let out_ia = IsdAsn(data.get_u64());
        let remote_out_if = data.get_u64();
        let raw_hop_field = get_prefixed(data, Prefix::U8, "HopEntry.hop_field")?;
        Ok(HopEntry {
            in_ia,
            remote_in_if,
            in_mtu,
            out_ia,
            remote_out_if,
            raw_hop_field,
        })
    }
}

/// The signed contribution of a single AS to a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AsEntry {
    /// IA of the AS.
    pub ia: IsdAsn,
    /// Version of the TRC the signing certificate chains up to.
    pub trc_version: u64,
    /// Version of the signing certificate.
    pub cert_version: u64,
    /// Size of the interface IDs in the hop fields, in bits.
    pub ifid_size: u8,
    /// AS-internal MTU.
    pub mtu: u16,
    /// Hop entries; the first is the primary hop entry, all following are peering hop entries.
    pub hop_entries: Vec<HopEntry>,
}

impl AsEntry {
    /// Default size of interface IDs, in bits.
    pub const DEFAULT_IFID_SIZE: u8 = 16;

    /// Creates an AS entry with the given primary hop entry.
    pub fn new(ia: IsdAsn, mtu: u16, hop_entry: HopEntry) -> Self {
        AsEntry {
            ia,
            trc_version: 0,
            cert_version: 0,
            ifid_size: Self::DEFAULT_IFID_SIZE,
            mtu,
            hop_entries: vec![hop_entry],
        }
    }

    /// Adds a peering hop entry.
    pub fn with_peer(mut self, hop_entry: HopEntry) -> Self {
        self.hop_entries.push(hop_entry);
        self
    }

    /// Returns the IA of the AS.
    pub fn ia(&self) -> IsdAsn {
        self.ia
    }

    /// Returns the primary hop entry.
    pub fn primary_hop_entry(&self) -> Option<&HopEntry> {
        self.hop_entries.first()
    }

    /// Returns the peering hop entries.
    pub fn peer_hop_entries(&self) -> &[HopEntry] {
        self.hop_entries.get(1..).unwrap_or_default()
    }

    /// Checks that the entry links to the given neighbors.
    ///
    /// The ingress neighbor of the primary hop entry must match `prev_ia`. Peering hop entries
    /// record the peer as ingress neighbor and are exempt. Unless `ignore_next` is set, the
    /// egress neighbor of every hop entry must match `next_ia`.
    ///
    /// The zero value is expected as `prev_ia` for the first and as `next_ia` for the last entry
    /// of a segment.
    pub fn validate(
        &self,
        prev_ia: IsdAsn,
        next_ia: IsdAsn,
        ignore_next: bool,
    ) -> Result<(), AsEntryValidationError> {
        let Some(primary) = self.primary_hop_entry() else {
            return Err(AsEntryValidationError::NoHopEntries { ia: self.ia });
        };
        if primary.in_ia != prev_ia {
            return Err(AsEntryValidationError::IngressIaMismatch {
                ia: self.ia,
                expected: prev_ia,
                actual: primary.in_ia,
            });
        }
        if ignore_next {
            return Ok(());
        }
        for (hop_idx, hop_entry) in self.hop_entries.iter().enumerate() {
            if hop_entry.out_ia != next_ia {
                return Err(AsEntryValidationError::EgressIaMismatch {
                    ia: self.ia,
                    hop_idx,
                    expected: next_ia,
                    actual: hop_entry.out_ia,
                });
            }
        }
        Ok(())
    }

    /// Encodes the AS entry into the blob that is signed.
    pub fn pack(&self) -> Result<Bytes, PackError> {
        self.encode_to_bytes()
    }
}

const AS_ENTRY_FIXED_SIZE: usize = 8 + 8 + 8 + 1 + 2;

impl WireEncode for AsEntry {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        Prefix::U8.check("hop entries", self.hop_entries.len())?;
        buffer.put_u64(self.ia.value());
        buffer.put_u64(self.trc_version);
        buffer.put_u64(self.cert_version);
        buffer.put_u8(self.ifid_size);
        buffer.put_u16(self.mtu);
        Prefix::U8.put_len(buffer, self.hop_entries.len());
        for hop_entry in &self.hop_entries {
            hop_entry.encode_to(buffer)?;
        }
        Ok(())
    }

    fn total_length(&self) -> usize {
        AS_ENTRY_FIXED_SIZE
            + Prefix::U8.size_bytes()
            + self
                .hop_entries
                .iter()
                .map(WireEncode::total_length)
                .sum::<usize>()
    }
}

impl<B: Buf> WireDecode<B> for AsEntry {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        ensure_remaining(data, AS_ENTRY_FIXED_SIZE, "AsEntry")?;
        let ia = IsdAsn(data.get_u64());
        let trc_version = data.get_u64();
        let cert_version = data.get_u64();
        let ifid_size = data.get_u8();
        let mtu = data.get_u16();
        let count = Prefix::U8.get_len(data, "AsEntry.hop_entries")?;
        let hop_entries = (0..count)
            .map(|_| HopEntry::decode(data))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AsEntry {
            ia,
            trc_version,
            cert_version,
            ifid_size,
            mtu,
            hop_entries,
        })
    }
}
