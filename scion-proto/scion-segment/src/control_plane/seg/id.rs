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

use std::{fmt, sync::Arc};

use sha2::{Digest, Sha256};

use super::{AsEntry, error::InvariantViolation};

/// Which hop entries of an AS entry contribute to a [`SegmentId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdScope {
    /// Only the primary hop entry.
    PrimaryHops,
    /// All hop entries, including peering hop entries.
    AllHops,
}

/// Content address of a path segment.
///
/// Computed over the IA and the interfaces of the hop entries of all AS entries. Two segments
/// traversing the same ASes over the same interfaces have the same ID, independent of their
/// creation time, expiry and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId([u8; SegmentId::LENGTH]);

impl SegmentId {
    const LENGTH: usize = 32;
    const DISPLAYED_BYTES: usize = 6;

    /// Computes the ID over the given AS entries.
    pub(crate) fn compute(
        entries: &[Arc<AsEntry>],
        scope: IdScope,
    ) -> Result<SegmentId, InvariantViolation> {
        let mut hasher = Sha256::new();
        for (idx, entry) in entries.iter().enumerate() {
            hasher.update(entry.ia().to_be_bytes());
            for (hop_idx, hop_entry) in entry.hop_entries.iter().enumerate() {
                let hop_field = hop_entry.hop_field().map_err(|source| {
                    InvariantViolation::HopField {
                        idx,
                        hop_idx,
                        source,
                    }
                })?;
                hasher.update(hop_field.cons_ingress.to_be_bytes());
                hasher.update(hop_field.cons_egress.to_be_bytes());
                if scope == IdScope::PrimaryHops {
                    break;
                }
            }
        }
        Ok(SegmentId(hasher.finalize().into()))
    }

    /// Writes the ID as lower or upper case hex, without the leading 0x.
    ///
    /// The argument n_displayed controls how many bytes are written.
    fn format(&self, f: &mut fmt::Formatter<'_>, n_displayed: usize, lower: bool) -> fmt::Result {
        for byte in &self.0[..n_displayed] {
            if lower {
                write!(f, "{byte:02x}")?;
            } else {
                write!(f, "{byte:02X}")?;
            }
        }

        Ok(())
    }
}

impl AsRef<[u8]> for SegmentId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SegmentId {
    type Error = std::array::TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into()?))
    }
}

impl From<[u8; 32]> for SegmentId {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl fmt::Display for SegmentId {
    /// Formats the first 6 bytes of the ID as lower-case hex, as used in logs.
    ///
    /// The alternate flag formats the entire 32 bytes of the ID.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.format(f, Self::LENGTH, true)
        } else {
            self.format(f, Self::DISPLAYED_BYTES, true)
        }
    }
}

impl fmt::LowerHex for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        self.format(f, Self::LENGTH, true)
    }
}

impl fmt::UpperHex for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        self.format(f, Self::LENGTH, false)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{
        address::IsdAsn,
        control_plane::seg::HopEntry,
        path::{HopField, HopFieldMac},
    };

    fn entry(asn: u64, ingress: u16, egress: u16) -> Arc<AsEntry> {
        let hop = HopField::new(63, ingress, egress, HopFieldMac::default());
        Arc::new(AsEntry::new(
            IsdAsn::new_from_raw(1, asn),
            1472,
            HopEntry::new(IsdAsn::WILDCARD, IsdAsn::WILDCARD, &hop),
        ))
    }

    #[test]
    fn should_hash_ia_and_interfaces() {
        let entries = [entry(0x110, 0, 5)];
        let id = SegmentId::compute(&entries, IdScope::PrimaryHops).unwrap();

        let mut hasher = Sha256::new();
        hasher.update(IsdAsn::new_from_raw(1, 0x110).to_be_bytes());
        hasher.update(0u16.to_be_bytes());
        hasher.update(5u16.to_be_bytes());
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(id, SegmentId::from(expected));
    }

    #[test]
    fn should_depend_on_interfaces() {
        let a = SegmentId::compute(&[entry(0x110, 0, 5)], IdScope::AllHops).unwrap();
        let b = SegmentId::compute(&[entry(0x110, 0, 6)], IdScope::AllHops).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn should_report_unparsable_hop_field() {
        let mut e = (*entry(0x110, 0, 5)).clone();
        e.hop_entries[0].raw_hop_field = Bytes::from_static(&[1, 2, 3]);
        let err = SegmentId::compute(&[Arc::new(e)], IdScope::PrimaryHops).unwrap_err();
        assert!(matches!(
            err,
            InvariantViolation::HopField {
                idx: 0,
                hop_idx: 0,
                ..
            }
        ));
    }

    #[test]
    fn should_format_logging_id() {
        let id = SegmentId::from([0xab; 32]);
        assert_eq!(id.to_string(), "abababababab");
        assert_eq!(format!("{id:#}").len(), 64);
        assert_eq!(format!("{id:#X}"), format!("0x{}", "AB".repeat(32)));
    }
}
