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

//! Path segments.
//!
//! A [`PathSegment`] is built by the ASes it traverses: the originating AS creates it with an
//! info field and every AS on the way appends its [`AsEntry`] with
//! [`add_as_entry`](PathSegment::add_as_entry), signing the segment as it has seen it.
//!
//! The segment keeps the raw representation, i.e. the bytes that were signed, next to the parsed
//! representation. Both are only modified together, so the parsed representation always
//! corresponds to the signed bytes.
//!
//! A segment received from the network is decoded with [`PathSegment::from_raw`] (finished
//! segments) or [`PathSegment::beacon_from_raw`] (segments still under construction), both of
//! which validate the segment.

use std::{
    fmt,
    sync::{Arc, OnceLock},
    time::Duration,
};

use bytes::{Buf, BufMut, Bytes};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    address::IsdAsn,
    path::{HopField, InfoField, MAX_TTL, add_duration},
    wire_encoding::{
        DecodeError, PackError, Prefix, WireDecode, WireEncode, decode_exact, get_prefixed,
        put_prefixed,
    },
};

mod as_entry;
pub mod beacon;
pub mod error;
mod id;
mod signed_data;
pub mod signing;
#[cfg(test)]
pub(crate) mod testing;

pub use as_entry::{AsEntry, HopEntry};
pub use beacon::Beacon;
use error::{
    AddAsEntryError, DataPlaneEncodeError, IndexError, InvariantViolation, SegmentError,
    ValidationError, VerifyAsEntryError,
};
pub use id::SegmentId;
use id::IdScope;
pub use signed_data::SignedData;
use signing::{SignatureMeta, SignedBlob, Signer, Verifier, signature_input};

/// How the last AS entry of a segment is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMethod {
    /// The segment is finished. The ingress IA of the first and the egress IA of the last AS
    /// entry must be the zero value.
    #[default]
    Segment,
    /// The segment is a beacon under construction. The egress IA of the last AS entry is not
    /// validated, as the next AS is not known yet.
    Beacon,
}

/// A signed chain of AS entries.
///
/// Cloning a segment is cheap: AS entries and raw blobs are shared, only the entry sequences are
/// copied. See [`shallow_copy`](Self::shallow_copy).
#[derive(Debug, Clone)]
pub struct PathSegment {
    raw_signed_data: Bytes,
    signed_data: SignedData,
    raw_entries: Vec<SignedBlob>,
    entries: Vec<Arc<AsEntry>>,
    id: OnceLock<SegmentId>,
    full_id: OnceLock<SegmentId>,
}

// Construction
impl PathSegment {
    /// Creates a new segment with the given info field and no AS entries.
    ///
    /// AS entries are added with [`add_as_entry`](Self::add_as_entry).
    pub fn new(info_field: &InfoField) -> Result<Self, PackError> {
        let signed_data = SignedData::new(info_field);
        let raw_signed_data = signed_data.encode_to_bytes()?;
        Ok(PathSegment {
            raw_signed_data,
            signed_data,
            raw_entries: Vec::new(),
            entries: Vec::new(),
            id: OnceLock::new(),
            full_id: OnceLock::new(),
        })
    }

    /// Decodes and validates a finished segment.
    pub fn from_raw(raw: Bytes) -> Result<Self, SegmentError> {
        Self::from_raw_with(raw, ValidationMethod::Segment)
    }

    /// Decodes and validates a beacon. The last AS entry is not assumed to terminate the
    /// segment.
    pub fn beacon_from_raw(raw: Bytes) -> Result<Self, SegmentError> {
        Self::from_raw_with(raw, ValidationMethod::Beacon)
    }

    /// Decodes a segment and validates it with the given method.
    pub fn from_raw_with(raw: Bytes, method: ValidationMethod) -> Result<Self, SegmentError> {
        decode_exact(raw, "PathSegment").and_then(|segment: Unvalidated| segment.parse(method))
    }

    /// Re-derives the parsed representation from the raw representation and validates the
    /// result.
    pub fn parse_raw(&mut self, method: ValidationMethod) -> Result<(), SegmentError> {
        let signed_data: SignedData = decode_exact(self.raw_signed_data.clone(), "SignedData")?;
        let entries = self
            .raw_entries
            .iter()
            .map(|raw| decode_exact::<AsEntry, _>(raw.blob.clone(), "AsEntry").map(Arc::new))
            .collect::<Result<Vec<_>, DecodeError>>()?;

        self.signed_data = signed_data;
        self.entries = entries;
        self.invalidate_ids();

        self.validate(method)?;
        Ok(())
    }

    /// Creates a copy of the segment that shares the AS entries and cached IDs with this
    /// segment. Appending to either segment does not affect the other.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }
}

// Accessors
impl PathSegment {
    /// Returns the encoded signed data.
    pub fn raw_signed_data(&self) -> &Bytes {
        &self.raw_signed_data
    }

    /// Returns the signed data.
    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    /// Returns the info field.
    pub fn info_field(&self) -> Result<InfoField, DecodeError> {
        self.signed_data.info_field()
    }

    /// Returns the signed, encoded AS entries.
    pub fn raw_entries(&self) -> &[SignedBlob] {
        &self.raw_entries
    }

    /// Returns the AS entries.
    pub fn as_entries(&self) -> &[Arc<AsEntry>] {
        &self.entries
    }

    /// Returns the number of AS entries.
    pub fn len(&self) -> usize {
        self.raw_entries.len()
    }

    /// Returns true if the segment has no AS entries.
    pub fn is_empty(&self) -> bool {
        self.raw_entries.is_empty()
    }

    /// Returns the index of the last AS entry.
    pub fn max_entry_idx(&self) -> Option<usize> {
        self.raw_entries.len().checked_sub(1)
    }

    /// Returns the IA of the first AS entry.
    pub fn first_ia(&self) -> Option<IsdAsn> {
        self.entries.first().map(|entry| entry.ia())
    }

    /// Returns the IA of the last AS entry.
    pub fn last_ia(&self) -> Option<IsdAsn> {
        self.entries.last().map(|entry| entry.ia())
    }
}

// Signature chain
impl PathSegment {
    /// Appends the AS entry and signs the resulting segment.
    ///
    /// On error the segment is left unchanged.
    pub fn add_as_entry<S>(&mut self, entry: AsEntry, signer: &S) -> Result<(), AddAsEntryError>
    where
        S: Signer + ?Sized,
    {
        Prefix::U8.check("AS entries", self.raw_entries.len() + 1)?;
        let blob = entry.pack()?;
        let ia = entry.ia();

        self.raw_entries.push(SignedBlob {
            blob,
            sign: SignatureMeta::default(),
        });
        self.entries.push(Arc::new(entry));

        let idx = self.raw_entries.len() - 1;
        let sign = match self.sign_entry(idx, signer) {
            Ok(sign) => sign,
            Err(e) => {
                tracing::warn!(
                    idx,
                    isd_as = %ia,
                    error = %e,
                    "Failed to add AS entry, rolled back"
                );
                self.pop_last_entry();
                return Err(e);
            }
        };
        self.raw_entries[idx].sign = sign;
        self.invalidate_ids();

        tracing::debug!(idx, isd_as = %ia, "Added AS entry");
        Ok(())
    }

    /// Verifies the signature of the AS entry at the given index.
    pub fn verify_as_entry<V>(
        &self,
        context: &V::Context,
        verifier: &V,
        idx: usize,
    ) -> Result<(), VerifyAsEntryError>
    where
        V: Verifier + ?Sized,
    {
        self.validate_idx(idx)?;
        let data = self.signature_input(idx)?;
        verifier.verify(context, &data, &self.raw_entries[idx].sign)?;
        Ok(())
    }

    /// Verifies the signatures of all AS entries, returning the index of the first entry that
    /// fails verification alongside the error.
    pub fn verify_all<V>(
        &self,
        context: &V::Context,
        verifier: &V,
    ) -> Result<(), (usize, VerifyAsEntryError)>
    where
        V: Verifier + ?Sized,
    {
        (0..self.len()).try_for_each(|idx| {
            self.verify_as_entry(context, verifier, idx)
                .map_err(|e| (idx, e))
        })
    }

    fn sign_entry<S>(&self, idx: usize, signer: &S) -> Result<SignatureMeta, AddAsEntryError>
    where
        S: Signer + ?Sized,
    {
        let data = self.signature_input(idx)?;
        let sign = signer.sign(&data)?;
        // A signature that cannot be encoded would make the segment unpackable.
        sign.check_encodable()?;
        Ok(sign)
    }

    fn signature_input(&self, idx: usize) -> Result<Bytes, PackError> {
        signature_input(
            &self.raw_signed_data,
            &self.raw_entries[..idx],
            &self.raw_entries[idx].blob,
        )
    }

    fn pop_last_entry(&mut self) {
        self.raw_entries.pop();
        self.entries.pop();
    }

    fn validate_idx(&self, idx: usize) -> Result<(), IndexError> {
        if idx >= self.raw_entries.len() {
            return Err(IndexError {
                idx,
                len: self.raw_entries.len(),
            });
        }
        Ok(())
    }

    fn invalidate_ids(&mut self) {
        self.id = OnceLock::new();
        self.full_id = OnceLock::new();
    }
}

// Validation
impl PathSegment {
    /// Validates that the ingress and egress IA of each AS entry are consistent with the
    /// neighboring AS entries and that all hop fields can be parsed.
    ///
    /// The ingress IA of the first AS entry must be the zero value. So must be the egress IA of
    /// the last AS entry, unless a beacon is validated.
    pub fn validate(&self, method: ValidationMethod) -> Result<(), ValidationError> {
        self.signed_data
            .validate()
            .map_err(ValidationError::SignedData)?;

        if self.raw_entries.is_empty() {
            return Err(ValidationError::NoAsEntries);
        }
        if self.entries.len() != self.raw_entries.len() {
            return Err(ValidationError::EntryCountMismatch {
                raw: self.raw_entries.len(),
                parsed: self.entries.len(),
            });
        }

        let last_idx = self.entries.len() - 1;
        for (idx, entry) in self.entries.iter().enumerate() {
            let prev_ia = match idx {
                0 => IsdAsn::WILDCARD,
                _ => self.entries[idx - 1].ia(),
            };
            let next_ia = self
                .entries
                .get(idx + 1)
                .map(|next| next.ia())
                .unwrap_or(IsdAsn::WILDCARD);
            // The next AS of a beacon's last entry is not known yet.
            let ignore_next = idx == last_idx && method == ValidationMethod::Beacon;

            entry
                .validate(prev_ia, next_ia, ignore_next)
                .map_err(|source| ValidationError::AsEntry { idx, source })?;
        }

        self.walk_hop_entries()
    }

    /// Checks that every hop field of every AS entry can be parsed.
    pub fn walk_hop_entries(&self) -> Result<(), ValidationError> {
        for (idx, entry) in self.entries.iter().enumerate() {
            for (hop_idx, hop_entry) in entry.hop_entries.iter().enumerate() {
                hop_entry
                    .hop_field()
                    .map_err(|source| ValidationError::HopField {
                        idx,
                        hop_idx,
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

// Derived values, all of which assume a validated segment.
impl PathSegment {
    /// Returns the ID of the segment, covering the primary hop entry of every AS entry.
    ///
    /// Peering hop entries do not contribute, so segments that only differ in their peering
    /// links have the same ID.
    pub fn id(&self) -> Result<SegmentId, InvariantViolation> {
        Self::cached(&self.id, || {
            SegmentId::compute(&self.entries, IdScope::PrimaryHops)
        })
    }

    /// Returns the ID of the segment, covering all hop entries including peering hop entries.
    pub fn full_id(&self) -> Result<SegmentId, InvariantViolation> {
        Self::cached(&self.full_id, || {
            SegmentId::compute(&self.entries, IdScope::AllHops)
        })
    }

    /// Returns the latest expiry time of all hop fields.
    ///
    /// For a segment without AS entries this is the creation time.
    pub fn max_expiry(&self) -> Result<DateTime<Utc>, InvariantViolation> {
        self.expiry(Duration::ZERO, |hop_ttl, ttl| hop_ttl > ttl)
    }

    /// Returns the earliest expiry time of all hop fields, i.e. the time the segment becomes
    /// unusable.
    ///
    /// For a segment without AS entries this is the creation time plus [`MAX_TTL`].
    pub fn min_expiry(&self) -> Result<DateTime<Utc>, InvariantViolation> {
        self.expiry(MAX_TTL, |hop_ttl, ttl| hop_ttl < ttl)
    }

    /// Returns true if the AS with the given IA uses the interface in any of its hop entries.
    pub fn contains_interface(&self, ia: IsdAsn, ifid: u16) -> Result<bool, InvariantViolation> {
        for hop in self.hop_fields() {
            let (idx, hop_field) = hop?;
            if self.entries[idx].ia() == ia
                && (hop_field.cons_ingress == ifid || hop_field.cons_egress == ifid)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn cached<F>(cell: &OnceLock<SegmentId>, compute: F) -> Result<SegmentId, InvariantViolation>
    where
        F: FnOnce() -> Result<SegmentId, InvariantViolation>,
    {
        if let Some(id) = cell.get() {
            return Ok(*id);
        }
        // Concurrent first accesses compute the same value, the first one is kept.
        let id = compute()?;
        Ok(*cell.get_or_init(|| id))
    }

    fn expiry<F>(&self, init_ttl: Duration, replace: F) -> Result<DateTime<Utc>, InvariantViolation>
    where
        F: Fn(Duration, Duration) -> bool,
    {
        let info = self.info_field().map_err(InvariantViolation::InfoField)?;
        let mut ttl = init_ttl;
        for hop in self.hop_fields() {
            let (_, hop_field) = hop?;
            let hop_ttl = hop_field.expiry_duration();
            if replace(hop_ttl, ttl) {
                ttl = hop_ttl;
            }
        }
        Ok(add_duration(info.creation_time(), ttl))
    }

    /// Iterates over all parsed hop fields with the index of their AS entry.
    fn hop_fields(
        &self,
    ) -> impl Iterator<Item = Result<(usize, HopField), InvariantViolation>> + '_ {
        self.entries.iter().enumerate().flat_map(|(idx, entry)| {
            entry
                .hop_entries
                .iter()
                .enumerate()
                .map(move |(hop_idx, hop_entry)| {
                    hop_entry
                        .hop_field()
                        .map(|hop_field| (idx, hop_field))
                        .map_err(|source| InvariantViolation::HopField {
                            idx,
                            hop_idx,
                            source,
                        })
                })
        })
    }
}

// Encoding
impl PathSegment {
    /// Encodes the segment.
    pub fn pack(&self) -> Result<Bytes, PackError> {
        self.encode_to_bytes()
    }

    /// Writes the segment in the form used on the data plane: the info field, with the hop
    /// count set to the number of AS entries, followed by the primary hop field of every AS
    /// entry.
    ///
    /// Returns the number of bytes written. Nothing is written on error.
    pub fn encode_dataplane_segment<B: BufMut>(
        &self,
        buffer: &mut B,
    ) -> Result<usize, DataPlaneEncodeError> {
        let mut info = self.info_field().map_err(InvariantViolation::InfoField)?;
        // Appending and decoding limit the number of AS entries to u8::MAX.
        info.hops = self.entries.len() as u8;

        let hop_fields = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let hop_entry = entry
                    .primary_hop_entry()
                    .ok_or(DataPlaneEncodeError::NoHopEntries { idx })?;
                hop_entry.hop_field().map_err(|source| {
                    InvariantViolation::HopField {
                        idx,
                        hop_idx: 0,
                        source,
                    }
                    .into()
                })
            })
            .collect::<Result<Vec<_>, DataPlaneEncodeError>>()?;

        let Ok(()) = info.encode_to(buffer);
        let mut written = info.total_length();
        for hop_field in &hop_fields {
            let Ok(()) = hop_field.encode_to(buffer);
            written += hop_field.total_length();
        }
        Ok(written)
    }
}

impl WireEncode for PathSegment {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        Prefix::U32.check("signed data", self.raw_signed_data.len())?;
        Prefix::U8.check("AS entries", self.raw_entries.len())?;
        put_prefixed(buffer, Prefix::U32, "signed data", &self.raw_signed_data)?;
        Prefix::U8.put_len(buffer, self.raw_entries.len());
        for raw_entry in &self.raw_entries {
            raw_entry.encode_to(buffer)?;
        }
        Ok(())
    }

    fn total_length(&self) -> usize {
        Prefix::U32.size_bytes()
            + self.raw_signed_data.len()
            + Prefix::U8.size_bytes()
            + self
                .raw_entries
                .iter()
                .map(WireEncode::total_length)
                .sum::<usize>()
    }
}

/// Decodes and validates a finished segment.
impl<B: Buf> WireDecode<B> for PathSegment {
    type Error = SegmentError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        Unvalidated::decode(data)?.parse(ValidationMethod::Segment)
    }
}

/// Raw representation of a decoded segment that has not been parsed yet.
struct Unvalidated {
    raw_signed_data: Bytes,
    raw_entries: Vec<SignedBlob>,
}

impl Unvalidated {
    fn parse(self, method: ValidationMethod) -> Result<PathSegment, SegmentError> {
        let mut segment = PathSegment {
            raw_signed_data: self.raw_signed_data,
            signed_data: SignedData::new(&InfoField::default()),
            raw_entries: self.raw_entries,
            entries: Vec::new(),
            id: OnceLock::new(),
            full_id: OnceLock::new(),
        };
        segment.parse_raw(method)?;

        tracing::debug!(entries = segment.len(), ?method, "Decoded path segment");
        Ok(segment)
    }
}

impl<B: Buf> WireDecode<B> for Unvalidated {
    type Error = SegmentError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        let raw_signed_data = get_prefixed(data, Prefix::U32, "PathSegment.signed_data")?;
        let count = Prefix::U8.get_len(data, "PathSegment.as_entries")?;
        let raw_entries = (0..count)
            .map(|_| SignedBlob::decode(data))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Unvalidated {
            raw_signed_data,
            raw_entries,
        })
    }
}

impl fmt::Display for PathSegment {
    /// Formats the segment as `<id> <creation time> <hops>`, where hops are written as
    /// `[ingress ]<ia>[ egress]` separated by `>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Ok(id) => write!(f, "{id}")?,
            Err(e) => write!(f, "ID error: {e}")?,
        }
        match self.info_field() {
            Ok(info) => {
                write!(
                    f,
                    " {}",
                    info.creation_time()
                        .to_rfc3339_opts(SecondsFormat::Secs, true)
                )?
            }
            Err(e) => write!(f, " {e}")?,
        }
        f.write_str(" ")?;
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(">")?;
            }
            let Some(hop_entry) = entry.primary_hop_entry() else {
                write!(f, "{}", entry.ia())?;
                continue;
            };
            match hop_entry.hop_field() {
                Ok(hop) => {
                    if hop.cons_ingress > 0 {
                        write!(f, "{} ", hop.cons_ingress)?;
                    }
                    write!(f, "{}", entry.ia())?;
                    if hop.cons_egress > 0 {
                        write!(f, " {}", hop.cons_egress)?;
                    }
                }
                Err(e) => write!(f, "{e}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use proptest::prelude::*;
    use test_log::test;

    use super::*;
    use crate::{
        control_plane::seg::{
            error::AsEntryValidationError,
            testing::{
                DigestSigner, DigestVerifier, FailingSigner, TIMESTAMP, as_entry, ia, linked_chain,
                segment, segment_from,
            },
        },
        path::{EXP_TIME_UNIT, HopFieldMac, exp_time_to_duration},
    };

    fn creation_time() -> DateTime<Utc> {
        InfoField::new(0, TIMESTAMP).creation_time()
    }

    #[test]
    fn single_entry_segment_should_validate_and_expire() {
        let mut seg = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
        seg.add_as_entry(
            as_entry(1, IsdAsn::WILDCARD, IsdAsn::WILDCARD, (0, 0), 0),
            &DigestSigner,
        )
        .unwrap();

        let expected = add_duration(creation_time(), EXP_TIME_UNIT);
        assert_eq!(seg.max_expiry().unwrap(), expected);
        assert_eq!(seg.min_expiry().unwrap(), expected);
        assert_eq!(seg.validate(ValidationMethod::Segment), Ok(()));

        let id = seg.id().unwrap();
        assert_eq!(seg.id().unwrap(), id);
        assert_eq!(seg.full_id().unwrap(), seg.full_id().unwrap());
    }

    #[test]
    fn mismatched_ingress_should_fail_at_second_entry() {
        let mut seg = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
        seg.add_as_entry(as_entry(1, IsdAsn::WILDCARD, ia(2), (0, 5), 63), &DigestSigner)
            .unwrap();
        seg.add_as_entry(as_entry(2, ia(6), IsdAsn::WILDCARD, (6, 0), 63), &DigestSigner)
            .unwrap();

        let err = seg.validate(ValidationMethod::Segment).unwrap_err();
        assert_eq!(err.entry_index(), Some(1));
        assert_eq!(
            err,
            ValidationError::AsEntry {
                idx: 1,
                source: AsEntryValidationError::IngressIaMismatch {
                    ia: ia(2),
                    expected: ia(1),
                    actual: ia(6),
                },
            }
        );
    }

    #[test]
    fn empty_segment_should_fail_validation() {
        let seg = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
        assert!(seg.is_empty());
        assert_eq!(seg.max_entry_idx(), None);
        assert_eq!(seg.first_ia(), None);
        assert_eq!(
            seg.validate(ValidationMethod::Beacon),
            Err(ValidationError::NoAsEntries)
        );
    }

    #[test]
    fn should_detect_raw_and_parsed_mismatch() {
        let mut seg = segment(3);
        seg.entries.pop();
        assert_eq!(
            seg.validate(ValidationMethod::Segment),
            Err(ValidationError::EntryCountMismatch { raw: 3, parsed: 2 })
        );
    }

    #[test]
    fn should_reject_malformed_signed_data() {
        let mut seg = segment(1);
        seg.raw_signed_data = Bytes::from_static(&[0, 1, 0]);
        assert!(matches!(
            seg.parse_raw(ValidationMethod::Segment),
            Err(SegmentError::Validation(ValidationError::SignedData(_)))
        ));
    }

    #[test]
    fn failed_signing_should_leave_segment_unchanged() {
        let mut seg = segment(2);
        let id = seg.id().unwrap();
        let raw_before = seg.raw_entries.clone();
        let entries_before = seg.entries.clone();

        let next = as_entry(3, ia(2), IsdAsn::WILDCARD, (31, 0), 63);
        let err = seg.add_as_entry(next, &FailingSigner).unwrap_err();

        assert!(matches!(err, AddAsEntryError::Signing(_)));
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.raw_entries, raw_before);
        assert_eq!(seg.entries, entries_before);
        assert_eq!(seg.id.get(), Some(&id));
        assert!(seg.full_id.get().is_none());
    }

    /// Returns a signature source that does not fit its length prefix.
    struct OversizedSourceSigner;

    impl Signer for OversizedSourceSigner {
        fn sign(&self, data: &[u8]) -> Result<SignatureMeta, signing::SigningError> {
            let mut sign = DigestSigner.sign(data)?;
            sign.src = Bytes::from(vec![0u8; 70_000]);
            Ok(sign)
        }
    }

    #[test]
    fn unencodable_signature_should_leave_segment_unchanged() {
        let mut seg = segment(1);
        let id = seg.id().unwrap();
        let raw_before = seg.raw_entries.clone();

        let next = as_entry(2, ia(1), IsdAsn::WILDCARD, (21, 0), 63);
        let err = seg.add_as_entry(next, &OversizedSourceSigner).unwrap_err();

        assert!(matches!(
            err,
            AddAsEntryError::Pack(PackError::FieldTooLong {
                field: "signature source",
                len: 70_000,
                ..
            })
        ));
        assert_eq!(seg.len(), 1);
        assert_eq!(seg.raw_entries, raw_before);
        assert_eq!(seg.id.get(), Some(&id));
        assert!(seg.pack().is_ok());

        // The segment can still be extended.
        seg.add_as_entry(as_entry(2, ia(1), IsdAsn::WILDCARD, (21, 0), 63), &DigestSigner)
            .unwrap();
        assert!(seg.verify_all(&(), &DigestVerifier).is_ok());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn segments_should_be_shareable_across_threads() {
        assert_send_sync::<PathSegment>();
        assert_send_sync::<Beacon>();
    }

    #[test]
    fn concurrent_id_access_should_agree() {
        let expected = segment(4);
        let expected_id = expected.id().unwrap();
        let expected_full_id = expected.full_id().unwrap();

        let seg = segment(4);
        assert!(seg.id.get().is_none());
        let results = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| (seg.id().unwrap(), seg.full_id().unwrap())))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        for (id, full_id) in results {
            assert_eq!(id, expected_id);
            assert_eq!(full_id, expected_full_id);
        }
        assert_eq!(seg.id.get(), Some(&expected_id));
        assert_eq!(seg.full_id.get(), Some(&expected_full_id));
    }

    #[test]
    fn oversized_entry_should_fail_to_pack_without_change() {
        let mut seg = segment(1);
        let mut entry = as_entry(2, ia(1), IsdAsn::WILDCARD, (21, 0), 63);
        entry.hop_entries[0].raw_hop_field = Bytes::from(vec![0u8; 300]);

        let err = seg.add_as_entry(entry, &DigestSigner).unwrap_err();
        assert!(matches!(
            err,
            AddAsEntryError::Pack(PackError::FieldTooLong { len: 300, .. })
        ));
        assert_eq!(seg.len(), 1);
    }

    #[test]
    fn ids_should_change_after_append() {
        let mut seg = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
        seg.add_as_entry(as_entry(1, IsdAsn::WILDCARD, ia(2), (0, 12), 63), &DigestSigner)
            .unwrap();
        let id = seg.id().unwrap();
        let full_id = seg.full_id().unwrap();

        seg.add_as_entry(as_entry(2, ia(1), IsdAsn::WILDCARD, (21, 0), 63), &DigestSigner)
            .unwrap();
        assert!(seg.id.get().is_none());
        assert_ne!(seg.id().unwrap(), id);
        assert_ne!(seg.full_id().unwrap(), full_id);
    }

    #[test]
    fn id_should_ignore_peering_entries() {
        let plain = segment(3);

        let mut entries = linked_chain(3);
        let peer = HopEntry::new(
            IsdAsn::new_from_raw(2, 77),
            ia(3),
            &HopField::new(63, 99, 22, HopFieldMac::default()),
        );
        entries[1] = entries[1].clone().with_peer(peer);
        let peered = segment_from(entries);

        assert_eq!(peered.validate(ValidationMethod::Segment), Ok(()));
        assert_eq!(plain.id().unwrap(), peered.id().unwrap());
        assert_ne!(plain.full_id().unwrap(), peered.full_id().unwrap());
        // Without peering entries both IDs cover the same hops.
        assert_eq!(plain.id().unwrap(), plain.full_id().unwrap());
    }

    #[test]
    fn should_verify_signature_chain() {
        let seg = segment(3);
        assert!(seg.verify_all(&(), &DigestVerifier).is_ok());
    }

    #[test]
    fn tampering_should_invalidate_later_signatures() {
        let mut seg = segment(3);

        let mut blob = BytesMut::from(&seg.raw_entries[0].blob[..]);
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        seg.raw_entries[0].blob = blob.freeze();

        for idx in 0..3 {
            assert!(
                matches!(
                    seg.verify_as_entry(&(), &DigestVerifier, idx),
                    Err(VerifyAsEntryError::Verification(_))
                ),
                "entry {idx} should fail verification"
            );
        }
    }

    #[test]
    fn tampering_should_not_affect_earlier_signatures() {
        let mut seg = segment(3);
        seg.raw_entries[1].sign.timestamp += 1;

        assert!(seg.verify_as_entry(&(), &DigestVerifier, 0).is_ok());
        assert!(seg.verify_as_entry(&(), &DigestVerifier, 1).is_ok());
        assert_eq!(
            seg.verify_all(&(), &DigestVerifier).map_err(|(idx, _)| idx),
            Err(2)
        );
    }

    #[test]
    fn should_reject_out_of_range_index() {
        let seg = segment(3);
        let err = seg.verify_as_entry(&(), &DigestVerifier, 3).unwrap_err();
        assert!(matches!(
            err,
            VerifyAsEntryError::Index(IndexError { idx: 3, len: 3 })
        ));
    }

    #[test]
    fn expiry_should_cover_all_hop_fields() {
        let mut entries = linked_chain(3);
        entries[0].hop_entries[0] = HopEntry::new(
            IsdAsn::WILDCARD,
            ia(2),
            &HopField::new(10, 0, 12, HopFieldMac::default()),
        );
        let peer = HopEntry::new(
            IsdAsn::new_from_raw(2, 77),
            ia(3),
            &HopField::new(2, 99, 22, HopFieldMac::default()),
        );
        entries[1] = entries[1].clone().with_peer(peer);
        let seg = segment_from(entries);

        let min = seg.min_expiry().unwrap();
        let max = seg.max_expiry().unwrap();
        assert!(min <= max);
        assert_eq!(min, add_duration(creation_time(), exp_time_to_duration(2)));
        assert_eq!(max, add_duration(creation_time(), exp_time_to_duration(63)));
    }

    #[test]
    fn derived_values_should_report_unparsable_hop_fields() {
        let mut entries = linked_chain(2);
        entries[1].hop_entries[0].raw_hop_field = Bytes::from_static(&[0; 3]);
        let mut seg = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
        for entry in entries {
            seg.add_as_entry(entry, &DigestSigner).unwrap();
        }

        assert!(matches!(
            seg.validate(ValidationMethod::Segment),
            Err(ValidationError::HopField {
                idx: 1,
                hop_idx: 0,
                ..
            })
        ));
        assert!(matches!(
            seg.id(),
            Err(InvariantViolation::HopField { idx: 1, .. })
        ));
        assert!(seg.max_expiry().is_err());
        assert!(seg.to_string().contains("buffer too small"));
    }

    #[test]
    fn round_trip_should_preserve_ids() {
        let seg = segment(4);
        let packed = seg.pack().unwrap();
        assert_eq!(packed.len(), seg.total_length());

        let decoded = PathSegment::from_raw(packed.clone()).unwrap();
        assert_eq!(decoded.id().unwrap(), seg.id().unwrap());
        assert_eq!(decoded.full_id().unwrap(), seg.full_id().unwrap());
        assert_eq!(decoded.raw_entries(), seg.raw_entries());
        assert_eq!(decoded.pack().unwrap(), packed);
        assert!(decoded.verify_all(&(), &DigestVerifier).is_ok());
    }

    #[test]
    fn should_reject_trailing_bytes() {
        let mut packed = BytesMut::from(&segment(1).pack().unwrap()[..]);
        packed.put_u8(0);
        assert_eq!(
            PathSegment::from_raw(packed.freeze()).unwrap_err(),
            SegmentError::Decode(DecodeError::TrailingBytes {
                at: "PathSegment",
                remaining: 1
            })
        );
    }

    #[test]
    fn should_reject_truncated_segment() {
        let packed = segment(2).pack().unwrap();
        let err = PathSegment::from_raw(packed.slice(..packed.len() - 10)).unwrap_err();
        assert!(matches!(err, SegmentError::Decode(DecodeError::BufferTooSmall { .. })));
    }

    #[test]
    fn beacon_should_skip_last_egress() {
        let mut entries = linked_chain(2);
        // The last AS already announces the next AS.
        entries[1].hop_entries[0].out_ia = ia(3);
        let seg = segment_from(entries);

        assert_eq!(seg.validate(ValidationMethod::Beacon), Ok(()));
        assert_eq!(
            seg.validate(ValidationMethod::Segment),
            Err(ValidationError::AsEntry {
                idx: 1,
                source: AsEntryValidationError::EgressIaMismatch {
                    ia: ia(2),
                    hop_idx: 0,
                    expected: IsdAsn::WILDCARD,
                    actual: ia(3),
                },
            })
        );

        let packed = seg.pack().unwrap();
        assert!(PathSegment::beacon_from_raw(packed.clone()).is_ok());
        assert!(matches!(
            PathSegment::from_raw(packed),
            Err(SegmentError::Validation(ValidationError::AsEntry { idx: 1, .. }))
        ));
    }

    #[test]
    fn beacon_should_still_check_inner_egress() {
        let mut entries = linked_chain(3);
        entries[0].hop_entries[0].out_ia = ia(9);
        let seg = segment_from(entries);

        assert!(matches!(
            seg.validate(ValidationMethod::Beacon),
            Err(ValidationError::AsEntry { idx: 0, .. })
        ));
    }

    #[test]
    fn should_find_interfaces() {
        let seg = segment(3);
        // AS 2 has ingress 21 and egress 22.
        assert_eq!(seg.contains_interface(ia(2), 21), Ok(true));
        assert_eq!(seg.contains_interface(ia(2), 22), Ok(true));
        assert_eq!(seg.contains_interface(ia(2), 12), Ok(false));
        assert_eq!(seg.contains_interface(ia(1), 12), Ok(true));
        assert_eq!(seg.first_ia(), Some(ia(1)));
        assert_eq!(seg.last_ia(), Some(ia(3)));
        assert_eq!(seg.max_entry_idx(), Some(2));
    }

    #[test]
    fn should_encode_dataplane_segment() {
        let seg = segment(3);
        let mut buffer = Vec::new();
        let written = seg.encode_dataplane_segment(&mut buffer).unwrap();
        assert_eq!(written, 8 + 3 * 12);
        assert_eq!(buffer.len(), written);

        let mut data = Bytes::from(buffer);
        let info = InfoField::decode(&mut data).unwrap();
        assert_eq!(info.hops, 3);
        assert_eq!(info.timestamp, TIMESTAMP);
        let hops = (0..3)
            .map(|_| HopField::decode(&mut data).unwrap())
            .map(|hop| (hop.cons_ingress, hop.cons_egress))
            .collect::<Vec<_>>();
        assert_eq!(hops, vec![(0, 12), (21, 22), (31, 0)]);
        // The signed data is not modified.
        assert_eq!(seg.info_field().unwrap().hops, 0);
    }

    #[test]
    fn shallow_copy_should_share_entries() {
        let seg = segment(2);
        let id = seg.id().unwrap();
        let mut copy = seg.shallow_copy();

        assert!(Arc::ptr_eq(&seg.entries[0], &copy.entries[0]));
        assert_eq!(copy.id.get(), Some(&id));

        copy.add_as_entry(as_entry(3, ia(2), IsdAsn::WILDCARD, (31, 0), 63), &DigestSigner)
            .unwrap();
        assert_eq!(seg.len(), 2);
        assert_eq!(copy.len(), 3);
        assert_eq!(seg.id().unwrap(), id);
    }

    #[test]
    fn should_display_hops() {
        let seg = segment(2);
        let id = seg.id().unwrap();
        assert_eq!(
            seg.to_string(),
            format!("{id} 2023-11-14T22:13:20Z 1-1 12>21 1-2")
        );
    }

    /// Builds a chain of `n` AS entries with the given per-link corruptions.
    fn corrupted_chain(n: usize, corrupt_in: &[bool], corrupt_out: &[bool]) -> PathSegment {
        let mut entries = linked_chain(n);
        for (idx, entry) in entries.iter_mut().enumerate() {
            if corrupt_in[idx] {
                entry.hop_entries[0].in_ia = IsdAsn::new_from_raw(9, 999);
            }
            if corrupt_out[idx] {
                entry.hop_entries[0].out_ia = IsdAsn::new_from_raw(9, 999);
            }
        }
        segment_from(entries)
    }

    proptest! {
        #[test]
        fn validation_should_accept_exactly_linked_chains(
            (n, corrupt_in, corrupt_out) in (1usize..6).prop_flat_map(|n| {
                (
                    Just(n),
                    prop::collection::vec(any::<bool>(), n),
                    prop::collection::vec(any::<bool>(), n),
                )
            })
        ) {
            let seg = corrupted_chain(n, &corrupt_in, &corrupt_out);

            let inner_ok = !corrupt_in.iter().any(|c| *c)
                && !corrupt_out[..n - 1].iter().any(|c| *c);
            let segment_ok = inner_ok && !corrupt_out[n - 1];

            prop_assert_eq!(seg.validate(ValidationMethod::Segment).is_ok(), segment_ok);
            prop_assert_eq!(seg.validate(ValidationMethod::Beacon).is_ok(), inner_ok);
        }
    }
}
