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

//! Segment builders and signer doubles shared by the unit tests.

use bytes::Bytes;
use sha2::{Digest, Sha256};

use super::{
    AsEntry, HopEntry, PathSegment,
    signing::{
        SignatureAlgorithm, SignatureMeta, Signer, SigningError, VerificationError, Verifier,
    },
};
use crate::{
    address::IsdAsn,
    path::{HopField, HopFieldMac, InfoField},
};

pub(crate) const TIMESTAMP: u32 = 1_700_000_000;

pub(crate) fn ia(asn: u64) -> IsdAsn {
    IsdAsn::new_from_raw(1, asn)
}

pub(crate) fn as_entry(
    asn: u64,
    in_ia: IsdAsn,
    out_ia: IsdAsn,
    (cons_ingress, cons_egress): (u16, u16),
    exp_time: u8,
) -> AsEntry {
    let hop_field = HopField::new(
        exp_time,
        cons_ingress,
        cons_egress,
        HopFieldMac([asn as u8; 6]),
    );
    AsEntry::new(ia(asn), 1472, HopEntry::new(in_ia, out_ia, &hop_field))
}

/// AS entries of ASes `1-1` to `1-n`. AS `1-i` uses ingress `i1` and egress `i2`.
pub(crate) fn linked_chain(n: usize) -> Vec<AsEntry> {
    (1..=n as u64)
        .map(|asn| {
            let first = asn == 1;
            let last = asn == n as u64;
            let in_ia = if first { IsdAsn::WILDCARD } else { ia(asn - 1) };
            let out_ia = if last { IsdAsn::WILDCARD } else { ia(asn + 1) };
            let ingress = if first { 0 } else { asn as u16 * 10 + 1 };
            let egress = if last { 0 } else { asn as u16 * 10 + 2 };
            as_entry(asn, in_ia, out_ia, (ingress, egress), 63)
        })
        .collect()
}

pub(crate) fn segment_from(entries: Vec<AsEntry>) -> PathSegment {
    let mut segment = PathSegment::new(&InfoField::new(1, TIMESTAMP)).unwrap();
    for entry in entries {
        segment.add_as_entry(entry, &DigestSigner).unwrap();
    }
    segment
}

pub(crate) fn segment(n: usize) -> PathSegment {
    segment_from(linked_chain(n))
}

/// "Signs" by hashing the data.
pub(crate) struct DigestSigner;

impl Signer for DigestSigner {
    fn sign(&self, data: &[u8]) -> Result<SignatureMeta, SigningError> {
        Ok(SignatureMeta {
            algorithm: SignatureAlgorithm::Other(0xff),
            src: Bytes::from_static(b"digest"),
            signature: Bytes::copy_from_slice(&Sha256::digest(data)),
            timestamp: TIMESTAMP,
        })
    }
}

pub(crate) struct DigestVerifier;

impl Verifier for DigestVerifier {
    type Context = ();

    fn verify(
        &self,
        _context: &(),
        data: &[u8],
        signature: &SignatureMeta,
    ) -> Result<(), VerificationError> {
        if signature.signature[..] != Sha256::digest(data)[..] {
            return Err(VerificationError::new("digest mismatch"));
        }
        Ok(())
    }
}

pub(crate) struct FailingSigner;

impl Signer for FailingSigner {
    fn sign(&self, _data: &[u8]) -> Result<SignatureMeta, SigningError> {
        Err(SigningError::new("key unavailable"))
    }
}
