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

//! Signature chain of a path segment.
//!
//! Every AS entry is signed by the AS that appended it. The signed data of the AS entry at index
//! `i` is the concatenation of
//!
//! 1. the encoded signed data of the segment,
//! 2. the encoded [`SignedBlob`]s of the AS entries `0..i`, including their signatures,
//! 3. the encoded AS entry `i` itself.
//!
//! Each signature therefore covers the complete history of the segment up to and including the
//! signing AS. See [`signature_input`].

use std::error::Error;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::wire_encoding::{
    DecodeError, PackError, Prefix, WireDecode, WireEncode, ensure_remaining, get_prefixed,
    put_prefixed,
};

/// Signs path segments.
pub trait Signer {
    /// Signs the given data and returns the signature meta data.
    fn sign(&self, data: &[u8]) -> Result<SignatureMeta, SigningError>;
}

/// Verifies path segment signatures.
pub trait Verifier {
    /// Caller supplied state required for verification, e.g. trust material.
    type Context: ?Sized;

    /// Verifies the signature over the given data.
    fn verify(
        &self,
        context: &Self::Context,
        data: &[u8],
        signature: &SignatureMeta,
    ) -> Result<(), VerificationError>;
}

/// Error returned by a [`Signer`].
#[derive(Debug, thiserror::Error)]
#[error("signing failed: {0}")]
pub struct SigningError(#[source] pub Box<dyn Error + Send + Sync>);
impl SigningError {
    /// Wraps the given error.
    pub fn new(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        SigningError(err.into())
    }
}

/// Error returned by a [`Verifier`].
#[derive(Debug, thiserror::Error)]
#[error("verification failed: {0}")]
pub struct VerificationError(#[source] pub Box<dyn Error + Send + Sync>);
impl VerificationError {
    /// Wraps the given error.
    pub fn new(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        VerificationError(err.into())
    }
}

/// Signature algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureAlgorithm {
    /// No signature.
    #[default]
    None,
    /// Ed25519 signature.
    Ed25519,
    /// Other, unrecognized algorithm.
    Other(u8),
}
impl From<u8> for SignatureAlgorithm {
    fn from(value: u8) -> Self {
        match value {
            0 => SignatureAlgorithm::None,
            1 => SignatureAlgorithm::Ed25519,
            other => SignatureAlgorithm::Other(other),
        }
    }
}
impl From<SignatureAlgorithm> for u8 {
    fn from(val: SignatureAlgorithm) -> Self {
        match val {
            SignatureAlgorithm::None => 0,
            SignatureAlgorithm::Ed25519 => 1,
            SignatureAlgorithm::Other(other) => other,
        }
    }
}

/// Signature and the meta data required to verify it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureMeta {
    /// Signature algorithm.
    pub algorithm: SignatureAlgorithm,
    /// Identifies the signer, interpreted by the [`Verifier`].
    pub src: Bytes,
    /// The signature.
    pub signature: Bytes,
    /// Time of signing, in seconds since the Unix epoch.
    pub timestamp: u32,
}

impl SignatureMeta {
    /// Checks that the variable length fields fit their length prefixes.
    pub fn check_encodable(&self) -> Result<(), PackError> {
        Prefix::U16.check("signature source", self.src.len())?;
        Prefix::U16.check("signature", self.signature.len())
    }
}

const SIGNATURE_META_FIXED_SIZE: usize = 1 + 4;

impl WireEncode for SignatureMeta {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        self.check_encodable()?;
        buffer.put_u8(self.algorithm.into());
        put_prefixed(buffer, Prefix::U16, "signature source", &self.src)?;
        put_prefixed(buffer, Prefix::U16, "signature", &self.signature)?;
        buffer.put_u32(self.timestamp);
        Ok(())
    }

    fn total_length(&self) -> usize {
        SIGNATURE_META_FIXED_SIZE
            + 2 * Prefix::U16.size_bytes()
            + self.src.len()
            + self.signature.len()
    }
}

impl<B: Buf> WireDecode<B> for SignatureMeta {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        ensure_remaining(data, 1, "SignatureMeta")?;
        let algorithm = SignatureAlgorithm::from(data.get_u8());
        let src = get_prefixed(data, Prefix::U16, "SignatureMeta.src")?;
        let signature = get_prefixed(data, Prefix::U16, "SignatureMeta.signature")?;
        ensure_remaining(data, 4, "SignatureMeta.timestamp")?;
        let timestamp = data.get_u32();
        Ok(SignatureMeta {
            algorithm,
            src,
            signature,
            timestamp,
        })
    }
}

/// An encoded AS entry together with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignedBlob {
    /// The encoded AS entry.
    pub blob: Bytes,
    /// Signature over the segment up to and including this AS entry.
    pub sign: SignatureMeta,
}

impl WireEncode for SignedBlob {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        Prefix::U32.check("AS entry blob", self.blob.len())?;
        self.sign.check_encodable()?;
        put_prefixed(buffer, Prefix::U32, "AS entry blob", &self.blob)?;
        self.sign.encode_to(buffer)
    }

    fn total_length(&self) -> usize {
        Prefix::U32.size_bytes() + self.blob.len() + self.sign.total_length()
    }
}

impl<B: Buf> WireDecode<B> for SignedBlob {
    type Error = DecodeError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        let blob = get_prefixed(data, Prefix::U32, "SignedBlob.blob")?;
        let sign = SignatureMeta::decode(data)?;
        Ok(SignedBlob { blob, sign })
    }
}

/// Returns the data signed by the AS entry following `preceding`.
///
/// `raw_signed_data` is the encoded signed data of the segment, `preceding` the signed AS
/// entries before the entry and `blob` the encoded entry itself.
pub fn signature_input(
    raw_signed_data: &[u8],
    preceding: &[SignedBlob],
    blob: &[u8],
) -> Result<Bytes, PackError> {
    let capacity = raw_signed_data.len()
        + preceding
            .iter()
            .map(WireEncode::total_length)
            .sum::<usize>()
        + blob.len();

    let mut data = BytesMut::with_capacity(capacity);
    data.put_slice(raw_signed_data);
    let mut data = preceding.iter().try_fold(data, |mut acc, entry| {
        entry.encode_to(&mut acc)?;
        Ok::<_, PackError>(acc)
    })?;
    data.put_slice(blob);

    tracing::trace!(
        entries = preceding.len(),
        len = data.len(),
        "Computed signature input"
    );
    Ok(data.freeze())
}
