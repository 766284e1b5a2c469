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

//! Ed25519 signing and verification of path segments.
//!
//! The [`Ed25519Signer`] identifies itself by the IA of the signing AS, encoded big endian into
//! the signature source. The [`Ed25519Verifier`] resolves that IA to a verifying key through the
//! [`KeyRing`] passed as verification context.

use std::{collections::HashMap, fmt};

use bytes::Bytes;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};

use crate::{
    address::IsdAsn,
    control_plane::seg::signing::{
        SignatureAlgorithm, SignatureMeta, Signer, SigningError, VerificationError, Verifier,
    },
};

/// Signs AS entries on behalf of an AS.
pub struct Ed25519Signer {
    ia: IsdAsn,
    key: SigningKey,
}

impl Ed25519Signer {
    /// Creates a signer for the given AS.
    pub fn new(ia: IsdAsn, key: SigningKey) -> Self {
        Ed25519Signer { ia, key }
    }

    /// Returns the IA the signer signs for.
    pub fn ia(&self) -> IsdAsn {
        self.ia
    }

    /// Returns the key that verifies signatures of this signer.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("ia", &self.ia)
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Result<SignatureMeta, SigningError> {
        let now = Utc::now().timestamp();
        let timestamp = u32::try_from(now)
            .map_err(|_| SigningError::new(format!("timestamp {now} out of range")))?;
        let signature = self.key.sign(data);

        Ok(SignatureMeta {
            algorithm: SignatureAlgorithm::Ed25519,
            src: Bytes::copy_from_slice(&self.ia.to_be_bytes()),
            signature: Bytes::copy_from_slice(&signature.to_bytes()),
            timestamp,
        })
    }
}

/// Verifying keys of the ASes whose signatures are accepted.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: HashMap<IsdAsn, VerifyingKey>,
}

impl KeyRing {
    /// Creates an empty key ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the key of the AS.
    pub fn insert(&mut self, ia: IsdAsn, key: VerifyingKey) -> Option<VerifyingKey> {
        self.keys.insert(ia, key)
    }

    /// Returns the key of the AS.
    pub fn get(&self, ia: IsdAsn) -> Option<&VerifyingKey> {
        self.keys.get(&ia)
    }
}

impl FromIterator<(IsdAsn, VerifyingKey)> for KeyRing {
    fn from_iter<T: IntoIterator<Item = (IsdAsn, VerifyingKey)>>(iter: T) -> Self {
        KeyRing {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Reasons an Ed25519 signature is rejected.
#[derive(Debug, thiserror::Error)]
pub enum Ed25519VerifyError {
    /// The signature uses a different algorithm.
    #[error("unsupported signature algorithm {0:?}")]
    UnsupportedAlgorithm(SignatureAlgorithm),
    /// The signature source is not an encoded IA.
    #[error("invalid signature source of length {0}")]
    InvalidSource(usize),
    /// No key is known for the signing AS.
    #[error("no verifying key for {0}")]
    UnknownSigner(IsdAsn),
    /// The signature does not match.
    #[error("invalid signature")]
    InvalidSignature(#[from] ed25519_dalek::SignatureError),
}

/// Verifies Ed25519 signatures with keys from a [`KeyRing`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    fn verify_inner(
        keys: &KeyRing,
        data: &[u8],
        meta: &SignatureMeta,
    ) -> Result<(), Ed25519VerifyError> {
        if meta.algorithm != SignatureAlgorithm::Ed25519 {
            return Err(Ed25519VerifyError::UnsupportedAlgorithm(meta.algorithm));
        }
        let src: [u8; 8] = meta.src[..]
            .try_into()
            .map_err(|_| Ed25519VerifyError::InvalidSource(meta.src.len()))?;
        let ia = IsdAsn(u64::from_be_bytes(src));

        let key = keys.get(ia).ok_or(Ed25519VerifyError::UnknownSigner(ia))?;
        let signature = Signature::from_slice(&meta.signature)?;
        key.verify_strict(data, &signature)?;

        tracing::trace!(isd_as = %ia, "Verified signature");
        Ok(())
    }
}

impl Verifier for Ed25519Verifier {
    type Context = KeyRing;

    fn verify(
        &self,
        context: &KeyRing,
        data: &[u8],
        signature: &SignatureMeta,
    ) -> Result<(), VerificationError> {
        Self::verify_inner(context, data, signature).map_err(VerificationError::new)
    }
}
