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

//! Path segment errors.

use crate::{
    address::IsdAsn,
    control_plane::seg::signing::{SigningError, VerificationError},
    wire_encoding::{DecodeError, PackError},
};

/// Error returned when a single AS entry is inconsistent with its neighbors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AsEntryValidationError {
    /// The AS entry does not contain any hop entries.
    #[error("AS entry {ia} has no hop entries")]
    NoHopEntries {
        /// IA of the AS entry
        ia: IsdAsn,
    },
    /// The ingress neighbor recorded in the primary hop entry does not match the previous AS.
    #[error("invalid ingress IA in AS entry {ia}: expected {expected}, actual {actual}")]
    IngressIaMismatch {
        /// IA of the AS entry
        ia: IsdAsn,
        /// IA of the previous AS entry, or the zero value for the first entry
        expected: IsdAsn,
        /// IA recorded in the hop entry
        actual: IsdAsn,
    },
    /// The egress neighbor recorded in a hop entry does not match the next AS.
    #[error(
        "invalid egress IA in hop entry {hop_idx} of AS entry {ia}: expected {expected}, actual {actual}"
    )]
    EgressIaMismatch {
        /// IA of the AS entry
        ia: IsdAsn,
        /// Index of the offending hop entry
        hop_idx: usize,
        /// IA of the next AS entry, or the zero value for the last entry
        expected: IsdAsn,
        /// IA recorded in the hop entry
        actual: IsdAsn,
    },
}

/// Error returned when a path segment fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The signed data of the segment is malformed.
    #[error("invalid signed data")]
    SignedData(#[source] DecodeError),
    /// The segment does not contain any AS entries.
    #[error("path segment has no AS entries")]
    NoAsEntries,
    /// The raw and parsed representation are out of sync.
    #[error("path segment has mismatched number of raw ({raw}) and parsed ({parsed}) AS entries")]
    EntryCountMismatch {
        /// Number of raw AS entries
        raw: usize,
        /// Number of parsed AS entries
        parsed: usize,
    },
    /// An AS entry is inconsistent with its neighbors.
    #[error("unable to validate AS entry {idx}")]
    AsEntry {
        /// Index of the AS entry
        idx: usize,
        /// Reason
        #[source]
        source: AsEntryValidationError,
    },
    /// A hop field cannot be parsed.
    #[error("invalid hop field in hop entry {hop_idx} of AS entry {idx}")]
    HopField {
        /// Index of the AS entry
        idx: usize,
        /// Index of the hop entry within the AS entry
        hop_idx: usize,
        /// Parse error
        #[source]
        source: DecodeError,
    },
}

impl ValidationError {
    /// Returns the index of the AS entry the error refers to, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            ValidationError::AsEntry { idx, .. } | ValidationError::HopField { idx, .. } => {
                Some(*idx)
            }
            _ => None,
        }
    }
}

/// An AS entry index outside of the segment was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid AS entry index {idx} for segment with {len} AS entries")]
pub struct IndexError {
    /// Requested index
    pub idx: usize,
    /// Number of AS entries in the segment
    pub len: usize,
}

/// A segment that was assumed to be validated contains unparsable fields.
///
/// Returned by computations that rely on a successful [validation] beforehand. Seeing this error
/// means the segment was used without being validated.
///
/// [validation]: super::PathSegment::validate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// The info field in the signed data cannot be parsed.
    #[error("info field of unvalidated segment cannot be parsed")]
    InfoField(#[source] DecodeError),
    /// A hop field cannot be parsed.
    #[error("hop field {hop_idx} of AS entry {idx} in unvalidated segment cannot be parsed")]
    HopField {
        /// Index of the AS entry
        idx: usize,
        /// Index of the hop entry within the AS entry
        hop_idx: usize,
        /// Parse error
        #[source]
        source: DecodeError,
    },
}

/// Error returned when appending an AS entry fails.
///
/// The segment is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum AddAsEntryError {
    /// The AS entry or the data to sign cannot be encoded.
    #[error("failed to pack AS entry")]
    Pack(#[from] PackError),
    /// The signer failed.
    #[error("failed to sign AS entry")]
    Signing(#[from] SigningError),
}

/// Error returned when verifying the signature of an AS entry.
#[derive(Debug, thiserror::Error)]
pub enum VerifyAsEntryError {
    /// The requested AS entry does not exist.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// The signed data cannot be encoded.
    #[error("failed to pack signed data")]
    Pack(#[from] PackError),
    /// The verifier rejected the signature.
    #[error("signature verification failed")]
    Verification(#[from] VerificationError),
}

/// Error returned when writing a segment as a data-plane segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataPlaneEncodeError {
    /// An AS entry has no hop entries.
    #[error("AS entry {idx} has no hop entries")]
    NoHopEntries {
        /// Index of the AS entry
        idx: usize,
    },
    /// A field could not be parsed.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Error returned when constructing a segment from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    /// The bytes do not decode into a segment.
    #[error("failed to decode path segment")]
    Decode(#[from] DecodeError),
    /// The decoded segment is not valid.
    #[error("invalid path segment")]
    Validation(#[from] ValidationError),
}
