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

//! SCION control-plane path segments.
//!
//! A path segment is a chain of AS entries, each appended and signed by the AS it describes
//! while the segment is propagated through the network. Every signature covers the signed
//! segment metadata and all preceding AS entries, including their signatures, so tampering with
//! any earlier entry invalidates all later signatures.
//!
//! The crate keeps the raw (signed) and the parsed representation of a segment side by side in
//! [`PathSegment`](control_plane::seg::PathSegment), validates the linkage between consecutive AS
//! entries, and derives content addressed segment IDs and expiry windows from the hop fields.
//!
//! Signing and verification are delegated to caller supplied [`Signer`] and [`Verifier`]
//! implementations; [`crypto`] contains an Ed25519 based one.
//!
//! [`Signer`]: control_plane::seg::signing::Signer
//! [`Verifier`]: control_plane::seg::signing::Verifier

pub mod address;
pub mod control_plane;
pub mod crypto;
pub mod path;
pub mod wire_encoding;
