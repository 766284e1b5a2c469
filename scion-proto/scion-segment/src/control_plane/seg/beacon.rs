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

//! Beacons, i.e. path segments that are still being propagated.

use std::fmt;

use bytes::{Buf, BufMut, Bytes};

use super::{
    PathSegment, Unvalidated, ValidationMethod,
    error::{SegmentError, ValidationError},
};
use crate::wire_encoding::{PackError, WireDecode, WireEncode};

/// A path segment under construction.
///
/// The last AS entry of a beacon announces the AS the beacon is sent to next, so a beacon is
/// validated with [`ValidationMethod::Beacon`].
#[derive(Debug, Clone)]
pub struct Beacon {
    /// The segment carried by the beacon.
    pub segment: PathSegment,
}

impl Beacon {
    /// Wraps the segment.
    pub fn new(segment: PathSegment) -> Self {
        Beacon { segment }
    }

    /// Decodes and validates a beacon.
    pub fn from_raw(raw: Bytes) -> Result<Self, SegmentError> {
        PathSegment::beacon_from_raw(raw).map(Beacon::new)
    }

    /// Validates the beacon.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.segment.validate(ValidationMethod::Beacon)
    }

    /// Returns the carried segment.
    pub fn into_segment(self) -> PathSegment {
        self.segment
    }
}

impl From<PathSegment> for Beacon {
    fn from(segment: PathSegment) -> Self {
        Beacon::new(segment)
    }
}

impl WireEncode for Beacon {
    type Error = PackError;

    fn encode_to<B: BufMut>(&self, buffer: &mut B) -> Result<(), Self::Error> {
        self.segment.encode_to(buffer)
    }

    fn total_length(&self) -> usize {
        self.segment.total_length()
    }
}

impl<B: Buf> WireDecode<B> for Beacon {
    type Error = SegmentError;

    fn decode(data: &mut B) -> Result<Self, Self::Error> {
        Unvalidated::decode(data)?
            .parse(ValidationMethod::Beacon)
            .map(Beacon::new)
    }
}

impl fmt::Display for Beacon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.segment, f)
    }
}
