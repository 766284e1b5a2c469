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

//! Data-plane path fields embedded in path segments.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

pub mod hop_field;
pub mod info_field;

pub use hop_field::{HopField, HopFieldFlags, HopFieldLayout, HopFieldMac};
pub use info_field::{InfoField, InfoFieldFlags, InfoFieldLayout};

/// Maximum lifetime of a hop field, relative to the segment creation time.
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// MaxTTL / 256 (5m37.5s) see the following for reference:
// https://datatracker.ietf.org/doc/html/draft-dekater-scion-dataplane#name-hop-field
/// Expiration Duration per ExpTime unit on a HopField.
pub const EXP_TIME_UNIT: Duration = Duration::new(337, 500_000_000);

/// Converts the expiration units of a hop field to the relative lifetime of the hop field.
///
/// An expiration value of `n` corresponds to `(n + 1) * EXP_TIME_UNIT`, so the maximum value
/// corresponds to [`MAX_TTL`].
pub fn exp_time_to_duration(exp_time: u8) -> Duration {
    EXP_TIME_UNIT * (u32::from(exp_time) + 1)
}

/// Adds a relative lifetime to an absolute point in time.
pub(crate) fn add_duration(time: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    // Durations handled here are bounded by MAX_TTL.
    time + TimeDelta::nanoseconds(duration.as_nanos() as i64)
}
