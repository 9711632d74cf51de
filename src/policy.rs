// Copyright 2026 Octave Online LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;
use std::time::SystemTime;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// How long log files are kept before they are archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
	pub max_age_days: u64,
}

impl RetentionPolicy {
	pub fn days(max_age_days: u64) -> Self {
		Self { max_age_days }
	}

	pub fn max_age(&self) -> Duration {
		Duration::from_secs(self.max_age_days.saturating_mul(SECS_PER_DAY))
	}

	/// Files modified before this instant are expired. `None` if the threshold reaches past the start of the clock.
	pub fn cutoff(&self, now: SystemTime) -> Option<SystemTime> {
		now.checked_sub(self.max_age())
	}

	/// # Examples
	///
	/// ```
	/// use logarchive::RetentionPolicy;
	/// use std::time::Duration;
	/// use std::time::SystemTime;
	///
	/// let now = SystemTime::now();
	/// let week = RetentionPolicy::days(7);
	/// assert!(week.is_expired(now - Duration::from_secs(8 * 86400), now));
	/// assert!(!week.is_expired(now - Duration::from_secs(7 * 86400), now));
	/// ```
	pub fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
		self.cutoff(now).is_some_and(|cutoff| modified < cutoff)
	}
}
