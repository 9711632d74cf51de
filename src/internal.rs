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

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` wins over the flags.
///
/// Call once per process: installing a second global subscriber panics.
pub fn init_logging(verbose: bool, quiet: bool) {
	let level = if quiet {
		"error"
	} else if verbose {
		"debug"
	} else {
		"warn"
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn installs_global_subscriber() {
		init_logging(true, false);
		assert!(tracing::dispatcher::has_been_set());
		tracing::debug!("subscriber installed");
	}
}
