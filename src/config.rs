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

//! Layered configuration: built-in defaults, then `logarchive.toml` (or an explicit file),
//! then `LOGARCHIVE_*` environment variables, then command-line overrides.

use crate::error::ConfigError;
use crate::policy::RetentionPolicy;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use figment::Figment;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "logarchive.toml";
pub const ENV_PREFIX: &str = "LOGARCHIVE_";

/// What to do when the archive directory already holds an artifact with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
	/// Replace the existing artifact, as `mv` does.
	#[default]
	Overwrite,
	/// Fail the run.
	Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Directory scanned for log files. Only its direct children are considered.
	pub source_dir: PathBuf,
	/// Directory receiving the compressed files. Created if missing.
	pub archive_dir: PathBuf,
	/// Files last modified more than this many days ago are archived.
	pub max_age_days: u64,
	/// Only file names ending with this are archived.
	pub suffix: String,
	pub on_conflict: ConflictPolicy,
	/// gzip level, 0 to 9.
	pub compression_level: u32,
	/// Report eligible files without touching anything.
	pub dry_run: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			source_dir: PathBuf::from("/var/log/app"),
			archive_dir: PathBuf::from("/var/log/app/archive"),
			max_age_days: 7,
			suffix: String::from(".log"),
			on_conflict: ConflictPolicy::Overwrite,
			compression_level: 6,
			dry_run: false,
		}
	}
}

/// Values set on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_dir: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub archive_dir: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_age_days: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub suffix: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub on_conflict: Option<ConflictPolicy>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub compression_level: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dry_run: Option<bool>,
}

impl Config {
	/// Loads the configuration. An explicit `file` must exist; the default file is optional.
	pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
		let toml = match file {
			Some(path) if !path.is_file() => return Err(ConfigError::MissingFile(path.to_path_buf())),
			Some(path) => Toml::file(path),
			None => Toml::file(DEFAULT_CONFIG_FILE),
		};
		let config: Self = Self::figment(toml, overrides).extract().map_err(Box::new)?;
		config.validate()?;
		Ok(config)
	}

	fn figment(toml: figment::providers::Data<Toml>, overrides: &ConfigOverrides) -> Figment {
		Figment::from(Serialized::defaults(Config::default()))
			.merge(toml)
			.merge(Env::prefixed(ENV_PREFIX))
			.merge(Serialized::defaults(overrides))
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.compression_level > 9 {
			return Err(ConfigError::Invalid(format!(
				"compression_level must be between 0 and 9, got {}",
				self.compression_level
			)));
		}
		if self.suffix.is_empty() {
			return Err(ConfigError::Invalid(String::from("suffix must not be empty")));
		}
		Ok(())
	}

	pub fn retention(&self) -> RetentionPolicy {
		RetentionPolicy::days(self.max_age_days)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use figment::Jail;

	#[test]
	fn defaults_without_any_source() {
		Jail::expect_with(|_jail| {
			let config = Config::load(None, &ConfigOverrides::default()).unwrap();
			assert_eq!(config, Config::default());
			assert_eq!(config.retention(), RetentionPolicy::days(7));
			Ok(())
		});
	}

	#[test]
	fn layers_apply_in_order() {
		Jail::expect_with(|jail| {
			jail.create_file(
				DEFAULT_CONFIG_FILE,
				r#"
					source_dir = "/srv/logs"
					archive_dir = "/srv/archive"
					max_age_days = 30
					on_conflict = "reject"
				"#,
			)?;
			jail.set_env("LOGARCHIVE_MAX_AGE_DAYS", "14");
			jail.set_env("LOGARCHIVE_SUFFIX", ".txt");

			let overrides = ConfigOverrides {
				suffix: Some(String::from(".out")),
				..Default::default()
			};
			let config = Config::load(None, &overrides).unwrap();
			assert_eq!(config.source_dir, PathBuf::from("/srv/logs"));
			assert_eq!(config.archive_dir, PathBuf::from("/srv/archive"));
			assert_eq!(config.max_age_days, 14);
			assert_eq!(config.suffix, ".out");
			assert_eq!(config.on_conflict, ConflictPolicy::Reject);
			assert_eq!(config.compression_level, 6);
			Ok(())
		});
	}

	#[test]
	fn explicit_file_must_exist() {
		Jail::expect_with(|_jail| {
			let err = Config::load(Some(Path::new("missing.toml")), &ConfigOverrides::default()).unwrap_err();
			assert!(matches!(err, ConfigError::MissingFile(_)));
			Ok(())
		});
	}

	#[test]
	fn explicit_file_replaces_default_file() {
		Jail::expect_with(|jail| {
			jail.create_file(DEFAULT_CONFIG_FILE, "max_age_days = 3")?;
			jail.create_file("other.toml", "max_age_days = 90")?;
			let config = Config::load(Some(Path::new("other.toml")), &ConfigOverrides::default()).unwrap();
			assert_eq!(config.max_age_days, 90);
			Ok(())
		});
	}

	#[test]
	fn rejects_bad_values() {
		Jail::expect_with(|jail| {
			jail.set_env("LOGARCHIVE_COMPRESSION_LEVEL", "12");
			let err = Config::load(None, &ConfigOverrides::default()).unwrap_err();
			assert!(matches!(err, ConfigError::Invalid(_)));

			jail.set_env("LOGARCHIVE_MAX_AGE_DAYS", "soon");
			let err = Config::load(None, &ConfigOverrides::default()).unwrap_err();
			assert!(matches!(err, ConfigError::Figment(_)));
			Ok(())
		});
	}

	#[test]
	fn empty_suffix_is_invalid() {
		let config = Config {
			suffix: String::new(),
			..Config::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
	}
}
