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

use std::io;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an archiving run.
///
/// Every variant is fatal: the run stops at the first one and nothing is retried.
#[derive(Debug, Error)]
pub enum ArchiveError {
	#[error("cannot create archive directory {path}")]
	DirectoryCreation {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("cannot read log directory {path}")]
	Enumeration {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("cannot compress {path}")]
	Compression {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("cannot move {path} to {target}")]
	Relocation {
		path: PathBuf,
		target: PathBuf,
		#[source]
		source: io::Error,
	},
}

impl ArchiveError {
	/// The file or directory the failed operation was working on.
	pub fn path(&self) -> &Path {
		match self {
			Self::DirectoryCreation { path, .. }
			| Self::Enumeration { path, .. }
			| Self::Compression { path, .. }
			| Self::Relocation { path, .. } => path,
		}
	}
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(transparent)]
	Figment(#[from] Box<figment::Error>),

	#[error("config file {0} does not exist")]
	MissingFile(PathBuf),

	#[error("invalid configuration: {0}")]
	Invalid(String),
}
