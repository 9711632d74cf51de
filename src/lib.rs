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

//! This package contains a small CLI and library for archiving aged log files.
//!
//! A run scans one log directory for files whose names end with a suffix (`.log` by default) and that were last
//! modified more than a number of days ago. Each one is gzipped next to itself, the original is removed, and the
//! `.gz` file is moved into an archive directory. The first failure stops the run.
//!
//! The `logarchive` binary reads its settings from `logarchive.toml`, `LOGARCHIVE_*` environment variables and
//! command-line flags. See [`Config`].
//!
//! All file access goes through the [`FileSystem`] trait: [`OsFs`] for the real disk, [`MemFs`] for tests.

mod archiver;
mod config;
mod error;
mod fs;
mod memfs;
mod policy;

#[doc(hidden)]
pub mod internal;

pub use archiver::gz_path;
pub use archiver::ArchiveRecord;
pub use archiver::Archiver;
pub use archiver::Outcome;
pub use archiver::Summary;
pub use config::Config;
pub use config::ConfigOverrides;
pub use config::ConflictPolicy;
pub use error::ArchiveError;
pub use error::ConfigError;
pub use fs::FileMeta;
pub use fs::FileSystem;
pub use fs::OsFs;
pub use memfs::MemFs;
pub use policy::RetentionPolicy;
