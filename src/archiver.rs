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

use crate::config::Config;
use crate::config::ConflictPolicy;
use crate::error::ArchiveError;
use crate::fs::FileMeta;
use crate::fs::FileSystem;
use flate2::Compression;
use flate2::GzBuilder;
use std::fmt;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

pub const GZIP_SUFFIX: &str = ".gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Archived,
	/// Eligible, but left alone because of a dry run.
	WouldArchive,
}

/// Confirmation for one processed log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
	pub source: PathBuf,
	pub archived: PathBuf,
	pub original_len: u64,
	pub outcome: Outcome,
}

impl fmt::Display for ArchiveRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let verb = match self.outcome {
			Outcome::Archived => "archived",
			Outcome::WouldArchive => "would archive",
		};
		write!(f, "{verb} {} -> {}", self.source.display(), self.archived.display())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
	pub files: usize,
	pub bytes: u64,
	pub archive_dir: PathBuf,
	pub dry_run: bool,
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.dry_run {
			write!(
				f,
				"dry run: {} file(s), {} bytes would be archived to {}",
				self.files,
				self.bytes,
				self.archive_dir.display()
			)
		} else {
			write!(
				f,
				"log archiving completed: {} file(s), {} bytes archived to {}",
				self.files,
				self.bytes,
				self.archive_dir.display()
			)
		}
	}
}

/// Compresses aged log files and moves them into the archive directory.
///
/// A run stops at the first error. Files handled before it stay archived and files after it are not touched.
#[derive(Debug)]
pub struct Archiver<F> {
	fs: F,
	config: Config,
}

impl<F: FileSystem> Archiver<F> {
	pub fn new(fs: F, config: Config) -> Self {
		Self { fs, config }
	}

	pub fn fs(&self) -> &F {
		&self.fs
	}

	pub fn into_fs(self) -> F {
		self.fs
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Runs one pass, handing each confirmation to `on_record` as soon as its file is done.
	pub fn run(&self, now: SystemTime, mut on_record: impl FnMut(&ArchiveRecord)) -> Result<Summary, ArchiveError> {
		let archive_dir = &self.config.archive_dir;
		tracing::info!(
			source = %self.config.source_dir.display(),
			archive = %archive_dir.display(),
			max_age_days = self.config.max_age_days,
			dry_run = self.config.dry_run,
			"starting archive run"
		);

		if !self.config.dry_run {
			self.fs
				.create_dir_all(archive_dir)
				.map_err(|source| ArchiveError::DirectoryCreation {
					path: archive_dir.clone(),
					source,
				})?;
		}

		let mut summary = Summary {
			files: 0,
			bytes: 0,
			archive_dir: archive_dir.clone(),
			dry_run: self.config.dry_run,
		};
		for file in self.eligible(now)? {
			let record = if self.config.dry_run {
				ArchiveRecord {
					archived: self.archive_path(&gz_path(&file.path)),
					source: file.path,
					original_len: file.len,
					outcome: Outcome::WouldArchive,
				}
			} else {
				self.archive(file)?
			};
			summary.files += 1;
			summary.bytes += record.original_len;
			on_record(&record);
		}

		tracing::info!(files = summary.files, bytes = summary.bytes, "archive run finished");
		Ok(summary)
	}

	/// The files the next run would archive, sorted by path.
	pub fn eligible(&self, now: SystemTime) -> Result<Vec<FileMeta>, ArchiveError> {
		let source_dir = &self.config.source_dir;
		let policy = self.config.retention();
		let mut files = self
			.fs
			.list_files(source_dir)
			.map_err(|source| ArchiveError::Enumeration {
				path: source_dir.clone(),
				source,
			})?;
		files.retain(|file| {
			let matches = file
				.path
				.file_name()
				.is_some_and(|name| name.to_string_lossy().ends_with(&self.config.suffix));
			let keep = matches && policy.is_expired(file.modified, now);
			tracing::debug!(path = %file.path.display(), matches, eligible = keep, "scanned");
			keep
		});
		files.sort_by(|a, b| a.path.cmp(&b.path));
		Ok(files)
	}

	fn archive(&self, file: FileMeta) -> Result<ArchiveRecord, ArchiveError> {
		let compressed = self.compress(&file)?;
		let archived = self.relocate(&compressed)?;
		tracing::debug!(source = %file.path.display(), archived = %archived.display(), "archived");
		Ok(ArchiveRecord {
			source: file.path,
			archived,
			original_len: file.len,
			outcome: Outcome::Archived,
		})
	}

	/// Gzips `file` next to itself and removes the original. On failure the original is left as it was.
	///
	/// An existing `<name>.gz` is never replaced: it may be a leftover from a failed relocation, or a symlink.
	fn compress(&self, file: &FileMeta) -> Result<PathBuf, ArchiveError> {
		let target = gz_path(&file.path);
		let failed = |source: io::Error| ArchiveError::Compression {
			path: file.path.clone(),
			source,
		};
		let reader = self.fs.open(&file.path).map_err(failed)?;
		let writer = self.fs.create(&target).map_err(failed)?;
		let result = self
			.write_gzip(file, reader, writer)
			.and_then(|()| self.fs.remove_file(&file.path));
		if let Err(source) = result {
			if let Err(err) = self.fs.remove_file(&target) {
				tracing::warn!(path = %target.display(), %err, "could not remove partial archive");
			}
			return Err(failed(source));
		}
		Ok(target)
	}

	fn write_gzip(&self, file: &FileMeta, mut reader: impl Read, writer: impl Write) -> io::Result<()> {
		let mut builder = GzBuilder::new().mtime(gzip_mtime(file.modified));
		if let Some(name) = file.path.file_name() {
			builder = builder.filename(name.to_string_lossy().into_owned());
		}
		let mut encoder = builder.write(writer, Compression::new(self.config.compression_level));
		io::copy(&mut reader, &mut encoder)?;
		encoder.finish()?.flush()
	}

	fn relocate(&self, compressed: &Path) -> Result<PathBuf, ArchiveError> {
		let target = self.archive_path(compressed);
		let failed = |source| ArchiveError::Relocation {
			path: compressed.to_path_buf(),
			target: target.clone(),
			source,
		};
		if self.config.on_conflict == ConflictPolicy::Reject && self.fs.exists(&target) {
			return Err(failed(io::Error::new(io::ErrorKind::AlreadyExists, "archive already exists")));
		}
		self.fs.rename(compressed, &target).map_err(failed)?;
		Ok(target)
	}

	fn archive_path(&self, compressed: &Path) -> PathBuf {
		match compressed.file_name() {
			Some(name) => self.config.archive_dir.join(name),
			None => self.config.archive_dir.clone(),
		}
	}
}

/// `app.log` becomes `app.log.gz`.
pub fn gz_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(GZIP_SUFFIX);
	PathBuf::from(name)
}

fn gzip_mtime(modified: SystemTime) -> u32 {
	modified
		.duration_since(UNIX_EPOCH)
		.ok()
		.and_then(|d| u32::try_from(d.as_secs()).ok())
		.unwrap_or(0)
}
