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

//! The file-system operations the archiver depends on.
//!
//! [`OsFs`] talks to the real disk. [`MemFs`](crate::MemFs) keeps everything in memory for tests.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

/// A regular file found while scanning a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
	pub path: PathBuf,
	pub modified: SystemTime,
	/// Size in bytes. Only reported, never used for decisions.
	pub len: u64,
}

pub trait FileSystem {
	/// Creates `path` and any missing parents. Succeeds if it already exists.
	fn create_dir_all(&self, path: &Path) -> io::Result<()>;

	/// Lists the regular files directly under `dir`. Subdirectories, symlinks and other entries are skipped.
	fn list_files(&self, dir: &Path) -> io::Result<Vec<FileMeta>>;

	fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

	/// Creates `path` for writing. Fails with `AlreadyExists` if anything, including a symlink, is already there.
	fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;

	fn remove_file(&self, path: &Path) -> io::Result<()>;

	/// Moves `from` to `to`, replacing `to` if it exists.
	fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

	fn exists(&self, path: &Path) -> bool;
}

/// The host file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
	fn create_dir_all(&self, path: &Path) -> io::Result<()> {
		fs::create_dir_all(path)
	}

	fn list_files(&self, dir: &Path) -> io::Result<Vec<FileMeta>> {
		let mut files = Vec::new();
		for entry in fs::read_dir(dir)? {
			let entry = entry?;
			if !entry.file_type()?.is_file() {
				continue;
			}
			let metadata = entry.metadata()?;
			files.push(FileMeta {
				path: entry.path(),
				modified: metadata.modified()?,
				len: metadata.len(),
			});
		}
		Ok(files)
	}

	fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
		Ok(Box::new(io::BufReader::new(File::open(path)?)))
	}

	fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
		// create_new is O_CREAT|O_EXCL: it never follows a symlink at `path`.
		let file = OpenOptions::new().write(true).create_new(true).open(path)?;
		Ok(Box::new(io::BufWriter::new(file)))
	}

	fn remove_file(&self, path: &Path) -> io::Result<()> {
		fs::remove_file(path)
	}

	fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
		let Err(err) = fs::rename(from, to) else {
			return Ok(());
		};
		// rename(2) cannot cross filesystems; fall back to what mv does.
		if !from.is_file() || to.parent().is_some_and(|p| !p.is_dir()) {
			return Err(err);
		}
		tracing::debug!(from = %from.display(), to = %to.display(), %err, "rename failed, copying instead");
		move_by_copy(from, to).map_err(|_| err)
	}

	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}
}

/// Copies `from` next to `to` under a temporary name, renames it into place and removes `from`.
/// An existing `to` stays intact until the copy is complete.
fn move_by_copy(from: &Path, to: &Path) -> io::Result<()> {
	let mut partial = to.as_os_str().to_owned();
	partial.push(".partial");
	let partial = PathBuf::from(partial);
	if let Err(err) = fs::copy(from, &partial).and_then(|_| fs::rename(&partial, to)) {
		if partial.exists() {
			if let Err(cleanup) = fs::remove_file(&partial) {
				tracing::warn!(path = %partial.display(), err = %cleanup, "could not remove partial copy");
			}
		}
		return Err(err);
	}
	fs::remove_file(from)
}
