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

use crate::fs::FileMeta;
use crate::fs::FileSystem;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::SystemTime;

/// An in-memory [`FileSystem`] with injectable failures.
///
/// # Examples
///
/// ```
/// use logarchive::FileSystem;
/// use logarchive::MemFs;
/// use std::path::Path;
/// use std::time::SystemTime;
///
/// let fs = MemFs::new();
/// fs.add_file("/var/log/app/app.log", "boot ok\n", SystemTime::UNIX_EPOCH);
/// assert!(fs.exists(Path::new("/var/log/app")));
/// assert_eq!(fs.contents("/var/log/app/app.log").as_deref(), Some(&b"boot ok\n"[..]));
/// ```
#[derive(Debug, Default)]
pub struct MemFs {
	state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
	dirs: BTreeSet<PathBuf>,
	files: BTreeMap<PathBuf, MemFile>,
	failing_writes: BTreeSet<PathBuf>,
	read_only: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone)]
struct MemFile {
	data: Vec<u8>,
	modified: SystemTime,
}

impl MemFs {
	pub fn new() -> Self {
		Self::default()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Adds a directory and its parents.
	pub fn add_dir(&self, path: impl AsRef<Path>) {
		self.state().insert_dir(path.as_ref());
	}

	/// Adds or replaces a file, creating its parent directories.
	pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>, modified: SystemTime) {
		let path = path.as_ref();
		let mut state = self.state();
		if let Some(parent) = path.parent() {
			state.insert_dir(parent);
		}
		state.files.insert(
			path.to_path_buf(),
			MemFile {
				data: data.into(),
				modified,
			},
		);
	}

	pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
		self.state().files.get(path.as_ref()).map(|f| f.data.clone())
	}

	pub fn modified(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
		self.state().files.get(path.as_ref()).map(|f| f.modified)
	}

	/// Names of the files directly under `dir`, sorted.
	pub fn file_names(&self, dir: impl AsRef<Path>) -> Vec<String> {
		let dir = dir.as_ref();
		self.state()
			.files
			.keys()
			.filter(|p| p.parent() == Some(dir))
			.filter_map(|p| p.file_name())
			.map(|n| n.to_string_lossy().into_owned())
			.collect()
	}

	/// Makes every write to `path` fail, as a full disk would.
	pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
		self.state().failing_writes.insert(path.as_ref().to_path_buf());
	}

	/// Denies creating files, renaming into, or making directories under `dir`.
	pub fn make_read_only(&self, dir: impl AsRef<Path>) {
		self.state().read_only.insert(dir.as_ref().to_path_buf());
	}
}

impl State {
	fn insert_dir(&mut self, path: &Path) {
		for ancestor in path.ancestors() {
			if ancestor.as_os_str().is_empty() {
				break;
			}
			self.dirs.insert(ancestor.to_path_buf());
		}
	}

	/// Checks that a new entry may be placed at `path`.
	fn check_writable_parent(&self, path: &Path) -> io::Result<()> {
		let parent = path.parent().unwrap_or(Path::new("/"));
		if !self.dirs.contains(parent) {
			return Err(not_found(parent));
		}
		if self.read_only.contains(parent) {
			return Err(io::Error::new(
				io::ErrorKind::PermissionDenied,
				format!("{} is read-only", parent.display()),
			));
		}
		Ok(())
	}
}

fn not_found(path: &Path) -> io::Error {
	io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file or directory", path.display()))
}

impl FileSystem for MemFs {
	fn create_dir_all(&self, path: &Path) -> io::Result<()> {
		let mut state = self.state();
		if state.files.contains_key(path) {
			return Err(io::Error::new(
				io::ErrorKind::AlreadyExists,
				format!("{} exists and is not a directory", path.display()),
			));
		}
		// The deepest existing ancestor decides whether anything can be made below it.
		let first_missing = path.ancestors().take_while(|p| !state.dirs.contains(*p)).last();
		if let Some(first_missing) = first_missing {
			if let Some(parent) = first_missing.parent() {
				if state.read_only.contains(parent) {
					return Err(io::Error::new(
						io::ErrorKind::PermissionDenied,
						format!("{} is read-only", parent.display()),
					));
				}
			}
		}
		state.insert_dir(path);
		Ok(())
	}

	fn list_files(&self, dir: &Path) -> io::Result<Vec<FileMeta>> {
		let state = self.state();
		if !state.dirs.contains(dir) {
			return Err(not_found(dir));
		}
		Ok(state
			.files
			.iter()
			.filter(|(path, _)| path.parent() == Some(dir))
			.map(|(path, file)| FileMeta {
				path: path.clone(),
				modified: file.modified,
				len: file.data.len() as u64,
			})
			.collect())
	}

	fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
		let state = self.state();
		let file = state.files.get(path).ok_or_else(|| not_found(path))?;
		Ok(Box::new(Cursor::new(file.data.clone())))
	}

	fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
		let mut state = self.state();
		state.check_writable_parent(path)?;
		if state.files.contains_key(path) || state.dirs.contains(path) {
			return Err(io::Error::new(
				io::ErrorKind::AlreadyExists,
				format!("{} already exists", path.display()),
			));
		}
		state.files.insert(
			path.to_path_buf(),
			MemFile {
				data: Vec::new(),
				modified: SystemTime::now(),
			},
		);
		Ok(Box::new(MemWriter {
			fs: self,
			path: path.to_path_buf(),
		}))
	}

	fn remove_file(&self, path: &Path) -> io::Result<()> {
		match self.state().files.remove(path) {
			Some(_) => Ok(()),
			None => Err(not_found(path)),
		}
	}

	fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
		let mut state = self.state();
		if !state.files.contains_key(from) {
			return Err(not_found(from));
		}
		state.check_writable_parent(to)?;
		if let Some(file) = state.files.remove(from) {
			state.files.insert(to.to_path_buf(), file);
		}
		Ok(())
	}

	fn exists(&self, path: &Path) -> bool {
		let state = self.state();
		state.files.contains_key(path) || state.dirs.contains(path)
	}
}

/// Appends straight into the file entry, so data is visible without a flush.
struct MemWriter<'a> {
	fs: &'a MemFs,
	path: PathBuf,
}

impl Write for MemWriter<'_> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let mut state = self.fs.state();
		if state.failing_writes.contains(&self.path) {
			return Err(io::Error::other(format!("simulated write failure on {}", self.path.display())));
		}
		let file = state.files.get_mut(&self.path).ok_or_else(|| not_found(&self.path))?;
		file.data.extend_from_slice(buf);
		file.modified = SystemTime::now();
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_dir_all_is_idempotent() {
		let fs = MemFs::new();
		fs.create_dir_all(Path::new("/a/b")).unwrap();
		fs.create_dir_all(Path::new("/a/b")).unwrap();
		assert!(fs.exists(Path::new("/a")));
		assert!(fs.exists(Path::new("/a/b")));
	}

	#[test]
	fn read_only_parent_blocks_new_dirs() {
		let fs = MemFs::new();
		fs.add_dir("/srv");
		fs.make_read_only("/srv");
		let err = fs.create_dir_all(Path::new("/srv/archive/2026")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
		assert!(!fs.exists(Path::new("/srv/archive")));

		// Existing directories below a read-only one are fine.
		fs.add_dir("/srv/existing");
		fs.create_dir_all(Path::new("/srv/existing")).unwrap();
	}

	#[test]
	fn list_files_only_sees_direct_children() {
		let fs = MemFs::new();
		fs.add_file("/logs/a.log", "a", SystemTime::UNIX_EPOCH);
		fs.add_file("/logs/old/b.log", "b", SystemTime::UNIX_EPOCH);

		let files = fs.list_files(Path::new("/logs")).unwrap();
		assert_eq!(files.len(), 1);
		assert_eq!(files[0].path, PathBuf::from("/logs/a.log"));
		assert_eq!(files[0].len, 1);
		assert_eq!(Some(files[0].modified), fs.modified("/logs/a.log"));
	}

	#[test]
	fn create_refuses_existing_file() {
		let fs = MemFs::new();
		fs.add_file("/logs/a.log.gz", "kept", SystemTime::UNIX_EPOCH);
		let err = fs.create(Path::new("/logs/a.log.gz")).err().unwrap();
		assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
		assert_eq!(fs.contents("/logs/a.log.gz").unwrap(), b"kept");
		assert_eq!(fs.modified("/logs/a.log.gz"), Some(SystemTime::UNIX_EPOCH));
	}

	#[test]
	fn failing_writes_leave_partial_file() {
		let fs = MemFs::new();
		fs.add_dir("/logs");
		fs.fail_writes_to("/logs/a.gz");
		let mut w = fs.create(Path::new("/logs/a.gz")).unwrap();
		assert!(w.write_all(b"data").is_err());
		drop(w);
		assert_eq!(fs.contents("/logs/a.gz"), Some(Vec::new()));
	}

	#[test]
	fn rename_requires_existing_target_dir() {
		let fs = MemFs::new();
		fs.add_file("/logs/a.gz", "x", SystemTime::UNIX_EPOCH);
		let err = fs.rename(Path::new("/logs/a.gz"), Path::new("/archive/a.gz")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
		assert!(fs.exists(Path::new("/logs/a.gz")));
	}
}
