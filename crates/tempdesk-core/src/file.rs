//! In-memory file store
//!
//! A [`StoredFile`] owns its bytes, its metadata and its
//! [`SharedPermission`]. The three are guarded independently: a byte-level
//! operation never holds the permission lock, so callers test the
//! permission first and then act on the content.

use crate::permission::SharedPermission;
use crate::{CoreError, Result};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// Normalize a file path: strip leading slashes and refuse empty or
/// parent-relative paths
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|segment| segment == "..") {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    Ok(trimmed.to_string())
}

/// A named file held in memory
#[derive(Debug)]
pub struct StoredFile {
    owner: String,
    created_at: DateTime<Utc>,
    modified_at: RwLock<DateTime<Utc>>,
    data: RwLock<Vec<u8>>,
    meta: RwLock<BTreeMap<String, Value>>,
    permission: SharedPermission,
}

impl StoredFile {
    /// Create an empty file with default (unrestricted) permission
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            owner: owner.into(),
            created_at: now,
            modified_at: RwLock::new(now),
            data: RwLock::new(Vec::new()),
            meta: RwLock::new(BTreeMap::new()),
            permission: SharedPermission::default(),
        }
    }

    /// Name of the user who created the file
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether `name` owns this file
    pub fn is_owner(&self, name: &str) -> bool {
        self.owner == name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        *self.modified_at.read()
    }

    /// The file's access control
    pub fn permission(&self) -> &SharedPermission {
        &self.permission
    }

    /// Current size in bytes
    pub fn len(&self) -> u64 {
        self.data.read().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of the whole content
    pub fn contents(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Replace the whole content
    pub fn replace(&self, contents: &[u8]) {
        let mut data = self.data.write();
        data.clear();
        data.extend_from_slice(contents);
        self.touch();
    }

    /// String metadata value; `None` when absent or not a string
    pub fn meta(&self, key: &str) -> Option<String> {
        self.meta
            .read()
            .get(key)
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Store a string metadata value
    pub fn write_meta(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write_file_meta(key, Value::String(value.into()));
    }

    /// Raw metadata value
    pub fn file_meta(&self, key: &str) -> Option<Value> {
        self.meta.read().get(key).cloned()
    }

    /// Store a raw metadata value
    pub fn write_file_meta(&self, key: impl Into<String>, value: Value) {
        self.meta.write().insert(key.into(), value);
    }

    /// All string metadata entries
    pub fn string_meta(&self) -> BTreeMap<String, String> {
        self.meta
            .read()
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }

    fn touch(&self) {
        *self.modified_at.write() = Utc::now();
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> usize {
        let data = self.data.read();
        let Ok(start) = usize::try_from(offset) else {
            return 0;
        };
        if start >= data.len() {
            return 0;
        }
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        n
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset too large"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "offset too large"))?;
        {
            let mut data = self.data.write();
            if end > data.len() {
                data.resize(end, 0);
            }
            data[start..end].copy_from_slice(buf);
        }
        self.touch();
        Ok(buf.len())
    }

    fn truncate(&self, pos: u64, tail: &[u8]) -> io::Result<()> {
        let pos = usize::try_from(pos)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset too large"))?;
        {
            let mut data = self.data.write();
            data.resize(pos, 0);
            data.extend_from_slice(tail);
        }
        self.touch();
        Ok(())
    }
}

/// A cursor over a [`StoredFile`].
///
/// Each handle keeps its own position; handles to the same file share its
/// content.
#[derive(Debug, Clone)]
pub struct FileHandle {
    file: Arc<StoredFile>,
    pos: u64,
}

impl FileHandle {
    pub fn new(file: Arc<StoredFile>) -> Self {
        Self { file, pos: 0 }
    }

    /// The underlying file
    pub fn file(&self) -> &Arc<StoredFile> {
        &self.file
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Read at an absolute offset without moving the cursor.
    ///
    /// Returns the number of bytes read; zero at or past the end.
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        let offset = u64::try_from(offset).map_err(|_| CoreError::NegativeOffset(offset))?;
        Ok(self.file.read_at(buf, offset))
    }

    /// Write at an absolute offset without moving the cursor, growing the
    /// file with zeros when writing past the end
    pub fn write_at(&self, buf: &[u8], offset: i64) -> Result<usize> {
        let offset = u64::try_from(offset).map_err(|_| CoreError::NegativeOffset(offset))?;
        Ok(self.file.write_at(buf, offset)?)
    }

    /// Cut the file at `pos` and append `tail`, leaving it exactly
    /// `pos + tail.len()` bytes long
    pub fn truncate(&self, pos: i64, tail: &[u8]) -> Result<()> {
        let at = u64::try_from(pos).map_err(|_| CoreError::NegativeOffset(pos))?;
        Ok(self.file.truncate(at, tail)?)
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read_at(buf, self.pos);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.file.len().checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of file")
        })?;
        self.pos = target;
        Ok(target)
    }
}

/// An in-memory store of named files
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: DashMap<String, Arc<StoredFile>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file exists at `path`
    pub fn exists(&self, path: &str) -> bool {
        normalize_path(path).is_ok_and(|path| self.files.contains_key(&path))
    }

    /// Create an empty file owned by `owner`
    pub fn create(&self, path: &str, owner: &str) -> Result<Arc<StoredFile>> {
        let path = normalize_path(path)?;
        match self.files.entry(path) {
            Entry::Occupied(entry) => Err(CoreError::FileAlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                let file = Arc::new(StoredFile::new(owner));
                entry.insert(Arc::clone(&file));
                Ok(file)
            }
        }
    }

    /// Look up a file
    pub fn get(&self, path: &str) -> Result<Arc<StoredFile>> {
        let path = normalize_path(path)?;
        self.files
            .get(&path)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(CoreError::FileNotFound(path))
    }

    /// Open a cursor on an existing file
    pub fn open(&self, path: &str) -> Result<FileHandle> {
        self.get(path).map(FileHandle::new)
    }

    /// Move `src` to `dest`, replacing any file already at `dest`
    pub fn rename(&self, dest: &str, src: &str) -> Result<()> {
        let dest = normalize_path(dest)?;
        let src = normalize_path(src)?;
        if dest == src {
            return self.get(&src).map(|_| ());
        }
        let (_, file) = self
            .files
            .remove(&src)
            .ok_or_else(|| CoreError::FileNotFound(src.clone()))?;
        self.files.insert(dest, file);
        Ok(())
    }

    /// Delete a file, returning it
    pub fn remove(&self, path: &str) -> Result<Arc<StoredFile>> {
        let path = normalize_path(path)?;
        self.files
            .remove(&path)
            .map(|(_, file)| file)
            .ok_or(CoreError::FileNotFound(path))
    }

    /// Paths of all files owned by `owner`, sorted
    pub fn list_owned_by(&self, owner: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .iter()
            .filter(|entry| entry.value().is_owner(owner))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
