//! In-memory filesystem, used as a render destination for snapshots and tests.

use super::{clean, parent, DirEntry, ReadFs, WriteFs};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory file tree. The root directory always exists.
#[derive(Debug, Default)]
pub struct MemoryFs {
    inner: RwLock<MemoryFsInner>,
}

#[derive(Debug, Default)]
struct MemoryFsInner {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl MemoryFsInner {
    fn is_dir(&self, path: &str) -> bool {
        path.is_empty() || self.directories.contains(path)
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory filesystem lock poisoned")
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{path}' does not exist"))
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filesystem from `(path, content)` pairs, creating parents.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> io::Result<Self>
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        for (path, content) in files {
            let path = path.as_ref();
            fs.create_dir_all(parent(path))?;
            fs.write_file(path, content.as_ref())?;
        }
        Ok(fs)
    }

    /// All file paths, sorted.
    pub fn list_files(&self) -> Vec<String> {
        self.read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Reads a file as UTF-8, if present.
    pub fn read_to_string(&self, path: &str) -> Option<String> {
        let bytes = self.read_file(path).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn read(&self) -> io::Result<RwLockReadGuard<'_, MemoryFsInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> io::Result<RwLockWriteGuard<'_, MemoryFsInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

impl ReadFs for MemoryFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let path = clean(path);
        let inner = self.read()?;
        if !inner.is_dir(path) {
            return Err(not_found(path));
        }

        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };
        let direct_child = |candidate: &str| {
            candidate
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                .map(str::to_string)
        };

        let mut entries: Vec<DirEntry> = inner
            .directories
            .iter()
            .filter_map(|d| direct_child(d.as_str()))
            .map(|name| DirEntry { name, is_dir: true })
            .chain(
                inner
                    .files
                    .keys()
                    .filter_map(|f| direct_child(f.as_str()))
                    .map(|name| DirEntry { name, is_dir: false }),
            )
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = clean(path);
        self.read()?.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn is_dir(&self, path: &str) -> bool {
        self.read().map(|inner| inner.is_dir(clean(path))).unwrap_or(false)
    }

    fn exists(&self, path: &str) -> bool {
        let path = clean(path);
        self.read()
            .map(|inner| inner.is_dir(path) || inner.files.contains_key(path))
            .unwrap_or(false)
    }
}

impl WriteFs for MemoryFs {
    fn create_dir_all(&self, path: &str) -> io::Result<()> {
        let path = clean(path);
        let mut inner = self.write()?;

        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(component);

            if inner.files.contains_key(&current) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("'{current}' is a file"),
                ));
            }
            inner.directories.insert(current.clone());
        }
        Ok(())
    }

    fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let path = clean(path);
        let mut inner = self.write()?;

        if path.is_empty() || inner.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{path}' is a directory"),
            ));
        }

        let dir = parent(path);
        if !inner.is_dir(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory '{dir}' does not exist"),
            ));
        }

        inner.files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}
