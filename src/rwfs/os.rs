//! Disk-backed filesystem rooted at a directory.

use super::{clean, DirEntry, ReadFs, WriteFs};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem implementation using `std::fs`. Every path is joined onto `root`.
#[derive(Debug, Clone)]
pub struct OsFs {
    root: PathBuf,
}

impl OsFs {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = clean(path);
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl ReadFs for OsFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntry { name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

impl WriteFs for OsFs {
    fn create_dir_all(&self, path: &str) -> io::Result<()> {
        fs::create_dir_all(self.resolve(path))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()> {
        fs::write(self.resolve(path), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let fs = OsFs::new(temp_dir.path());

        fs.create_dir_all("a/b").unwrap();
        fs.write_file("a/b/c.txt", b"hello").unwrap();
        fs.write_file("a/z.txt", b"z").unwrap();

        assert!(fs.is_dir("a/b"));
        assert!(fs.is_file("a/b/c.txt"));
        assert_eq!(fs.read_file("a/b/c.txt").unwrap(), b"hello");

        let names: Vec<String> = fs.read_dir("a").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "z.txt"]);
    }
}
