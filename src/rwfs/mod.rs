//! Read/write filesystem abstraction used by the renderer.
//!
//! Paths are `/`-separated and relative to the filesystem root; `""` and `"."`
//! both name the root. The source tree is only ever read; the destination is
//! written through `&self`, so implementations carry their own interior
//! mutability.

mod memory;
mod os;
mod walk;

pub use memory::MemoryFs;
pub use os::OsFs;
pub use walk::{Entry, Visit, Walk};

use std::io;

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read-only view of a file tree.
pub trait ReadFs {
    /// Lists a directory, sorted lexically by entry name.
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    fn read_file(&self, path: &str) -> io::Result<Vec<u8>>;

    fn is_dir(&self, path: &str) -> bool;

    fn exists(&self, path: &str) -> bool;

    /// Whether a regular file exists at `path`.
    fn is_file(&self, path: &str) -> bool {
        self.exists(path) && !self.is_dir(path)
    }
}

/// A file tree that can also be written to.
pub trait WriteFs: ReadFs {
    fn create_dir_all(&self, path: &str) -> io::Result<()>;

    fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()>;
}

/// Normalizes a relative path: strips leading `/` and `./`, trailing `/`, and
/// maps `"."` to the root `""`.
pub fn clean(path: &str) -> &str {
    let mut path = path.trim_start_matches('/');
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.trim_start_matches('/');
    }
    let path = path.trim_end_matches('/');
    if path == "." {
        ""
    } else {
        path
    }
}

/// Joins two relative paths.
pub fn join(dir: &str, name: &str) -> String {
    let dir = clean(dir);
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Returns the parent directory of a relative path, `""` for top-level entries.
pub fn parent(path: &str) -> &str {
    let path = clean(path);
    match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    }
}
