//! Depth-first walk over a [`ReadFs`] as a stream of visit events.

use super::{clean, join, DirEntry, ReadFs};
use crate::error::{Error, Result};

/// An entry reached by the walk. `path` is relative to the filesystem root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub name: String,
    pub is_dir: bool,
}

/// A single step of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    EnterDir(Entry),
    File(Entry),
    LeaveDir(Entry),
}

struct Frame {
    dir: Entry,
    children: std::vec::IntoIter<DirEntry>,
}

/// Iterator over the tree rooted at a path, in lexical depth-first order.
///
/// Directory listing failures are yielded as errors; the directory that failed
/// to list is then treated as empty.
pub struct Walk<'a> {
    fs: &'a dyn ReadFs,
    root: Option<String>,
    stack: Vec<Frame>,
}

impl<'a> Walk<'a> {
    pub fn new(fs: &'a dyn ReadFs, root: &str) -> Self {
        Self { fs, root: Some(clean(root).to_string()), stack: Vec::new() }
    }

    /// Stops descending into the most recently entered directory. Its
    /// `LeaveDir` event is not emitted.
    pub fn skip_current_dir(&mut self) {
        self.stack.pop();
    }

    fn enter(&mut self, entry: Entry) -> Result<Visit> {
        let children = self
            .fs
            .read_dir(&entry.path)
            .map_err(|e| Error::fs(entry.path.clone(), e))?;
        self.stack.push(Frame { dir: entry.clone(), children: children.into_iter() });
        Ok(Visit::EnterDir(entry))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<Visit>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            let name = root.rsplit('/').next().unwrap_or_default().to_string();
            if !self.fs.exists(&root) {
                return Some(Err(Error::fs(
                    root,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "walk root does not exist"),
                )));
            }
            let entry = Entry { is_dir: self.fs.is_dir(&root), path: root, name };
            if entry.is_dir {
                return Some(self.enter(entry));
            }
            return Some(Ok(Visit::File(entry)));
        }

        let frame = self.stack.last_mut()?;
        match frame.children.next() {
            Some(child) => {
                let entry = Entry {
                    path: join(&frame.dir.path, &child.name),
                    name: child.name,
                    is_dir: child.is_dir,
                };
                if entry.is_dir {
                    Some(self.enter(entry))
                } else {
                    Some(Ok(Visit::File(entry)))
                }
            }
            None => {
                let frame = self.stack.pop()?;
                Some(Ok(Visit::LeaveDir(frame.dir)))
            }
        }
    }
}
