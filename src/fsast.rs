//! Plain-text snapshot of a file tree, for tests and `--snapshot` output.
//!
//! Every entry is printed as `name:  (type=dir|file)`, nested one tab per
//! directory level. File contents follow their header line, indented one
//! level deeper:
//!
//! ```text
//! NewProject:  (type=dir)
//! 	main.go:  (type=file)
//! 		package main
//! ```

use crate::error::{Error, Result};
use crate::rwfs::{join, ReadFs};
use std::fmt;

pub const ROOT_NODE: &str = "ROOT_NODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Dir,
    File,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Dir => f.write_str("dir"),
            NodeKind::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Entry name, or [`ROOT_NODE`] for the root.
    pub path: String,
    pub content: Vec<u8>,
    pub children: Vec<Node>,
}

impl Node {
    /// Snapshots the tree below `root` of `fs`.
    pub fn build(fs: &dyn ReadFs, root: &str) -> Result<Self> {
        let mut node = Node {
            kind: NodeKind::Dir,
            path: ROOT_NODE.to_string(),
            content: Vec::new(),
            children: Vec::new(),
        };
        build_children(fs, root, &mut node)?;
        Ok(node)
    }

    fn write_children(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "\t".repeat(depth);
        for child in &self.children {
            writeln!(f, "{indent}{}:  (type={})", child.path, child.kind)?;
            match child.kind {
                NodeKind::File => {
                    let content = String::from_utf8_lossy(&child.content)
                        .replace('\n', &format!("\n{indent}\t"));
                    writeln!(f, "{indent}\t{content}")?;
                }
                NodeKind::Dir => child.write_children(f, depth + 1)?,
            }
        }
        Ok(())
    }
}

fn build_children(fs: &dyn ReadFs, dir: &str, node: &mut Node) -> Result<()> {
    let entries = fs.read_dir(dir).map_err(|e| Error::fs(dir, e))?;

    for entry in entries {
        let path = join(dir, &entry.name);
        let mut child = Node {
            kind: if entry.is_dir { NodeKind::Dir } else { NodeKind::File },
            path: entry.name,
            content: Vec::new(),
            children: Vec::new(),
        };

        if entry.is_dir {
            build_children(fs, &path, &mut child)?;
        } else {
            child.content = fs.read_file(&path).map_err(|e| Error::fs(path.as_str(), e))?;
        }
        node.children.push(child);
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_children(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rwfs::MemoryFs;

    #[test]
    fn test_snapshot_format() {
        let fs = MemoryFs::with_files([
            ("proj/main.go", "package main\n\nfunc main() {}"),
            ("proj/docs/readme.md", "# Title"),
            ("top.txt", "x"),
        ])
        .unwrap();

        let ast = Node::build(&fs, "").unwrap();
        assert_eq!(ast.path, ROOT_NODE);

        let expected = "proj:  (type=dir)\n\
            \tdocs:  (type=dir)\n\
            \t\treadme.md:  (type=file)\n\
            \t\t\t# Title\n\
            \tmain.go:  (type=file)\n\
            \t\tpackage main\n\
            \t\t\n\
            \t\tfunc main() {}\n\
            top.txt:  (type=file)\n\
            \tx\n";
        assert_eq!(ast.to_string(), expected);
    }

    #[test]
    fn test_empty_tree() {
        let fs = MemoryFs::new();
        assert_eq!(Node::build(&fs, "").unwrap().to_string(), "");
    }
}
