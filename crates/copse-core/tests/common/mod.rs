#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Write a file, creating parent directories as needed.
pub fn write_file(path: impl AsRef<Path>, contents: &[u8]) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn read(path: impl AsRef<Path>) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[derive(Debug, PartialEq, Eq)]
enum Shape {
    File(Vec<u8>),
    Dir,
    Link(PathBuf),
}

fn snapshot(root: &Path) -> BTreeMap<PathBuf, Shape> {
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Shape>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path.strip_prefix(root).unwrap().to_path_buf();
        let meta = fs::symlink_metadata(&path).unwrap();
        if meta.file_type().is_symlink() {
            out.insert(rel, Shape::Link(fs::read_link(&path).unwrap()));
        } else if meta.is_dir() {
            out.insert(rel, Shape::Dir);
            walk(root, &path, out);
        } else {
            out.insert(rel, Shape::File(fs::read(&path).unwrap()));
        }
    }
}

/// Assert two trees have identical relative shape, file contents, and link
/// targets.
pub fn assert_same_tree(a: impl AsRef<Path>, b: impl AsRef<Path>) {
    let left = snapshot(a.as_ref());
    let right = snapshot(b.as_ref());
    assert_eq!(left, right, "trees differ");
}
