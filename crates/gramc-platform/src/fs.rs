//! Filesystem capability: path helpers and whole-file operations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PlatformError, Result};

/// Joins a parent path and a child name.
pub fn child_path(parent: &str, name: &str) -> String {
    let mut path = PathBuf::from(parent);
    path.push(name);
    path.to_string_lossy().into_owned()
}

/// The parent of the path, or `None` for a filesystem root.
pub fn parent_path(path: &str) -> Option<String> {
    let parent = Path::new(path).parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    Some(parent.to_string_lossy().into_owned())
}

/// The last component of the path.
pub fn file_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// Absolute form of the path, resolved against the current directory.
pub fn absolute_path(path: &str) -> Result<String> {
    let p = Path::new(path);
    if p.is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().map_err(|e| PlatformError::io("current_dir", e))?;
    Ok(cwd.join(p).to_string_lossy().into_owned())
}

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Other,
}

/// Result of [`stat`]: the entry kind plus a size for regular files.
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    pub kind: FileKind,
    pub size: Option<u64>,
}

/// Entry kind and size, or `None` when the path does not exist.
pub fn stat(path: &str) -> Result<Option<FileStat>> {
    match fs::metadata(path) {
        Ok(meta) => {
            let kind = if meta.is_file() {
                FileKind::File
            } else if meta.is_dir() {
                FileKind::Directory
            } else {
                FileKind::Other
            };
            let size = meta.is_file().then(|| meta.len());
            Ok(Some(FileStat { kind, size }))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PlatformError::io("stat", e)),
    }
}

/// Names of the entries in a directory, in directory order.
pub fn list_directory(path: &str) -> Result<Vec<String>> {
    let entries = fs::read_dir(path).map_err(|e| PlatformError::io("read_dir", e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PlatformError::io("read_dir", e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

pub fn read_file_bytes(path: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PlatformError::io("read", e))
}

pub fn read_file_text(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PlatformError::io("read", e))
}

pub fn write_file_bytes(path: &str, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|e| PlatformError::io("write", e))
}

pub fn write_file_text(path: &str, text: &str) -> Result<()> {
    write_file_bytes(path, text.as_bytes())
}

pub fn create_directory(path: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| PlatformError::io("create_dir", e))
}

/// Deletes a file or an empty directory.
pub fn delete(path: &str) -> Result<()> {
    let meta = fs::metadata(path).map_err(|e| PlatformError::io("delete", e))?;
    let result = if meta.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| PlatformError::io("delete", e))
}

pub fn rename(from: &str, to: &str) -> Result<()> {
    fs::rename(from, to).map_err(|e| PlatformError::io("rename", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> String {
        let path = std::env::temp_dir().join(format!("gramc-platform-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn path_helpers() {
        let joined = child_path("a/b", "c.txt");
        assert!(joined.ends_with("c.txt"));
        assert_eq!(file_name(&joined).unwrap(), "c.txt");
        assert_eq!(parent_path(&joined).unwrap(), child_path("a", "b"));
    }

    #[test]
    fn round_trip_and_stat() {
        let dir = temp_dir("roundtrip");
        let path = child_path(&dir, "data.txt");

        assert!(stat(&path).unwrap().is_none());
        write_file_text(&path, "grammar").unwrap();
        assert_eq!(read_file_text(&path).unwrap(), "grammar");

        let st = stat(&path).unwrap().unwrap();
        assert_eq!(st.kind, FileKind::File);
        assert_eq!(st.size, Some(7));

        let names = list_directory(&dir).unwrap();
        assert_eq!(names, vec!["data.txt".to_string()]);

        let moved = child_path(&dir, "moved.txt");
        rename(&path, &moved).unwrap();
        assert!(stat(&path).unwrap().is_none());
        delete(&moved).unwrap();
        delete(&dir).unwrap();
    }
}
