//! Source file discovery.
//!
//! Walks a codebase directory and loads every PL/SQL source file it finds.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File suffixes treated as PL/SQL sources: scripts, package specs, package bodies.
pub const PLSQL_EXTENSIONS: [&str; 3] = [".sql", ".pks", ".pkb"];

/// A source file read from the codebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub content: String,
}

/// Errors raised while collecting source files.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Codebase path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Codebase path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("File collection was aborted: {0}")]
    Aborted(String),
}

/// Whether a file name carries one of the PL/SQL suffixes.
pub fn is_plsql_file(name: &str) -> bool {
    PLSQL_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Recursively load all PL/SQL files below `root`.
///
/// Files are returned in traversal order. Symbolic links are followed.
/// Entries below the root that cannot be read are logged and skipped. Bytes
/// that are not valid UTF-8 are replaced rather than rejected. Blocking; async
/// callers should run it on the blocking pool.
pub fn collect(root: &Path) -> Result<Vec<FileRecord>, CollectError> {
    let metadata = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CollectError::NotFound(root.to_path_buf())
        } else {
            CollectError::Read {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(CollectError::NotADirectory(root.to_path_buf()));
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable subtrees and dangling links are skipped, only the root is fatal.
            Err(err) if err.depth() > 0 => {
                tracing::warn!("Skipping entry under {}: {}", root.display(), err);
                continue;
            }
            Err(source) => {
                return Err(CollectError::Walk {
                    root: root.to_path_buf(),
                    source,
                })
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if !is_plsql_file(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let path = entry.into_path();
        let bytes = std::fs::read(&path).map_err(|source| CollectError::Read {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!("Collected {} ({} bytes)", path.display(), bytes.len());
        records.push(FileRecord { path, content });
    }

    Ok(records)
}

/// Async wrapper around [`collect`] that runs the walk on the blocking pool.
pub async fn collect_async(root: PathBuf) -> Result<Vec<FileRecord>, CollectError> {
    tokio::task::spawn_blocking(move || collect(&root))
        .await
        .unwrap_or_else(|e| Err(CollectError::Aborted(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_is_plsql_file() {
        assert!(is_plsql_file("billing.sql"));
        assert!(is_plsql_file("pkg_orders.pks"));
        assert!(is_plsql_file("pkg_orders.pkb"));
        assert!(!is_plsql_file("README.md"));
        assert!(!is_plsql_file("schema.sql.bak"));
        assert!(!is_plsql_file("pkb"));
    }

    #[test]
    fn test_non_matching_files_yield_empty() {
        let temp = tempdir().unwrap();
        write(temp.path(), "notes.txt", b"hello");
        write(temp.path(), "nested/build.xml", b"<project/>");

        let records = collect(temp.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_collects_recursively() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        write(temp.path(), "pkg/orders.pks", b"CREATE PACKAGE orders AS END;");
        write(temp.path(), "pkg/deep/orders.pkb", b"CREATE PACKAGE BODY orders AS END;");
        write(temp.path(), "pkg/ignored.java", b"class X {}");

        let records = collect(temp.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.path.starts_with(temp.path())));

        let by_name: BTreeMap<_, _> = records
            .iter()
            .map(|r| {
                let name = r.path.file_name().unwrap().to_string_lossy().to_string();
                (name, r.content.as_str())
            })
            .collect();
        assert_eq!(by_name["a.sql"], "SELECT 1;");
        assert_eq!(by_name["orders.pkb"], "CREATE PACKAGE BODY orders AS END;");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let temp = tempdir().unwrap();
        write(temp.path(), "latin1.sql", b"-- caf\xe9\nSELECT 1;");

        let records = collect(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].content.contains("SELECT 1;"));
        assert!(records[0].content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_collect_is_idempotent() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        write(temp.path(), "b.pkb", b"BEGIN NULL; END;");
        write(temp.path(), "sub/c.pks", b"CREATE PACKAGE c AS END;");

        let mut first = collect(temp.path()).unwrap();
        let mut second = collect(temp.path()).unwrap();
        first.sort_by(|a, b| a.path.cmp(&b.path));
        second.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("does-not-exist");
        assert!(matches!(collect(&missing), Err(CollectError::NotFound(_))));
    }

    #[test]
    fn test_root_is_file() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        let result = collect(&temp.path().join("a.sql"));
        assert!(matches!(result, Err(CollectError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_follows_symlinked_files() {
        let temp = tempdir().unwrap();
        let shared = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        write(shared.path(), "common.pks", b"CREATE PACKAGE common AS END;");
        std::os::unix::fs::symlink(
            shared.path().join("common.pks"),
            temp.path().join("common.pks"),
        )
        .unwrap();

        let mut records = collect(temp.path()).unwrap();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, temp.path().join("a.sql"));
        assert_eq!(records[1].path, temp.path().join("common.pks"));
        assert_eq!(records[1].content, "CREATE PACKAGE common AS END;");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        std::os::unix::fs::symlink(temp.path().join("gone.pkb"), temp.path().join("b.pkb"))
            .unwrap();

        let records = collect(temp.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, temp.path().join("a.sql"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        write(temp.path(), "locked/hidden.sql", b"SELECT 2;");
        let locked = temp.path().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root; nothing to check there.
        let readable_anyway = std::fs::read_dir(&locked).is_ok();
        let result = if readable_anyway { None } else { Some(collect(temp.path())) };
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if let Some(result) = result {
            let records = result.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].path, temp.path().join("a.sql"));
        }
    }

    #[tokio::test]
    async fn test_collect_async() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.sql", b"SELECT 1;");
        let records = collect_async(temp.path().to_path_buf()).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
