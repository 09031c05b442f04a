//! Whole-file reads and atomic writes of collection files.

use std::io::Write;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::Record;

/// Read and parse a collection file.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read and [`Error::Parse`] if it
/// is not a JSON array of objects.
pub async fn read_collection(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a collection with 2-space indentation and replace the file.
///
/// # Errors
///
/// Returns [`Error::Write`] if the file cannot be replaced. The previous
/// contents are left untouched in that case.
pub async fn write_collection(path: &Path, records: &[Record]) -> Result<()> {
    let contents = serde_json::to_string_pretty(records)?;
    write_atomic(path, contents.as_bytes()).await
}

/// Write `contents` to a fresh temporary file next to `path`, then rename it
/// over `path`.
///
/// Every call gets its own temporary file, so concurrent writers to the same
/// path never share partially written bytes. The last rename wins.
///
/// # Errors
///
/// Returns [`Error::Write`] if any step fails.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let target = path.to_path_buf();
    let contents = contents.to_vec();
    debug!("Writing {} bytes to {}", contents.len(), target.display());

    tokio::task::spawn_blocking(move || replace_file(&target, &contents))
        .await
        .map_err(|join_error| Error::Write {
            path: path.to_path_buf(),
            source: std::io::Error::other(join_error),
        })?
}

/// Create an empty collection file (and its parent directories) if missing.
///
/// Returns `true` if a file was created.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub async fn ensure_collection(path: &Path) -> Result<bool> {
    let exists = fs::try_exists(path)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if exists {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    write_atomic(path, b"[]").await?;
    Ok(true)
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = temp_file_for(path).map_err(write_error)?;
    if let Err(source) = tmp
        .write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
    {
        discard(tmp);
        return Err(write_error(source));
    }

    if let Err(err) = tmp.persist(path) {
        discard(err.file);
        return Err(write_error(err.error));
    }
    Ok(())
}

/// A uniquely named `.<file name>.<random>.tmp` sibling of `path`.
fn temp_file_for(path: &Path) -> std::io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("collection");

    Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
}

fn discard(tmp: NamedTempFile) {
    let tmp_path = tmp.path().to_path_buf();
    if let Err(err) = tmp.close() {
        warn!(
            "Failed to remove temporary file {}: {err}",
            tmp_path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_read_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_collection(&dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[tokio::test]
    async fn test_read_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{\"id\": \"1\",").unwrap();

        let result = read_collection(&path).await;
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[tokio::test]
    async fn test_read_non_array_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object.json");
        std::fs::write(&path, r#"{"id": "1"}"#).unwrap();
        assert!(matches!(read_collection(&path).await, Err(Error::Parse { .. })));

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(read_collection(&path).await, Err(Error::Parse { .. })));
    }

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.unwrap().file_name().into_string().ok())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_write_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        write_collection(&path, &records(json!([{"id": "1", "nome": "Ana"}])))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[\n  {\n    \"id\": \"1\",\n    \"nome\": \"Ana\"\n  }\n]");
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("users.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "previous").unwrap();

        let result = write_collection(&path, &[]).await;
        assert!(matches!(result, Err(Error::Write { .. })));
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "previous");
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("users.json");

        let result = write_collection(&path, &[]).await;
        assert!(matches!(result, Err(Error::Write { .. })));
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_mix_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let tasks: Vec<_> = (0..32u64)
            .map(|writer| {
                let path = path.clone();
                tokio::spawn(async move {
                    let batch: Vec<_> = (0..=writer)
                        .map(|n| json!({"id": n.to_string(), "writer": writer}))
                        .collect();
                    write_collection(&path, &records(json!(batch))).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = read_collection(&path).await.unwrap();
        let writer = stored[0].get("writer").and_then(serde_json::Value::as_u64).unwrap();
        assert!(stored
            .iter()
            .all(|record| record.get("writer") == Some(&json!(writer))));
        assert_eq!(stored.len() as u64, writer + 1);
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_ensure_collection_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.json");

        assert!(ensure_collection(&path).await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

        std::fs::write(&path, r#"[{"id":"1"}]"#).unwrap();
        assert!(!ensure_collection(&path).await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"[{"id":"1"}]"#);
    }

    #[test]
    fn test_temp_file_is_a_hidden_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");

        let tmp = temp_file_for(&path).unwrap();
        let name = tmp.path().file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(tmp.path().parent(), Some(dir.path()));
        assert!(name.starts_with(".students.json."));
        assert!(name.ends_with(".tmp"));

        let other = temp_file_for(&path).unwrap();
        assert_ne!(tmp.path(), other.path());
    }
}
