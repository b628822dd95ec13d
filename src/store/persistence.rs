use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::StoreError;
use crate::models::Book;

/// Indentation used for the data file so hand-edited libraries stay readable.
const INDENT: &[u8] = b"    ";

/// Read the whole book list. A missing file is an empty library.
pub(crate) fn read_books(path: &Path) -> Result<Vec<Book>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StoreError::io(path, err)),
    };

    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the data file with a fresh serialization of `books`. The bytes go to
/// a sibling temp file first and are renamed into place.
pub(crate) fn write_books(path: &Path, books: &[Book]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }

    let content =
        to_pretty_json(books).map_err(|err| StoreError::io(path, std::io::Error::other(err)))?;

    let tmp = temp_path(path);
    if let Err(err) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(&tmp, err));
    }
    if let Err(err) = fs::rename(&tmp, path) {
        // The previous file, if any, is untouched; drop the stray copy.
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, err));
    }
    Ok(())
}

fn to_pretty_json(books: &[Book]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    books.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "library".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Book> {
        vec![
            Book::new("The Hobbit", "J.R.R. Tolkien", "1937", "Fantasy", true),
            Book::new("Emma", "Jane Austen", "1815", "Classic", false),
        ]
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let books = read_books(&dir.path().join("absent.json")).unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        write_books(&path, &sample()).unwrap();
        assert_eq!(read_books(&path).unwrap(), sample());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("library.json");
        write_books(&path, &sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        write_books(&path, &sample()).unwrap();
        write_books(&path, &sample()[..1]).unwrap();
        assert_eq!(read_books(&path).unwrap(), sample()[..1].to_vec());
    }

    #[test]
    fn file_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        write_books(&path, &sample()[..1]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n        \"title\": \"The Hobbit\""));
        assert!(content.contains("\"read\": true"));
    }

    #[test]
    fn reads_files_written_by_hand() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(
            &path,
            r#"[{"title": "Dune", "author": "Frank Herbert", "year": "1965", "genre": "Sci-Fi", "read": false}]"#,
        )
        .unwrap();
        let books = read_books(&path).unwrap();
        assert_eq!(
            books,
            vec![Book::new("Dune", "Frank Herbert", "1965", "Sci-Fi", false)]
        );
    }

    #[test]
    fn failed_rename_is_io_error_and_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::create_dir(&path).unwrap();

        let err = write_books(&path, &sample()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "got {err:?}");
        assert!(!temp_path(&path).exists());
        assert!(path.is_dir());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_books(&path), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn record_missing_a_field_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, r#"[{"title": "Dune", "author": "Frank Herbert"}]"#).unwrap();
        assert!(matches!(read_books(&path), Err(StoreError::Parse { .. })));
    }
}
