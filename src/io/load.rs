//! Loading JSON input documents.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Load a JSON document from disk.
///
/// The document is returned untyped; the converters in
/// [`crate::validate`] turn it into matrices, masks or class names.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_load_matrix_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[1, 2], [3, 4]]").unwrap();

        let value = load_json(file.path()).unwrap();
        assert_eq!(value, serde_json::json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[[1, 2], [3").unwrap();

        let err = load_json(file.path()).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_missing_file() {
        let err = load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
