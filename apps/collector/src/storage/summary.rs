use std::path::Path;

use serde::Serialize;

use super::{StorageError, write_atomic};

/// Replace the summary document at `path` with pretty JSON
pub fn write_summary(path: &Path, summary: &impl Serialize) -> Result<(), StorageError> {
    let mut bytes = serde_json::to_vec_pretty(summary).map_err(StorageError::json(path))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_summary_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/summary.json");

        write_summary(&path, &json!({"total": 1})).unwrap();
        write_summary(&path, &json!({"total": 2})).unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored, json!({"total": 2}));
    }
}
