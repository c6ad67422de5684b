use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{StorageError, write_atomic};

/// Directory of `<YYYY-MM-DD>.json` files, each a growing JSON array
#[derive(Debug, Clone)]
pub struct DailyLog {
    dir: PathBuf,
}

impl DailyLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Number of entries already stored for `date`.
    ///
    /// Fails the same way [`DailyLog::append`] would on an unreadable or
    /// corrupt file, so callers can check before writing anywhere else.
    pub fn check(&self, date: NaiveDate) -> Result<usize, StorageError> {
        Ok(read_entries(&self.path_for(date))?.len())
    }

    /// Merge `records` into the file for `date`, returning the new length.
    ///
    /// Existing entries are kept as they are. A file that is not a JSON array
    /// is left untouched and reported as [`StorageError::Corrupt`].
    pub fn append<T: Serialize>(&self, date: NaiveDate, records: &[T]) -> Result<usize, StorageError> {
        let path = self.path_for(date);
        let mut entries = read_entries(&path)?;

        for record in records {
            entries.push(serde_json::to_value(record).map_err(StorageError::json(&path))?);
        }

        let bytes = serde_json::to_vec_pretty(&entries).map_err(StorageError::json(&path))?;
        write_atomic(&path, &bytes)?;

        Ok(entries.len())
    }
}

fn read_entries(path: &Path) -> Result<Vec<Value>, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::Io { path: path.to_path_buf(), source: e }),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str(&raw).map_err(StorageError::json(path))? {
        Value::Array(entries) => Ok(entries),
        _ => Err(StorageError::Corrupt { path: path.to_path_buf() }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_append_grows_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path().join("logs"));

        assert_eq!(log.append(day(), &[json!({"run": 1})]).unwrap(), 1);
        assert_eq!(log.append(day(), &[json!({"run": 2}), json!({"run": 3})]).unwrap(), 3);

        let path = dir.path().join("logs/2026-10-17.json");
        let stored: Vec<Value> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(stored, vec![json!({"run": 1}), json!({"run": 2}), json!({"run": 3})]);
    }

    #[test]
    fn test_dates_are_partitioned() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path());
        let next = day().succ_opt().unwrap();

        log.append(day(), &[json!(1)]).unwrap();
        assert_eq!(log.append(next, &[json!(2)]).unwrap(), 1);
        assert!(log.path_for(next).ends_with("2026-10-18.json"));
    }

    #[test]
    fn test_non_array_is_corrupt_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path());
        let path = log.path_for(day());
        fs::write(&path, r#"{"not": "an array"}"#).unwrap();

        let result = log.append(day(), &[json!(1)]);

        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"not": "an array"}"#);
    }

    #[test]
    fn test_check_reports_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path());

        assert_eq!(log.check(day()).unwrap(), 0);
        log.append(day(), &[json!(1), json!(2)]).unwrap();
        assert_eq!(log.check(day()).unwrap(), 2);

        fs::write(log.path_for(day()), "42").unwrap();
        assert!(matches!(log.check(day()), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path());
        fs::write(log.path_for(day()), "[{\"truncated\": ").unwrap();

        assert!(matches!(log.append(day(), &[json!(1)]), Err(StorageError::Json { .. })));
    }
}
