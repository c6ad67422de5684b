use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::{StorageError, ensure_parent};

/// A row type with a fixed column schema
pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    /// One value per header column, unescaped
    fn fields(&self) -> Vec<String>;
}

/// Append-only CSV file of `R` rows
#[derive(Debug, Clone)]
pub struct CsvLog<R> {
    path: PathBuf,
    _record: PhantomData<fn(&R)>,
}

impl<R: CsvRecord> CsvLog<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _record: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records`, writing the header first if the file is new or empty
    pub fn append(&self, records: &[R]) -> Result<usize, StorageError> {
        ensure_parent(&self.path)?;
        let io_err = || StorageError::io(&self.path);

        let file =
            OpenOptions::new().create(true).append(true).open(&self.path).map_err(io_err())?;
        let is_empty = file.metadata().map_err(io_err())?.len() == 0;

        let mut writer = BufWriter::new(file);
        if is_empty {
            write_row(&mut writer, R::HEADER.iter().copied()).map_err(io_err())?;
        }
        for record in records {
            let fields = record.fields();
            write_row(&mut writer, fields.iter().map(String::as_str)).map_err(io_err())?;
        }
        writer.flush().map_err(io_err())?;

        Ok(records.len())
    }
}

fn write_row<'a>(
    writer: &mut impl Write,
    fields: impl Iterator<Item = &'a str>,
) -> std::io::Result<()> {
    let line = fields.map(escape).collect::<Vec<_>>().join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

/// Quote a field when it holds a separator, a quote or a line break
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, u32);

    impl CsvRecord for Row {
        const HEADER: &'static [&'static str] = &["name", "value"];

        fn fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvLog::<Row>::new(dir.path().join("nested/log.csv"));

        log.append(&[Row("Google", 1)]).unwrap();
        log.append(&[Row("Quad9, secondary", 2), Row("OpenDNS", 3)]).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            text,
            "name,value\r\nGoogle,1\r\n\"Quad9, secondary\",2\r\nOpenDNS,3\r\n"
        );
    }

    #[test]
    fn test_header_added_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "").unwrap();

        CsvLog::<Row>::new(&path).append(&[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name,value\r\n");
    }
}
