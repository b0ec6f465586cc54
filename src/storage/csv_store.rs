use std::{
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info};

use super::CounterScope;
use crate::{
    errors::{IntakeError, Result},
    intake::{CaseId, FieldValues, FlatRecord},
};

/// Append-only CSV file with a fixed header row.
///
/// Appends, and id allocation followed by an append, are serialised through
/// one lock so two submissions in the same process never share an id.
pub struct FlatStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FlatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows, header excluded. A missing file holds zero rows;
    /// any other read or parse failure is returned.
    pub fn row_count(&self) -> Result<usize> {
        self.count_rows(|_| true)
    }

    /// Rows whose first column is a case id issued in `year`.
    pub fn row_count_for_year(&self, year: i32) -> Result<usize> {
        self.count_rows(|record| {
            record
                .get(0)
                .and_then(|id| id.parse::<CaseId>().ok())
                .is_some_and(|id| id.year() == year)
        })
    }

    pub fn next_case_id(&self, year: i32, scope: CounterScope) -> Result<CaseId> {
        let count = match scope {
            CounterScope::Store => self.row_count()?,
            CounterScope::Year => self.row_count_for_year(year)?,
        };
        let sequence = u32::try_from(count + 1)
            .map_err(|_| IntakeError::StorageError("case counter overflow".into()))?;
        Ok(CaseId::new(year, sequence))
    }

    pub fn append<R: FlatRecord>(&self, record: &R) -> Result<()> {
        self.append_mapping(R::COLUMNS, &record.to_map())
    }

    /// Allocates the next case id, builds the record with it and appends it
    /// while holding the write lock.
    pub fn append_numbered<R, F>(&self, year: i32, scope: CounterScope, build: F) -> Result<R>
    where
        R: FlatRecord,
        F: FnOnce(CaseId) -> R,
    {
        let _guard = self.lock()?;
        let case_id = self.next_case_id(year, scope)?;
        let record = build(case_id);
        self.write_row(R::COLUMNS, &record.to_map())?;
        info!(%case_id, path = %self.path.display(), "intake record stored");
        Ok(record)
    }

    /// Appends `mapping` filtered to `columns`; absent keys become empty cells.
    pub fn append_mapping(&self, columns: &[&str], mapping: &FieldValues) -> Result<()> {
        let _guard = self.lock()?;
        self.write_row(columns, mapping)?;
        info!(path = %self.path.display(), "record appended");
        Ok(())
    }

    /// Reads every row as a column → value mapping.
    pub fn read_rows(&self) -> Result<Vec<FieldValues>> {
        let Some(file) = self.open_existing()? else {
            return Ok(Vec::new());
        };
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(column, value)| (column.to_string(), value.to_string()))
                    .collect(),
            );
        }
        Ok(rows)
    }

    fn count_rows(&self, keep: impl Fn(&StringRecord) -> bool) -> Result<usize> {
        let Some(file) = self.open_existing()? else {
            return Ok(0);
        };
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let mut count = 0;
        for record in reader.records() {
            if keep(&record?) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn open_existing(&self) -> Result<Option<File>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file not found, treating as empty");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_row(&self, columns: &[&str], mapping: &FieldValues) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // An empty file gets a header too, otherwise its first row would be read as one.
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == ErrorKind::NotFound => true,
            Err(err) => return Err(err.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(columns)?;
        }
        writer.write_record(
            columns
                .iter()
                .map(|column| mapping.get(*column).map(String::as_str).unwrap_or("")),
        )?;
        writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| IntakeError::StorageError("store lock poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Note(&'static str);

    impl FlatRecord for Note {
        const COLUMNS: &'static [&'static str] = &["id_caso", "texto"];

        fn to_map(&self) -> FieldValues {
            let mut map = FieldValues::new();
            map.insert("texto".into(), self.0.into());
            map.insert("ignorado".into(), "fuera del esquema".into());
            map
        }
    }

    #[test]
    fn missing_store_counts_zero() {
        let dir = tempdir().unwrap();
        let store = FlatStore::new(dir.path().join("nada.csv"));
        assert_eq!(store.row_count().unwrap(), 0);
        assert_eq!(
            store.next_case_id(2025, CounterScope::Store).unwrap().to_string(),
            "PS-2025-0001"
        );
        assert!(store.read_rows().unwrap().is_empty());
    }

    #[test]
    fn header_is_written_once_and_unknown_keys_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notas.csv");
        let store = FlatStore::new(&path);
        store.append(&Note("uno")).unwrap();
        store.append(&Note("dos, con coma")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "id_caso,texto\n,uno\n,\"dos, con coma\"\n");
        assert_eq!(store.row_count().unwrap(), 2);
    }

    #[test]
    fn empty_file_receives_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vacio.csv");
        File::create(&path).unwrap();
        let store = FlatStore::new(&path);
        store.append(&Note("uno")).unwrap();
        assert_eq!(store.row_count().unwrap(), 1);
    }
}
