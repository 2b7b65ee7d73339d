//! CSV table backend
//!
//! One `<table>.csv` file per table under a single directory, plus a
//! `checkpoint.txt` holding the crawl position.

use super::traits::{StorageResult, TableStore};
use crate::model::{Table, TableRow};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const CHECKPOINT_FILE: &str = "checkpoint.txt";

/// CSV storage backend
#[derive(Debug)]
pub struct CsvStore {
    directory: PathBuf,
}

impl CsvStore {
    /// Opens (creating if needed) a CSV table directory
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory holding the table files
    ///
    /// # Returns
    ///
    /// * `Ok(CsvStore)` - The directory exists and is usable
    /// * `Err(StorageError)` - The directory could not be created
    pub fn new(directory: &Path) -> StorageResult<Self> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.directory.join(format!("{}.csv", table.name()))
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.directory.join(CHECKPOINT_FILE)
    }
}

fn has_content(path: &Path) -> StorageResult<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl TableStore for CsvStore {
    fn load<R: TableRow>(&self) -> StorageResult<Vec<R>> {
        let path = self.table_path(R::TABLE);
        if !has_content(&path)? {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    fn append<R: TableRow>(&mut self, rows: &[R]) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let path = self.table_path(R::TABLE);
        let write_header = !has_content(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_checkpoint(&self) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.checkpoint_path()) {
            Ok(content) => {
                let address = content.trim();
                Ok((!address.is_empty()).then(|| address.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_checkpoint(&mut self, address: &str) -> StorageResult<()> {
        // Write then rename so an interrupted write never truncates the checkpoint
        let path = self.checkpoint_path();
        let staging = path.with_extension("txt.tmp");
        fs::write(&staging, address)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn count(&self, table: Table) -> StorageResult<u64> {
        let path = self.table_path(table);
        if !has_content(&path)? {
            return Ok(0);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;
        let mut count = 0;
        for record in reader.records() {
            record?;
            count += 1;
        }
        Ok(count)
    }
}
