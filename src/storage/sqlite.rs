//! SQLite storage implementation
//!
//! Rows travel through `serde_json` objects: serialized field names become
//! column names on insert, and column names become field names on load.

use crate::model::{Table, TableRow};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TableStore};
use chrono::Utc;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Number, Value as JsonValue};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database file and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn to_sql(value: JsonValue) -> StorageResult<SqlValue> {
    Ok(match value {
        JsonValue::Null => SqlValue::Null,
        JsonValue::Bool(b) => SqlValue::Integer(i64::from(b)),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            _ => return Err(StorageError::Serialization(format!("number out of range: {n}"))),
        },
        JsonValue::String(s) => SqlValue::Text(s),
        other => {
            return Err(StorageError::Serialization(format!(
                "nested value cannot be stored in a column: {other}"
            )))
        }
    })
}

fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            JsonValue::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn to_columns<R: TableRow>(row: &R) -> StorageResult<Map<String, JsonValue>> {
    match serde_json::to_value(row)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(StorageError::Serialization(format!(
            "{} row is not a record: {other}",
            R::TABLE
        ))),
    }
}

impl TableStore for SqliteStore {
    fn load<R: TableRow>(&self) -> StorageResult<Vec<R>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", R::TABLE.name()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::new();
            for (index, column) in columns.iter().enumerate() {
                object.insert(column.clone(), to_json(row.get_ref(index)?));
            }
            loaded.push(serde_json::from_value(JsonValue::Object(object))?);
        }

        Ok(loaded)
    }

    fn append<R: TableRow>(&mut self, rows: &[R]) -> StorageResult<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let columns: Vec<String> = to_columns(first)?.keys().cloned().collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE.name(),
            columns.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                let mut values = to_columns(row)?;
                let ordered = columns
                    .iter()
                    .map(|column| to_sql(values.remove(column).unwrap_or(JsonValue::Null)))
                    .collect::<StorageResult<Vec<_>>>()?;
                stmt.execute(params_from_iter(ordered))?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn read_checkpoint(&self) -> StorageResult<Option<String>> {
        let address = self
            .conn
            .query_row(
                "SELECT address FROM crawl_checkpoint WHERE id = 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(address.filter(|a| !a.trim().is_empty()))
    }

    fn write_checkpoint(&mut self, address: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_checkpoint (id, address, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET address = excluded.address, updated_at = excluded.updated_at",
            params![address, now],
        )?;
        Ok(())
    }

    fn count(&self, table: Table) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
