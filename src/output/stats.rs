//! Statistics from the durable store
//!
//! Row counts per table, as shown by `--stats`.

use crate::storage::{StorageResult, TableStore};
use crate::Table;

/// Row counts for every table, in flush order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatistics {
    pub counts: Vec<(Table, u64)>,
}

impl TableStatistics {
    pub fn get(&self, table: Table) -> u64 {
        self.counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(TableStatistics)` - Successfully counted every table
/// * `Err(StorageError)` - A table could not be read
pub fn load_statistics<S: TableStore>(store: &S) -> StorageResult<TableStatistics> {
    let mut counts = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        counts.push((table, store.count(table)?));
    }
    Ok(TableStatistics { counts })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &TableStatistics, checkpoint: Option<&str>) {
    println!("=== Ledger Statistics ===\n");

    println!("Rows by Table:");
    for (table, count) in &stats.counts {
        println!("  {:<24} {}", table.name(), count);
    }
    println!();
    println!("Total rows: {}", stats.total());

    match checkpoint {
        Some(address) => println!("Checkpoint: {}", address),
        None => println!("Checkpoint: none"),
    }
}
