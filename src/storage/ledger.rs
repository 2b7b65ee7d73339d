//! Checkpoint and persistence manager
//!
//! The [`Ledger`] wraps a [`TableStore`] with row-level idempotence: every
//! persisted row's dedup key is loaded at startup, and a flush only appends
//! rows whose key has not been seen.

use super::traits::{StorageResult, TableStore};
use crate::model::{
    Club, Coach, CoachAssignment, Id, Location, Match, MatchEvent, Participation, PendingRow,
    Player, Referee, RefereeAssignment, Stadium, Table, TableRow,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Persisted entity rows, used to seed the resolver's registries
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub locations: Vec<Location>,
    pub clubs: Vec<Club>,
    pub stadiums: Vec<Stadium>,
    pub players: Vec<Player>,
    pub coaches: Vec<Coach>,
    pub referees: Vec<Referee>,
    pub matches: Vec<Match>,
}

/// Rows written and duplicates dropped by one flush, per table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub written: BTreeMap<Table, usize>,
    pub dropped: BTreeMap<Table, usize>,
}

impl FlushReport {
    pub fn written(&self, table: Table) -> usize {
        self.written.get(&table).copied().unwrap_or_default()
    }

    pub fn dropped(&self, table: Table) -> usize {
        self.dropped.get(&table).copied().unwrap_or_default()
    }

    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }
}

/// Pending rows split by table
#[derive(Default)]
struct Batch {
    locations: Vec<Location>,
    clubs: Vec<Club>,
    stadiums: Vec<Stadium>,
    players: Vec<Player>,
    coaches: Vec<Coach>,
    referees: Vec<Referee>,
    matches: Vec<Match>,
    participations: Vec<Participation>,
    coach_assignments: Vec<CoachAssignment>,
    referee_assignments: Vec<RefereeAssignment>,
    events: Vec<MatchEvent>,
}

impl Batch {
    fn split(rows: Vec<PendingRow>) -> Self {
        let mut batch = Self::default();
        for row in rows {
            match row {
                PendingRow::Location(r) => batch.locations.push(r),
                PendingRow::Club(r) => batch.clubs.push(r),
                PendingRow::Stadium(r) => batch.stadiums.push(r),
                PendingRow::Player(r) => batch.players.push(r),
                PendingRow::Coach(r) => batch.coaches.push(r),
                PendingRow::Referee(r) => batch.referees.push(r),
                PendingRow::Match(r) => batch.matches.push(r),
                PendingRow::Participation(r) => batch.participations.push(r),
                PendingRow::CoachAssignment(r) => batch.coach_assignments.push(r),
                PendingRow::RefereeAssignment(r) => batch.referee_assignments.push(r),
                PendingRow::Event(r) => batch.events.push(r),
            }
        }
        batch
    }
}

/// Append-only, duplicate-free writer over a table store
pub struct Ledger<S: TableStore> {
    store: S,
    seen: HashMap<Table, HashSet<String>>,
    next_event_id: Id,
}

impl<S: TableStore> Ledger<S> {
    /// Opens a ledger, rebuilding every table's dedup-key set
    ///
    /// # Returns
    ///
    /// * `Ok((Ledger, Snapshot))` - The ledger plus the persisted entities
    /// * `Err(StorageError)` - A table could not be read
    pub fn open(store: S) -> StorageResult<(Self, Snapshot)> {
        let mut ledger = Self {
            store,
            seen: HashMap::new(),
            next_event_id: 1,
        };

        let snapshot = Snapshot {
            locations: ledger.load_seen()?,
            clubs: ledger.load_seen()?,
            stadiums: ledger.load_seen()?,
            players: ledger.load_seen()?,
            coaches: ledger.load_seen()?,
            referees: ledger.load_seen()?,
            matches: ledger.load_seen()?,
        };
        ledger.load_seen::<Participation>()?;
        ledger.load_seen::<CoachAssignment>()?;
        ledger.load_seen::<RefereeAssignment>()?;
        let events: Vec<MatchEvent> = ledger.load_seen()?;
        ledger.next_event_id = events.iter().map(|e| e.id).max().map_or(1, |max| max + 1);

        tracing::info!(
            "Ledger opened: {} clubs, {} players, {} matches, {} events on record",
            snapshot.clubs.len(),
            snapshot.players.len(),
            snapshot.matches.len(),
            events.len()
        );

        Ok((ledger, snapshot))
    }

    fn load_seen<R: TableRow>(&mut self) -> StorageResult<Vec<R>> {
        let rows: Vec<R> = self.store.load()?;
        let keys = self.seen.entry(R::TABLE).or_default();
        keys.extend(rows.iter().map(TableRow::dedup_key));
        tracing::debug!("Loaded {} rows from {}", rows.len(), R::TABLE);
        Ok(rows)
    }

    /// Keeps rows whose dedup key is neither persisted nor earlier in the batch
    fn unseen<R: TableRow>(&self, rows: Vec<R>) -> (Vec<R>, Vec<String>, usize) {
        let persisted = self.seen.get(&R::TABLE);
        let mut batch_keys = HashSet::new();
        let mut keys = Vec::new();
        let mut fresh = Vec::new();
        let mut dropped = 0;

        for row in rows {
            let key = row.dedup_key();
            let known = persisted.is_some_and(|seen| seen.contains(&key));
            if known || !batch_keys.insert(key.clone()) {
                dropped += 1;
                continue;
            }
            keys.push(key);
            fresh.push(row);
        }

        (fresh, keys, dropped)
    }

    fn write<R: TableRow>(&mut self, rows: Vec<R>, report: &mut FlushReport) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let (fresh, keys, dropped) = self.unseen(rows);
        self.store.append(&fresh)?;
        self.seen.entry(R::TABLE).or_default().extend(keys);

        if dropped > 0 {
            tracing::debug!("Dropped {} duplicate rows for {}", dropped, R::TABLE);
            report.dropped.insert(R::TABLE, dropped);
        }
        if !fresh.is_empty() {
            report.written.insert(R::TABLE, fresh.len());
        }
        Ok(())
    }

    /// Appends every previously unseen row, referenced tables first
    ///
    /// Duplicate rows are dropped silently. Event IDs are assigned here,
    /// only to events that survive deduplication. Any store failure is
    /// returned and must end the run.
    pub fn flush(&mut self, rows: Vec<PendingRow>) -> StorageResult<FlushReport> {
        let batch = Batch::split(rows);
        let mut report = FlushReport::default();

        self.write(batch.locations, &mut report)?;
        self.write(batch.clubs, &mut report)?;
        self.write(batch.stadiums, &mut report)?;
        self.write(batch.players, &mut report)?;
        self.write(batch.coaches, &mut report)?;
        self.write(batch.referees, &mut report)?;
        self.write(batch.matches, &mut report)?;
        self.write(batch.participations, &mut report)?;
        self.write(batch.coach_assignments, &mut report)?;
        self.write(batch.referee_assignments, &mut report)?;

        let (mut events, keys, dropped) = self.unseen(batch.events);
        for event in &mut events {
            event.id = self.next_event_id;
            self.next_event_id += 1;
        }
        self.store.append(&events)?;
        self.seen.entry(Table::Event).or_default().extend(keys);
        if dropped > 0 {
            report.dropped.insert(Table::Event, dropped);
        }
        if !events.is_empty() {
            report.written.insert(Table::Event, events.len());
        }

        Ok(report)
    }

    pub fn checkpoint(&self) -> StorageResult<Option<String>> {
        self.store.read_checkpoint()
    }

    /// Records a listing row as fully processed
    pub fn advance_checkpoint(&mut self, address: &str) -> StorageResult<()> {
        self.store.write_checkpoint(address)?;
        tracing::debug!("Checkpoint advanced to {}", address);
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
