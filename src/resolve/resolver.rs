use super::{KindRegistry, LocationResolver, Resolved};
use crate::crawler::Fetcher;
use crate::extract::{self, records, Attribute, AttributeMap};
use crate::model::{EntityKind, Id, Keyed, Match, PendingRow};
use crate::storage::Snapshot;
use std::collections::BTreeMap;
use std::mem;

/// New / reused / failed counts for one entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub created: u64,
    pub reused: u64,
    pub failed: u64,
}

/// Resolution outcomes since the last flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    counts: BTreeMap<EntityKind, KindCounts>,
}

impl ResolutionStats {
    fn entry(&mut self, kind: EntityKind) -> &mut KindCounts {
        self.counts.entry(kind).or_default()
    }

    pub fn record(&mut self, kind: EntityKind, resolved: Resolved) {
        let counts = self.entry(kind);
        if resolved.is_new() {
            counts.created += 1;
        } else {
            counts.reused += 1;
        }
    }

    pub fn record_failure(&mut self, kind: EntityKind) {
        self.entry(kind).failed += 1;
    }

    pub fn get(&self, kind: EntityKind) -> KindCounts {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, KindCounts)> + '_ {
        self.counts.iter().map(|(kind, counts)| (*kind, *counts))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Maps entity references to stable surrogate IDs
///
/// Holds one registry per kind plus the queue of rows created since the
/// last flush. Each `resolve_*` call checks the in-run address cache first,
/// then fetches and extracts the entity page, and finally looks the content
/// key up before minting a new ID. Any failure yields `None`, never an
/// error.
#[derive(Debug)]
pub struct Resolver {
    locations: LocationResolver,
    clubs: KindRegistry,
    stadiums: KindRegistry,
    players: KindRegistry,
    coaches: KindRegistry,
    referees: KindRegistry,
    matches: KindRegistry,
    pending: Vec<PendingRow>,
    stats: ResolutionStats,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_rows<R: Keyed>(registry: &mut KindRegistry, rows: &[R]) {
    for row in rows {
        registry.seed(row.content_key(), row.id());
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            locations: LocationResolver::new(),
            clubs: KindRegistry::new(),
            stadiums: KindRegistry::new(),
            players: KindRegistry::new(),
            coaches: KindRegistry::new(),
            referees: KindRegistry::new(),
            matches: KindRegistry::new(),
            pending: Vec::new(),
            stats: ResolutionStats::default(),
        }
    }

    /// Builds a resolver whose registries hold every persisted entity
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut resolver = Self::new();

        for location in &snapshot.locations {
            resolver.locations.seed(location);
        }
        seed_rows(&mut resolver.clubs, &snapshot.clubs);
        seed_rows(&mut resolver.stadiums, &snapshot.stadiums);
        seed_rows(&mut resolver.players, &snapshot.players);
        seed_rows(&mut resolver.coaches, &snapshot.coaches);
        seed_rows(&mut resolver.referees, &snapshot.referees);
        seed_rows(&mut resolver.matches, &snapshot.matches);

        tracing::debug!(
            "Registries seeded: {} locations, {} clubs, {} stadiums, {} players, {} coaches, {} referees, {} matches",
            resolver.locations.len(),
            resolver.clubs.len(),
            resolver.stadiums.len(),
            resolver.players.len(),
            resolver.coaches.len(),
            resolver.referees.len(),
            resolver.matches.len()
        );

        resolver
    }

    fn registry_mut(&mut self, kind: EntityKind) -> &mut KindRegistry {
        match kind {
            EntityKind::Club => &mut self.clubs,
            EntityKind::Stadium => &mut self.stadiums,
            EntityKind::Player => &mut self.players,
            EntityKind::Coach => &mut self.coaches,
            EntityKind::Referee => &mut self.referees,
            EntityKind::Match => &mut self.matches,
            EntityKind::Location => self.locations.registry_mut(),
        }
    }

    fn cached(&mut self, kind: EntityKind, address: &str) -> Option<Id> {
        let id = self.registry_mut(kind).cached(address)?;
        tracing::debug!("Cached {} #{} for {}", kind, id, address);
        self.stats.record(kind, Resolved::Existing(id));
        Some(id)
    }

    /// Fetches an entity page and extracts its attributes
    async fn attributes(
        &mut self,
        fetcher: &mut Fetcher,
        address: &str,
        kind: EntityKind,
    ) -> Option<AttributeMap> {
        let document = match fetcher.retrieve(address).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Could not resolve {} at {}: {}", kind, address, e);
                self.stats.record_failure(kind);
                return None;
            }
        };

        match extract::extract(&document.body, kind) {
            Ok(attributes) => Some(attributes),
            Err(e) => {
                tracing::warn!("No {} data at {}: {}", kind, address, e);
                self.stats.record_failure(kind);
                None
            }
        }
    }

    /// Resolves "City (State)" text, queueing a new Location if needed
    pub fn resolve_location(&mut self, text: &str) -> Option<Id> {
        let resolved = self.locations.resolve(text, &mut self.pending)?;
        self.stats.record(EntityKind::Location, resolved);
        Some(resolved.id())
    }

    pub async fn resolve_club(&mut self, fetcher: &mut Fetcher, address: &str) -> Option<Id> {
        if let Some(id) = self.cached(EntityKind::Club, address) {
            return Some(id);
        }
        let attributes = self.attributes(fetcher, address, EntityKind::Club).await?;
        let location_id = self.resolve_location(&attributes.text(Attribute::City));
        self.admit(address, records::club(&attributes, location_id))
    }

    pub async fn resolve_stadium(&mut self, fetcher: &mut Fetcher, address: &str) -> Option<Id> {
        if let Some(id) = self.cached(EntityKind::Stadium, address) {
            return Some(id);
        }
        let attributes = self.attributes(fetcher, address, EntityKind::Stadium).await?;
        let location_id = self.resolve_location(&attributes.text(Attribute::City));
        self.admit(address, records::stadium(&attributes, location_id))
    }

    pub async fn resolve_player(&mut self, fetcher: &mut Fetcher, address: &str) -> Option<Id> {
        if let Some(id) = self.cached(EntityKind::Player, address) {
            return Some(id);
        }
        let attributes = self.attributes(fetcher, address, EntityKind::Player).await?;
        self.admit(address, records::player(&attributes))
    }

    pub async fn resolve_coach(&mut self, fetcher: &mut Fetcher, address: &str) -> Option<Id> {
        if let Some(id) = self.cached(EntityKind::Coach, address) {
            return Some(id);
        }
        let attributes = self.attributes(fetcher, address, EntityKind::Coach).await?;
        self.admit(address, records::coach(&attributes))
    }

    pub async fn resolve_referee(&mut self, fetcher: &mut Fetcher, address: &str) -> Option<Id> {
        if let Some(id) = self.cached(EntityKind::Referee, address) {
            return Some(id);
        }
        let attributes = self.attributes(fetcher, address, EntityKind::Referee).await?;
        self.admit(address, records::referee(&attributes))
    }

    /// Registers an extracted record under its content key
    ///
    /// A record with an empty label is a resolution failure. A new record
    /// gets the next ID and is queued; a known key returns the existing ID
    /// and the record is dropped.
    pub fn admit<R: Keyed>(&mut self, address: &str, mut record: R) -> Option<Id> {
        let kind = R::KIND;
        if record.label().trim().is_empty() {
            tracing::warn!("Extracted {} at {} has no name; left unresolved", kind, address);
            self.stats.record_failure(kind);
            return None;
        }

        let registry = self.registry_mut(kind);
        let key = record.content_key();
        let resolved = match registry.lookup(&key) {
            Some(id) => Resolved::Existing(id),
            None => match record.fallback_key().and_then(|k| registry.lookup(&k)) {
                Some(id) => Resolved::Existing(id),
                None => registry.resolve(key),
            },
        };
        registry.remember(address, resolved.id());
        self.stats.record(kind, resolved);

        match resolved {
            Resolved::New(id) => {
                tracing::info!("New {} #{}: {}", kind, id, record.label());
                record.set_id(id);
                self.pending.push(record.into());
            }
            Resolved::Existing(id) => {
                tracing::debug!("Reusing {} #{}: {}", kind, id, record.label());
            }
        }

        Some(resolved.id())
    }

    /// Resolves a fixture's ID from its date and both club IDs
    pub fn resolve_match(&mut self, date: &str, home_id: Id, away_id: Id) -> Resolved {
        let resolved = self.matches.resolve(Match::key_for(date, home_id, away_id));
        self.stats.record(EntityKind::Match, resolved);
        resolved
    }

    /// Queues a row produced outside the resolver (matches, links, events)
    pub fn queue(&mut self, row: impl Into<PendingRow>) {
        self.pending.push(row.into());
    }

    /// Drains the rows waiting for the next flush
    pub fn take_pending(&mut self) -> Vec<PendingRow> {
        mem::take(&mut self.pending)
    }

    pub fn take_stats(&mut self) -> ResolutionStats {
        mem::take(&mut self.stats)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
