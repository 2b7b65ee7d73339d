//! Typed rows for every table the harvester writes
//!
//! Each struct maps one-to-one onto a durable table. Field names are English,
//! while the serialized column names keep the shape the downstream reporting
//! layer already queries.

mod entities;
mod relations;
mod score;

pub use entities::{Club, Coach, Location, Match, Official, Player, Referee, Stadium};
pub use relations::{CoachAssignment, MatchEvent, Participation, RefereeAssignment};
pub use score::Score;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Surrogate identifier, sequential per entity kind
pub type Id = u32;

/// The durable tables, in flush order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Location,
    Club,
    Stadium,
    Player,
    Coach,
    Referee,
    Match,
    Participation,
    CoachAssignment,
    RefereeAssignment,
    Event,
}

impl Table {
    /// All tables in flush order (referenced tables before referencing ones)
    pub const ALL: [Table; 11] = [
        Table::Location,
        Table::Club,
        Table::Stadium,
        Table::Player,
        Table::Coach,
        Table::Referee,
        Table::Match,
        Table::Participation,
        Table::CoachAssignment,
        Table::RefereeAssignment,
        Table::Event,
    ];

    /// Table name as used for the CSV file stem and the SQL table
    pub fn name(&self) -> &'static str {
        match self {
            Self::Location => "locais",
            Self::Club => "clubes",
            Self::Stadium => "estadios",
            Self::Player => "jogadores",
            Self::Coach => "treinadores",
            Self::Referee => "arbitros",
            Self::Match => "partidas",
            Self::Participation => "jogadores_em_partida",
            Self::CoachAssignment => "treinadores_em_partida",
            Self::RefereeAssignment => "arbitros_em_partida",
            Self::Event => "eventos_partida",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds of entity that carry a surrogate ID and a content key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Location,
    Club,
    Stadium,
    Player,
    Coach,
    Referee,
    Match,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Club => "club",
            Self::Stadium => "stadium",
            Self::Player => "player",
            Self::Coach => "coach",
            Self::Referee => "referee",
            Self::Match => "match",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized attribute tuple deciding whether two records are the same entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    /// Builds a key from normalized parts joined with `|`
    pub fn new(parts: &[&str]) -> Self {
        let normalized: Vec<String> = parts.iter().map(|p| normalize_text(p)).collect();
        Self(normalized.join("|"))
    }

    /// Builds the `city_state` key used for locations
    pub fn location(city: &str, state: &str) -> Self {
        Self(format!("{}_{}", normalize_text(city), normalize_text(state)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims, collapses inner whitespace and lowercases
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A row of one durable table
pub trait TableRow: Serialize + DeserializeOwned + Clone + fmt::Debug {
    const TABLE: Table;

    /// Field tuple that suppresses exact-duplicate rows at persistence time
    fn dedup_key(&self) -> String;
}

/// A table row that is an entity with a surrogate ID and a content key
pub trait Keyed: TableRow + Into<PendingRow> {
    const KIND: EntityKind;

    fn id(&self) -> Id;

    fn set_id(&mut self, id: Id);

    fn content_key(&self) -> ContentKey;

    /// Key of the same record as seen before its location was known
    fn fallback_key(&self) -> Option<ContentKey> {
        None
    }

    /// Human-readable label; an empty label means the record is unusable
    fn label(&self) -> &str;
}

/// A row queued for persistence, waiting for the next flush
#[derive(Debug, Clone)]
pub enum PendingRow {
    Location(Location),
    Club(Club),
    Stadium(Stadium),
    Player(Player),
    Coach(Coach),
    Referee(Referee),
    Match(Match),
    Participation(Participation),
    CoachAssignment(CoachAssignment),
    RefereeAssignment(RefereeAssignment),
    Event(MatchEvent),
}

impl PendingRow {
    pub fn table(&self) -> Table {
        match self {
            Self::Location(_) => Table::Location,
            Self::Club(_) => Table::Club,
            Self::Stadium(_) => Table::Stadium,
            Self::Player(_) => Table::Player,
            Self::Coach(_) => Table::Coach,
            Self::Referee(_) => Table::Referee,
            Self::Match(_) => Table::Match,
            Self::Participation(_) => Table::Participation,
            Self::CoachAssignment(_) => Table::CoachAssignment,
            Self::RefereeAssignment(_) => Table::RefereeAssignment,
            Self::Event(_) => Table::Event,
        }
    }
}

macro_rules! pending_from {
    ($($variant:ident => $row:ty),* $(,)?) => {
        $(
            impl From<$row> for PendingRow {
                fn from(row: $row) -> Self {
                    PendingRow::$variant(row)
                }
            }
        )*
    };
}

pending_from! {
    Location => Location,
    Club => Club,
    Stadium => Stadium,
    Player => Player,
    Coach => Coach,
    Referee => Referee,
    Match => Match,
    Participation => Participation,
    CoachAssignment => CoachAssignment,
    RefereeAssignment => RefereeAssignment,
    Event => MatchEvent,
}

/// Serializes an optional ID the same way in every key
pub(crate) fn id_part(id: Option<Id>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}
