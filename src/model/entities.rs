use super::{id_part, ContentKey, EntityKind, Id, Keyed, Table, TableRow};
use serde::{Deserialize, Serialize};

/// A normalized place, derived from "City (State)" text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Id,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state: String,
    #[serde(rename = "estado")]
    pub state_name: String,
    #[serde(rename = "regiao")]
    pub region: String,
    #[serde(rename = "pais")]
    pub country: String,
}

impl TableRow for Location {
    const TABLE: Table = Table::Location;

    fn dedup_key(&self) -> String {
        self.id.to_string()
    }
}

impl Keyed for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn content_key(&self) -> ContentKey {
        ContentKey::location(&self.city, &self.state)
    }

    fn label(&self) -> &str {
        &self.city
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: Id,
    #[serde(rename = "clube")]
    pub name: String,
    #[serde(rename = "apelido")]
    pub nickname: String,
    #[serde(rename = "local_id")]
    pub location_id: Option<Id>,
    #[serde(rename = "fundacao")]
    pub founded: String,
    #[serde(rename = "ativo")]
    pub active: u8,
}

impl TableRow for Club {
    const TABLE: Table = Table::Club;

    fn dedup_key(&self) -> String {
        self.id.to_string()
    }
}

impl Keyed for Club {
    const KIND: EntityKind = EntityKind::Club;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn content_key(&self) -> ContentKey {
        ContentKey::new(&[&self.name, &id_part(self.location_id)])
    }

    fn fallback_key(&self) -> Option<ContentKey> {
        self.location_id.map(|_| ContentKey::new(&[&self.name, ""]))
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stadium {
    pub id: Id,
    #[serde(rename = "estadio")]
    pub name: String,
    #[serde(rename = "capacidade")]
    pub capacity: Option<u32>,
    #[serde(rename = "local_id")]
    pub location_id: Option<Id>,
    #[serde(rename = "inauguracao")]
    pub inaugurated: String,
    #[serde(rename = "ativo")]
    pub active: u8,
}

impl TableRow for Stadium {
    const TABLE: Table = Table::Stadium;

    fn dedup_key(&self) -> String {
        self.id.to_string()
    }
}

impl Keyed for Stadium {
    const KIND: EntityKind = EntityKind::Stadium;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn content_key(&self) -> ContentKey {
        ContentKey::new(&[&self.name, &id_part(self.location_id)])
    }

    fn fallback_key(&self) -> Option<ContentKey> {
        self.location_id.map(|_| ContentKey::new(&[&self.name, ""]))
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Id,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nascimento")]
    pub birth_date: String,
    #[serde(rename = "falecimento")]
    pub death_date: String,
    #[serde(rename = "nacionalidade")]
    pub nationality: String,
    #[serde(rename = "naturalidade")]
    pub birthplace: String,
    /// Centimetres
    #[serde(rename = "altura")]
    pub height: Option<u32>,
    /// Kilograms
    #[serde(rename = "peso")]
    pub weight: Option<u32>,
    #[serde(rename = "posicao")]
    pub position: String,
    #[serde(rename = "pe_preferido")]
    pub preferred_foot: String,
    #[serde(rename = "aposentado")]
    pub retired: u8,
}

impl TableRow for Player {
    const TABLE: Table = Table::Player;

    fn dedup_key(&self) -> String {
        self.id.to_string()
    }
}

impl Keyed for Player {
    const KIND: EntityKind = EntityKind::Player;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn content_key(&self) -> ContentKey {
        ContentKey::new(&[&self.name, &self.birth_date])
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Shared shape of the coach and referee tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Official {
    pub id: Id,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nascimento")]
    pub birth_date: String,
    #[serde(rename = "falecimento")]
    pub death_date: String,
    #[serde(rename = "nacionalidade")]
    pub nationality: String,
    #[serde(rename = "naturalidade")]
    pub birthplace: String,
    #[serde(rename = "situacao")]
    pub status: String,
}

impl Official {
    fn content_key(&self) -> ContentKey {
        ContentKey::new(&[&self.name, &self.birth_date])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coach(pub Official);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Referee(pub Official);

impl TableRow for Coach {
    const TABLE: Table = Table::Coach;

    fn dedup_key(&self) -> String {
        self.0.id.to_string()
    }
}

impl Keyed for Coach {
    const KIND: EntityKind = EntityKind::Coach;

    fn id(&self) -> Id {
        self.0.id
    }

    fn set_id(&mut self, id: Id) {
        self.0.id = id;
    }

    fn content_key(&self) -> ContentKey {
        self.0.content_key()
    }

    fn label(&self) -> &str {
        &self.0.name
    }
}

impl TableRow for Referee {
    const TABLE: Table = Table::Referee;

    fn dedup_key(&self) -> String {
        self.0.id.to_string()
    }
}

impl Keyed for Referee {
    const KIND: EntityKind = EntityKind::Referee;

    fn id(&self) -> Id {
        self.0.id
    }

    fn set_id(&mut self, id: Id) {
        self.0.id = id;
    }

    fn content_key(&self) -> ContentKey {
        self.0.content_key()
    }

    fn label(&self) -> &str {
        &self.0.name
    }
}

/// One fixture between two clubs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Id,
    #[serde(rename = "edicao_id")]
    pub edition_id: Id,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "fase")]
    pub phase: String,
    #[serde(rename = "rodada")]
    pub round: String,
    #[serde(rename = "estadio_id")]
    pub stadium_id: Option<Id>,
    #[serde(rename = "mandante_id")]
    pub home_id: Id,
    #[serde(rename = "visitante_id")]
    pub away_id: Id,
    #[serde(rename = "mandante_placar")]
    pub home_score: Option<u32>,
    #[serde(rename = "visitante_placar")]
    pub away_score: Option<u32>,
    /// Empty for a played match, otherwise the sentinel (`WO`, `ANU`, `IC`)
    #[serde(rename = "placar_status")]
    pub score_status: String,
    #[serde(rename = "mandante_penalti")]
    pub home_penalties: Option<u32>,
    #[serde(rename = "visitante_penalti")]
    pub away_penalties: Option<u32>,
    #[serde(rename = "prorrogacao")]
    pub extra_time: u8,
}

impl Match {
    /// Content key of a fixture: date plus both club IDs
    pub fn key_for(date: &str, home_id: Id, away_id: Id) -> ContentKey {
        ContentKey::new(&[date, &home_id.to_string(), &away_id.to_string()])
    }
}

impl TableRow for Match {
    const TABLE: Table = Table::Match;

    fn dedup_key(&self) -> String {
        self.id.to_string()
    }
}

impl Keyed for Match {
    const KIND: EntityKind = EntityKind::Match;

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn content_key(&self) -> ContentKey {
        Match::key_for(&self.date, self.home_id, self.away_id)
    }

    fn label(&self) -> &str {
        &self.date
    }
}
