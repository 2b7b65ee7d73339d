use super::{Id, Table, TableRow};
use crate::events::{EventType, GoalQualifier, Minute};
use serde::{Deserialize, Serialize};

/// A player appearing for a club in one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    #[serde(rename = "partida_id")]
    pub match_id: Id,
    #[serde(rename = "jogador_id")]
    pub player_id: Id,
    #[serde(rename = "clube_id")]
    pub club_id: Id,
    /// 1 for the starting line-up, 0 for substitutes
    #[serde(rename = "titular")]
    pub starter: u8,
    #[serde(rename = "posicao_jogada")]
    pub position_played: String,
    #[serde(rename = "numero_camisa")]
    pub shirt_number: Option<u32>,
}

impl TableRow for Participation {
    const TABLE: Table = Table::Participation;

    fn dedup_key(&self) -> String {
        format!("{}|{}|{}", self.match_id, self.player_id, self.club_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachAssignment {
    #[serde(rename = "partida_id")]
    pub match_id: Id,
    #[serde(rename = "treinador_id")]
    pub coach_id: Option<Id>,
    #[serde(rename = "clube_id")]
    pub club_id: Id,
    #[serde(rename = "titular")]
    pub confirmed: u8,
}

impl TableRow for CoachAssignment {
    const TABLE: Table = Table::CoachAssignment;

    // One assignment per side
    fn dedup_key(&self) -> String {
        format!("{}|{}", self.match_id, self.club_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeAssignment {
    #[serde(rename = "partida_id")]
    pub match_id: Id,
    #[serde(rename = "arbitro_id")]
    pub referee_id: Option<Id>,
}

impl TableRow for RefereeAssignment {
    const TABLE: Table = Table::RefereeAssignment;

    fn dedup_key(&self) -> String {
        self.match_id.to_string()
    }
}

/// A timed event (goal, card, substitution) credited to a player
///
/// `id` stays 0 until the row survives deduplication at flush time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: Id,
    #[serde(rename = "partida_id")]
    pub match_id: Id,
    #[serde(rename = "jogador_id")]
    pub player_id: Id,
    #[serde(rename = "clube_id")]
    pub club_id: Id,
    #[serde(rename = "tipo_evento")]
    pub event_type: EventType,
    #[serde(rename = "tipo_gol")]
    pub goal_qualifier: Option<GoalQualifier>,
    #[serde(rename = "minuto")]
    pub minute: Option<Minute>,
}

impl TableRow for MatchEvent {
    const TABLE: Table = Table::Event;

    fn dedup_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.match_id,
            self.player_id,
            self.event_type.label(),
            self.goal_qualifier.map(|q| q.label()).unwrap_or_default(),
            self.minute.map(|m| m.to_string()).unwrap_or_default()
        )
    }
}
