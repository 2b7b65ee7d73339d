//! Match event parsing
//!
//! Turns the annotation block next to a player's name (an icon followed by
//! minute text, repeated) into structured timed events:
//! - `classify`: icon heuristics (title, class, glyph) → [`EventType`]
//! - `minutes`: the `digits[+digits]` minute grammar with qualifiers
//! - `machine`: the scan/classify/collect/emit state machine

mod classify;
mod machine;
mod minutes;

pub use classify::classify_icon;
pub use machine::{parse_annotations, EventParser};
pub use minutes::{parse_markers, MinuteMarker};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of timed event a player annotation can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Gol")]
    Goal,
    #[serde(rename = "Assistência")]
    Assist,
    #[serde(rename = "Cartão Amarelo")]
    YellowCard,
    #[serde(rename = "Segundo Amarelo")]
    SecondYellow,
    #[serde(rename = "Cartão Vermelho")]
    RedCard,
    #[serde(rename = "Entrou")]
    SubstitutionIn,
    #[serde(rename = "Substituição")]
    SubstitutionOut,
}

impl EventType {
    /// Label written to the `tipo_evento` column
    pub fn label(&self) -> &'static str {
        match self {
            Self::Goal => "Gol",
            Self::Assist => "Assistência",
            Self::YellowCard => "Cartão Amarelo",
            Self::SecondYellow => "Segundo Amarelo",
            Self::RedCard => "Cartão Vermelho",
            Self::SubstitutionIn => "Entrou",
            Self::SubstitutionOut => "Substituição",
        }
    }
}

/// How a goal was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalQualifier {
    Normal,
    #[serde(rename = "Penalti")]
    Penalty,
    #[serde(rename = "Gol Contra")]
    OwnGoal,
}

impl GoalQualifier {
    /// Reads a marker's parenthetical qualifier text
    pub fn from_qualifier_text(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::Normal;
        };
        let lower = text.to_lowercase();
        if lower.contains("pen") {
            Self::Penalty
        } else if lower.contains("g.c") || lower.contains("own") || lower.contains("contra") {
            Self::OwnGoal
        } else {
            Self::Normal
        }
    }

    /// Label written to the `tipo_gol` column
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Penalty => "Penalti",
            Self::OwnGoal => "Gol Contra",
        }
    }
}

/// Match minute, with optional stoppage time (`45+2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Minute {
    pub regular: u16,
    pub stoppage: Option<u16>,
}

impl Minute {
    pub fn new(regular: u16, stoppage: Option<u16>) -> Self {
        Self { regular, stoppage }
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stoppage {
            Some(extra) => write!(f, "{}+{}", self.regular, extra),
            None => write!(f, "{}", self.regular),
        }
    }
}

impl FromStr for Minute {
    type Err = crate::ParseAmbiguity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ambiguous = || crate::ParseAmbiguity::Minute(s.to_string());
        let trimmed = s.trim().trim_end_matches('\'');
        let (regular, stoppage) = match trimmed.split_once('+') {
            Some((regular, extra)) => (regular, Some(extra)),
            None => (trimmed, None),
        };
        let regular = regular.trim().parse().map_err(|_| ambiguous())?;
        let stoppage = match stoppage {
            Some(extra) => Some(extra.trim().parse().map_err(|_| ambiguous())?),
            None => None,
        };
        Ok(Self { regular, stoppage })
    }
}

impl From<Minute> for String {
    fn from(minute: Minute) -> Self {
        minute.to_string()
    }
}

impl TryFrom<String> for Minute {
    type Error = crate::ParseAmbiguity;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An icon node in a player's annotation block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Icon {
    pub title: String,
    pub class: String,
    pub glyph: String,
}

/// One sibling node of a player's annotation block, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationNode {
    Icon(Icon),
    Text(String),
}

/// An event recovered from an annotation block
///
/// `qualifier` is only set for goals; `minute` is `None` when no marker
/// could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedEvent {
    pub kind: EventType,
    pub qualifier: Option<GoalQualifier>,
    pub minute: Option<Minute>,
}
