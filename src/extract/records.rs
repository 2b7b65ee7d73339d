//! Typed record construction from extracted attribute maps
//!
//! Label matching lives in the attribute scanner; these functions only map
//! recognised attributes onto table rows. Returned rows carry ID 0 until the
//! resolver assigns one.

use super::{Attribute, AttributeMap};
use crate::model::{Club, Coach, Id, Official, Player, Referee, Stadium};

pub fn club(attributes: &AttributeMap, location_id: Option<Id>) -> Club {
    Club {
        id: 0,
        name: attributes.text(Attribute::Name),
        nickname: attributes.text(Attribute::Nickname),
        location_id,
        founded: attributes.text(Attribute::Founded),
        active: 1,
    }
}

pub fn stadium(attributes: &AttributeMap, location_id: Option<Id>) -> Stadium {
    Stadium {
        id: 0,
        name: attributes.text(Attribute::Name),
        capacity: attributes.number(Attribute::Capacity),
        location_id,
        inaugurated: attributes.text(Attribute::Inaugurated),
        active: 1,
    }
}

/// Builds a player row
///
/// A "Falecido" status becomes the death date and marks the player retired,
/// as does "Aposentado".
pub fn player(attributes: &AttributeMap) -> Player {
    let status = attributes.text(Attribute::Status);
    let lower = status.to_lowercase();
    let deceased = lower.contains("falecido");

    Player {
        id: 0,
        name: attributes.text(Attribute::Name),
        birth_date: attributes.text(Attribute::BirthDate),
        death_date: if deceased { status.clone() } else { String::new() },
        nationality: attributes.text(Attribute::Nationality),
        birthplace: attributes.text(Attribute::Birthplace),
        height: attributes.number(Attribute::Height),
        weight: attributes.number(Attribute::Weight),
        position: attributes.text(Attribute::Position),
        preferred_foot: attributes.text(Attribute::PreferredFoot),
        retired: u8::from(deceased || lower.contains("aposentado")),
    }
}

fn official(attributes: &AttributeMap) -> Official {
    let status = attributes.text(Attribute::Status);
    let (death_date, status) = if status.to_lowercase().contains("falecido") {
        (status, String::new())
    } else {
        (String::new(), status)
    };

    Official {
        id: 0,
        name: attributes.text(Attribute::Name),
        birth_date: attributes.text(Attribute::BirthDate),
        death_date,
        nationality: attributes.text(Attribute::Nationality),
        birthplace: attributes.text(Attribute::Birthplace),
        status,
    }
}

pub fn coach(attributes: &AttributeMap) -> Coach {
    Coach(official(attributes))
}

pub fn referee(attributes: &AttributeMap) -> Referee {
    Referee(official(attributes))
}
