use super::{EventType, Icon};

/// Classifies an annotation icon by its title, class and glyph
///
/// The checks run in a fixed order: a yellow-card class alone is not
/// enough, the glyph must agree. Returns `None` for decorative icons.
pub fn classify_icon(icon: &Icon) -> Option<EventType> {
    let title = icon.title.to_lowercase();
    let class = icon.class.to_lowercase();
    let glyph = icon.glyph.trim();

    if title.contains("gol") || class.contains("fut-11") {
        Some(EventType::Goal)
    } else if title.contains("assist") || title.contains("público") || glyph == "B" {
        Some(EventType::Assist)
    } else if (title.contains("amarel") || class.contains("yellow")) && glyph == "R" {
        Some(EventType::YellowCard)
    } else if glyph == "S" {
        Some(EventType::SecondYellow)
    } else if glyph == "R" && class.contains("red") {
        Some(EventType::RedCard)
    } else if title.contains("entrou") || glyph == "7" {
        Some(EventType::SubstitutionIn)
    } else if title.contains("saiu") || glyph == "8" {
        Some(EventType::SubstitutionOut)
    } else {
        None
    }
}
