use super::{KindRegistry, Resolved};
use crate::model::{normalize_text, ContentKey, Id, Location, PendingRow};
use std::collections::HashMap;

const COUNTRY: &str = "Brasil";

/// Static state → region table
const REGIONS: &[(&str, &str)] = &[
    ("SP", "Sudeste"),
    ("RJ", "Sudeste"),
    ("MG", "Sudeste"),
    ("ES", "Sudeste"),
    ("RS", "Sul"),
    ("SC", "Sul"),
    ("PR", "Sul"),
    ("BA", "Nordeste"),
    ("PE", "Nordeste"),
    ("CE", "Nordeste"),
    ("RN", "Nordeste"),
    ("PB", "Nordeste"),
    ("AL", "Nordeste"),
    ("SE", "Nordeste"),
    ("PI", "Nordeste"),
    ("MA", "Nordeste"),
    ("GO", "Centro-Oeste"),
    ("MT", "Centro-Oeste"),
    ("MS", "Centro-Oeste"),
    ("DF", "Centro-Oeste"),
    ("AM", "Norte"),
    ("PA", "Norte"),
    ("RO", "Norte"),
    ("AC", "Norte"),
    ("RR", "Norte"),
    ("AP", "Norte"),
    ("TO", "Norte"),
];

/// Region of a state abbreviation; empty when unknown
pub fn region_for(state: &str) -> &'static str {
    REGIONS
        .iter()
        .find(|(abbreviation, _)| abbreviation.eq_ignore_ascii_case(state))
        .map(|(_, region)| *region)
        .unwrap_or_default()
}

/// Splits `"City (State)"` into its parts
///
/// Text without parentheses is all city, with an empty state.
///
/// # Examples
///
/// ```
/// use match_ledger::resolve::parse_place;
///
/// assert_eq!(parse_place("Salvador (BA)"), ("Salvador".to_string(), "BA".to_string()));
/// assert_eq!(parse_place("Salvador"), ("Salvador".to_string(), String::new()));
/// ```
pub fn parse_place(text: &str) -> (String, String) {
    let text = text.trim();
    match text.split_once('(') {
        Some((city, rest)) if rest.contains(')') => {
            let state = rest.split(')').next().unwrap_or_default();
            (city.trim().to_string(), state.trim().to_uppercase())
        }
        _ => (text.to_string(), String::new()),
    }
}

/// Resolves free-text place descriptors to Location IDs
#[derive(Debug, Clone)]
pub struct LocationResolver {
    registry: KindRegistry,
    /// Normalized city → first Location with a non-empty state
    by_city: HashMap<String, Id>,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationResolver {
    pub fn new() -> Self {
        Self {
            registry: KindRegistry::new(),
            by_city: HashMap::new(),
        }
    }

    /// Registers a persisted Location
    pub fn seed(&mut self, location: &Location) {
        self.registry
            .seed(ContentKey::location(&location.city, &location.state), location.id);
        if !location.state.trim().is_empty() {
            self.by_city
                .entry(normalize_text(&location.city))
                .or_insert(location.id);
        }
    }

    /// Resolves `"City (State)"` text
    ///
    /// A state-less descriptor reuses an existing stated Location of the same
    /// city and is otherwise rejected. New Locations are pushed to `pending`.
    ///
    /// # Returns
    ///
    /// * `Some(Resolved)` - The Location ID, new or existing
    /// * `None` - Empty text, `-`, or a state-less city with no stated match
    pub fn resolve(&mut self, text: &str, pending: &mut Vec<PendingRow>) -> Option<Resolved> {
        let text = text.trim();
        if text.is_empty() || text == "-" {
            return None;
        }

        let (city, state) = parse_place(text);
        if city.is_empty() {
            return None;
        }

        let key = ContentKey::location(&city, &state);
        if let Some(id) = self.registry.lookup(&key) {
            return Some(Resolved::Existing(id));
        }

        if state.is_empty() {
            return match self.by_city.get(&normalize_text(&city)) {
                Some(id) => {
                    tracing::debug!("Location '{}' reuses stated location #{}", city, id);
                    Some(Resolved::Existing(*id))
                }
                None => {
                    tracing::warn!("Location '{}' has no state and no stated match; left empty", city);
                    None
                }
            };
        }

        let resolved = self.registry.resolve(key);
        let id = resolved.id();
        self.by_city.entry(normalize_text(&city)).or_insert(id);

        tracing::info!("New location #{}: {} ({})", id, city, state);
        pending.push(PendingRow::Location(Location {
            id,
            region: region_for(&state).to_string(),
            state_name: state.clone(),
            country: COUNTRY.to_string(),
            city,
            state,
        }));

        Some(resolved)
    }

    pub(crate) fn registry_mut(&mut self) -> &mut KindRegistry {
        &mut self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
