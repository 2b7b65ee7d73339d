use super::{GoalQualifier, Minute};
use regex::Regex;
use std::sync::OnceLock;

/// One `digits[+digits]` marker with its optional parenthetical qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinuteMarker {
    pub minute: Minute,
    pub qualifier: Option<String>,
}

impl MinuteMarker {
    pub fn goal_qualifier(&self) -> GoalQualifier {
        GoalQualifier::from_qualifier_text(self.qualifier.as_deref())
    }
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)(?:\s*\+\s*(\d+))?'?\s*(?:\(([^)]*)\))?").expect("minute pattern is valid")
    })
}

/// Extracts every minute marker from a text block, in order
///
/// Digit runs that overflow a minute are dropped, the rest of the block is
/// still read.
///
/// # Examples
///
/// ```
/// use match_ledger::events::parse_markers;
///
/// let markers = parse_markers("35' 67' (pen.)");
/// assert_eq!(markers.len(), 2);
/// assert_eq!(markers[1].qualifier.as_deref(), Some("pen."));
/// ```
pub fn parse_markers(text: &str) -> Vec<MinuteMarker> {
    marker_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let regular = caps.get(1)?.as_str().parse().ok()?;
            let stoppage = match caps.get(2) {
                Some(extra) => Some(extra.as_str().parse().ok()?),
                None => None,
            };
            let qualifier = caps
                .get(3)
                .map(|q| q.as_str().trim().to_string())
                .filter(|q| !q.is_empty());
            Some(MinuteMarker {
                minute: Minute::new(regular, stoppage),
                qualifier,
            })
        })
        .collect()
}
