use super::{classify_icon, parse_markers, AnnotationNode, EventType, GoalQualifier, Icon, ParsedEvent};
use crate::ParseAmbiguity;

enum State<'a> {
    /// Looking for the next icon node
    ScanIcon,
    Classify(&'a Icon),
    /// Consuming text siblings until the next icon or the end
    CollectMinutes { kind: EventType, text: String },
    Emit { kind: EventType, text: String },
}

/// Walks one player's annotation nodes and emits timed events
///
/// Text that appears before the first recognised icon, or after an icon that
/// classifies as nothing, is ignored.
pub struct EventParser<'a> {
    nodes: &'a [AnnotationNode],
    cursor: usize,
    events: Vec<ParsedEvent>,
}

impl<'a> EventParser<'a> {
    pub fn new(nodes: &'a [AnnotationNode]) -> Self {
        Self {
            nodes,
            cursor: 0,
            events: Vec::new(),
        }
    }

    /// Runs the machine to completion
    pub fn run(mut self) -> Vec<ParsedEvent> {
        let mut state = State::ScanIcon;

        loop {
            state = match state {
                State::ScanIcon => match self.next_icon() {
                    Some(icon) => State::Classify(icon),
                    None => break,
                },
                State::Classify(icon) => match classify_icon(icon) {
                    Some(kind) => State::CollectMinutes {
                        kind,
                        text: String::new(),
                    },
                    None => {
                        tracing::trace!("Ignoring unclassified icon {:?}", icon);
                        State::ScanIcon
                    }
                },
                State::CollectMinutes { kind, mut text } => match self.nodes.get(self.cursor) {
                    Some(AnnotationNode::Text(fragment)) => {
                        self.cursor += 1;
                        if !text.is_empty() {
                            text.push(' ');
                        }
                        text.push_str(fragment);
                        State::CollectMinutes { kind, text }
                    }
                    _ => State::Emit { kind, text },
                },
                State::Emit { kind, text } => {
                    self.emit(kind, &text);
                    State::ScanIcon
                }
            };
        }

        self.events
    }

    fn next_icon(&mut self) -> Option<&'a Icon> {
        let nodes = self.nodes;
        while let Some(node) = nodes.get(self.cursor) {
            self.cursor += 1;
            if let AnnotationNode::Icon(icon) = node {
                return Some(icon);
            }
        }
        None
    }

    fn emit(&mut self, kind: EventType, text: &str) {
        let markers = parse_markers(text);

        if markers.is_empty() && !text.trim().is_empty() {
            tracing::warn!(
                "{}; recording {} without a minute",
                ParseAmbiguity::Minute(text.trim().to_string()),
                kind.label()
            );
        }

        match kind {
            EventType::Goal if !markers.is_empty() => {
                for marker in &markers {
                    self.events.push(ParsedEvent {
                        kind,
                        qualifier: Some(marker.goal_qualifier()),
                        minute: Some(marker.minute),
                    });
                }
            }
            EventType::Goal => self.events.push(ParsedEvent {
                kind,
                qualifier: Some(GoalQualifier::Normal),
                minute: None,
            }),
            _ => self.events.push(ParsedEvent {
                kind,
                qualifier: None,
                minute: markers.first().map(|m| m.minute),
            }),
        }
    }
}

/// Parses a full annotation block into events
pub fn parse_annotations(nodes: &[AnnotationNode]) -> Vec<ParsedEvent> {
    EventParser::new(nodes).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Minute;

    fn icon(title: &str, class: &str, glyph: &str) -> AnnotationNode {
        AnnotationNode::Icon(Icon {
            title: title.to_string(),
            class: class.to_string(),
            glyph: glyph.to_string(),
        })
    }

    fn text(t: &str) -> AnnotationNode {
        AnnotationNode::Text(t.to_string())
    }

    #[test]
    fn test_goal_block_yields_one_event_per_marker() {
        let nodes = vec![icon("Gol", "", ""), text("35' 67' (pen.)")];
        let events = parse_annotations(&nodes);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventType::Goal);
        assert_eq!(events[0].minute, Some(Minute::new(35, None)));
        assert_eq!(events[0].qualifier, Some(GoalQualifier::Normal));
        assert_eq!(events[1].minute, Some(Minute::new(67, None)));
        assert_eq!(events[1].qualifier, Some(GoalQualifier::Penalty));
    }

    #[test]
    fn test_non_goal_uses_first_marker_only() {
        let nodes = vec![icon("Cartão amarelo", "yellow", "R"), text("40' 80'")];
        let events = parse_annotations(&nodes);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventType::YellowCard);
        assert_eq!(events[0].minute, Some(Minute::new(40, None)));
        assert_eq!(events[0].qualifier, None);
    }

    #[test]
    fn test_sequence_of_icons() {
        let nodes = vec![
            icon("Gol", "", ""),
            text("12'"),
            icon("", "", "8"),
            text("70'"),
            icon("Entrou", "", ""),
        ];
        let events = parse_annotations(&nodes);

        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventType::Goal,
                EventType::SubstitutionOut,
                EventType::SubstitutionIn
            ]
        );
        assert_eq!(events[2].minute, None);
    }

    #[test]
    fn test_text_split_across_nodes() {
        let nodes = vec![icon("Gol", "", ""), text("45+2'"), text("(g.c.)")];
        let events = parse_annotations(&nodes);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].minute, Some(Minute::new(45, Some(2))));
        assert_eq!(events[0].qualifier, Some(GoalQualifier::OwnGoal));
    }

    #[test]
    fn test_unreadable_minute_still_emits() {
        let nodes = vec![icon("Gol", "", ""), text("?")];
        let events = parse_annotations(&nodes);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].minute, None);
        assert_eq!(events[0].qualifier, Some(GoalQualifier::Normal));
    }

    #[test]
    fn test_unknown_icons_and_stray_text_ignored() {
        let nodes = vec![text("stray"), icon("", "captain", "C"), text("10'")];
        assert!(parse_annotations(&nodes).is_empty());
        assert!(parse_annotations(&[]).is_empty());
    }
}
