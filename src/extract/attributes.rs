use super::{css, element_text};
use crate::model::EntityKind;
use crate::ExtractionError;
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// A recognised entity attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    Nickname,
    Founded,
    City,
    Inaugurated,
    Capacity,
    BirthDate,
    Nationality,
    Birthplace,
    Position,
    PreferredFoot,
    Height,
    Weight,
    Status,
}

// Label substrings are matched against the lowercased label in order, so
// more specific labels must come first ("nickname" before "name").
const CLUB_LABELS: &[(&str, Attribute)] = &[
    ("apelido", Attribute::Nickname),
    ("nickname", Attribute::Nickname),
    ("nome", Attribute::Name),
    ("name", Attribute::Name),
    ("ano de funda", Attribute::Founded),
    ("founded", Attribute::Founded),
    ("cidade", Attribute::City),
    ("city", Attribute::City),
];

const STADIUM_LABELS: &[(&str, Attribute)] = &[
    ("nome", Attribute::Name),
    ("name", Attribute::Name),
    ("cidade", Attribute::City),
    ("city", Attribute::City),
    ("inaugura", Attribute::Inaugurated),
    ("opened", Attribute::Inaugurated),
    ("lotação", Attribute::Capacity),
    ("capacidade", Attribute::Capacity),
    ("capacity", Attribute::Capacity),
];

const PLAYER_LABELS: &[(&str, Attribute)] = &[
    ("nome", Attribute::Name),
    ("name", Attribute::Name),
    ("data de nascimento", Attribute::BirthDate),
    ("date of birth", Attribute::BirthDate),
    ("nacionalidade", Attribute::Nationality),
    ("nationality", Attribute::Nationality),
    ("naturalidade", Attribute::Birthplace),
    ("place of birth", Attribute::Birthplace),
    ("posição", Attribute::Position),
    ("position", Attribute::Position),
    ("pé preferencial", Attribute::PreferredFoot),
    ("preferred foot", Attribute::PreferredFoot),
    ("altura", Attribute::Height),
    ("height", Attribute::Height),
    ("peso", Attribute::Weight),
    ("weight", Attribute::Weight),
    ("situação", Attribute::Status),
    ("status", Attribute::Status),
];

const OFFICIAL_LABELS: &[(&str, Attribute)] = &[
    ("nome", Attribute::Name),
    ("name", Attribute::Name),
    ("data de nascimento", Attribute::BirthDate),
    ("date of birth", Attribute::BirthDate),
    ("nacionalidade", Attribute::Nationality),
    ("nationality", Attribute::Nationality),
    ("naturalidade", Attribute::Birthplace),
    ("place of birth", Attribute::Birthplace),
    ("situação", Attribute::Status),
    ("status", Attribute::Status),
];

fn labels_for(kind: EntityKind) -> &'static [(&'static str, Attribute)] {
    match kind {
        EntityKind::Club => CLUB_LABELS,
        EntityKind::Stadium => STADIUM_LABELS,
        EntityKind::Player => PLAYER_LABELS,
        EntityKind::Coach | EntityKind::Referee => OFFICIAL_LABELS,
        EntityKind::Location | EntityKind::Match => &[],
    }
}

/// Matches a raw label against the recognised labels for a kind
fn recognise(label: &str, kind: EntityKind) -> Option<Attribute> {
    let lower = label.to_lowercase();
    labels_for(kind)
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, attribute)| *attribute)
}

/// Flat attribute map extracted from one entity page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: HashMap<Attribute, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value; the first name seen wins, later values of any
    /// other attribute replace earlier ones
    pub fn insert(&mut self, attribute: Attribute, value: String) {
        if attribute == Attribute::Name && self.values.contains_key(&Attribute::Name) {
            return;
        }
        self.values.insert(attribute, value);
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.values.get(&attribute).map(String::as_str)
    }

    /// Value as owned text, empty when the attribute is missing
    pub fn text(&self, attribute: Attribute) -> String {
        self.get(attribute).unwrap_or_default().to_string()
    }

    /// Value reduced to its digits
    pub fn number(&self, attribute: Attribute) -> Option<u32> {
        self.get(attribute).and_then(digits_only)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parses a number by stripping every non-digit character
///
/// `"40.000 lugares"` gives `40000`; text without digits, or with more
/// digits than fit, gives `None`.
pub fn digits_only(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// First non-empty text following the label span, element or text node
fn value_after(span: &ElementRef<'_>) -> Option<String> {
    span.next_siblings().find_map(|sibling| {
        let text = match sibling.value() {
            Node::Text(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
            Node::Element(_) => ElementRef::wrap(sibling).map(|e| element_text(&e))?,
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// Extracts the attribute map of one entity page
///
/// Scans the label/value pairs of the page's bio section. Labels that do
/// not match any recognised attribute for `kind` are ignored.
///
/// # Arguments
///
/// * `html` - The raw entity page
/// * `kind` - Which label set to match against
///
/// # Returns
///
/// * `Ok(AttributeMap)` - Possibly empty map of recognised attributes
/// * `Err(ExtractionError::MissingSection)` - The page has no bio section
pub fn extract(html: &str, kind: EntityKind) -> Result<AttributeMap, ExtractionError> {
    let document = Html::parse_document(html);
    let section_selector = css("div#entity_bio")?;
    let row_selector = css("div.bio, div.bio_half")?;
    let span_selector = css("span")?;
    let anchor_selector = css("a")?;

    let section = document
        .select(&section_selector)
        .next()
        .ok_or(ExtractionError::MissingSection("entity_bio"))?;

    let mut attributes = AttributeMap::new();

    for row in section.select(&row_selector) {
        let Some(span) = row.select(&span_selector).next() else {
            continue;
        };
        let label = element_text(&span);
        let Some(attribute) = recognise(&label, kind) else {
            continue;
        };

        let value = value_after(&span).or_else(|| {
            row.select(&anchor_selector)
                .next()
                .map(|a| element_text(&a))
                .filter(|t| !t.is_empty())
        });

        if let Some(value) = value {
            attributes.insert(attribute, value);
        }
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUB_PAGE: &str = r#"
        <html><body>
        <div id="entity_bio">
            <div class="bio"><span>Nome</span>Esporte Clube Bahia</div>
            <div class="bio"><span>Apelido</span>Tricolor de Aço</div>
            <div class="bio_half"><span>Ano de Fundação</span> 1931 </div>
            <div class="bio_half"><span>Cidade</span><a href="/local/ssa">Salvador (BA)</a></div>
            <div class="bio"><span>Nome alternativo</span>EC Bahia</div>
            <div class="bio"><span>Website</span>ecbahia.com.br</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_extract_club() {
        let attributes = extract(CLUB_PAGE, EntityKind::Club).unwrap();

        assert_eq!(attributes.get(Attribute::Name), Some("Esporte Clube Bahia"));
        assert_eq!(attributes.get(Attribute::Nickname), Some("Tricolor de Aço"));
        assert_eq!(attributes.get(Attribute::Founded), Some("1931"));
        assert_eq!(attributes.get(Attribute::City), Some("Salvador (BA)"));
        assert_eq!(attributes.len(), 4);
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let html = r#"<div id="entity_bio">
            <div class="bio"><span>NOME</span><div>Pelé</div></div>
            <div class="bio"><span>altura</span>173 cm</div>
        </div>"#;
        let attributes = extract(html, EntityKind::Player).unwrap();

        assert_eq!(attributes.get(Attribute::Name), Some("Pelé"));
        assert_eq!(attributes.number(Attribute::Height), Some(173));
    }

    #[test]
    fn test_missing_section() {
        let result = extract("<html><body><p>404</p></body></html>", EntityKind::Club);
        assert!(matches!(
            result,
            Err(ExtractionError::MissingSection("entity_bio"))
        ));
    }

    #[test]
    fn test_unparseable_number_left_empty() {
        let html = r#"<div id="entity_bio">
            <div class="bio"><span>Nome</span>Fonte Nova</div>
            <div class="bio"><span>Lotação</span>desconhecida</div>
        </div>"#;
        let attributes = extract(html, EntityKind::Stadium).unwrap();

        assert_eq!(attributes.get(Attribute::Capacity), Some("desconhecida"));
        assert_eq!(attributes.number(Attribute::Capacity), None);
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("40.000 lugares"), Some(40000));
        assert_eq!(digits_only("82 kg"), Some(82));
        assert_eq!(digits_only("-"), None);
        assert_eq!(digits_only("99999999999999"), None);
    }
}
