use super::{absolute_link, css, element_text};
use crate::events::{AnnotationNode, Icon};
use crate::ExtractionError;
use scraper::{ElementRef, Html, Node};
use url::Url;

/// One player line of a roster column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_link: String,
    pub shirt_number: Option<u32>,
    /// Icon and text nodes of the player's annotation block, in document order
    pub annotations: Vec<AnnotationNode>,
}

/// Starters or substitutes, split by side (0 = home, 1 = away)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSection {
    pub starter: bool,
    pub sides: [Vec<RosterEntry>; 2],
}

/// Everything the match processor needs from a match-detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPage {
    pub stadium_link: Option<String>,
    pub referee_link: Option<String>,
    pub sections: Vec<RosterSection>,
    pub coach_links: [Option<String>; 2],
}

fn side_of(column_index: usize) -> usize {
    usize::from(column_index > 0)
}

fn annotation_nodes(events: &ElementRef<'_>) -> Vec<AnnotationNode> {
    let mut nodes = Vec::new();

    for node in events.descendants() {
        match node.value() {
            Node::Element(element) if element.name() == "span" => {
                let Some(span) = ElementRef::wrap(node) else {
                    continue;
                };
                nodes.push(AnnotationNode::Icon(Icon {
                    title: element.attr("title").unwrap_or_default().trim().to_string(),
                    class: element.attr("class").unwrap_or_default().to_string(),
                    glyph: element_text(&span),
                }));
            }
            Node::Text(text) => {
                // Glyph text belongs to its icon
                let inside_icon = node
                    .ancestors()
                    .take_while(|a| a.id() != events.id())
                    .any(|a| matches!(a.value(), Node::Element(e) if e.name() == "span"));
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !inside_icon && !text.is_empty() {
                    nodes.push(AnnotationNode::Text(text));
                }
            }
            _ => {}
        }
    }

    nodes
}

/// Parses a match-detail page
///
/// Header links containing `estadio` / `arbitro` give the venue and the
/// referee. The game report holds up to three rows: starters, substitutes
/// and coaches. A page without a game report yields no roster sections.
pub fn parse_match_page(html: &str, base: &Url) -> Result<MatchPage, ExtractionError> {
    let document = Html::parse_document(html);
    let header_link_selector = css("div.header a[href]")?;
    let report_selector = css("div#game_report")?;
    let row_selector = css("div.zz-tpl-row.game_report")?;
    let column_selector = css("div[class*='zz-tpl-col']")?;
    let player_selector = css("div.player")?;
    let player_link_selector = css("a[href*='/jogador/']")?;
    let number_selector = css("div.number")?;
    let events_selector = css("div.events")?;
    let coach_link_selector = css("a[href*='/treinador/']")?;

    let mut page = MatchPage::default();

    for anchor in document.select(&header_link_selector) {
        let Some(link) = anchor
            .value()
            .attr("href")
            .and_then(|href| absolute_link(href, base))
        else {
            continue;
        };
        let lower = link.to_lowercase();
        if lower.contains("estadio") {
            page.stadium_link.get_or_insert(link);
        } else if lower.contains("arbitro") {
            page.referee_link.get_or_insert(link);
        }
    }

    let Some(report) = document.select(&report_selector).next() else {
        return Ok(page);
    };
    let rows: Vec<ElementRef<'_>> = report.select(&row_selector).collect();

    for (index, row) in rows.iter().take(2).enumerate() {
        let mut section = RosterSection {
            starter: index == 0,
            sides: [Vec::new(), Vec::new()],
        };

        for (column_index, column) in row.select(&column_selector).enumerate() {
            for player in column.select(&player_selector) {
                let Some(player_link) = player
                    .select(&player_link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| absolute_link(href, base))
                else {
                    continue;
                };

                let shirt_number = player
                    .select(&number_selector)
                    .next()
                    .and_then(|n| element_text(&n).parse().ok());

                let annotations = player
                    .select(&events_selector)
                    .next()
                    .map(|events| annotation_nodes(&events))
                    .unwrap_or_default();

                section.sides[side_of(column_index)].push(RosterEntry {
                    player_link,
                    shirt_number,
                    annotations,
                });
            }
        }

        page.sections.push(section);
    }

    if let Some(coaches) = rows.get(2) {
        for (column_index, column) in coaches.select(&column_selector).enumerate() {
            let link = column
                .select(&coach_link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| absolute_link(href, base));
            let slot = &mut page.coach_links[side_of(column_index)];
            if slot.is_none() {
                *slot = link;
            }
        }
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_PAGE: &str = r#"
        <html><body>
        <div class="header">
            <a href="/estadio/fonte-nova">Fonte Nova</a>
            <a href="/arbitro/armando-marques">Armando Marques</a>
            <a href="/edicao/1971">Brasileirão 1971</a>
        </div>
        <div id="game_report">
            <div class="zz-tpl-row game_report">
                <div class="zz-tpl-col is-6 fl-l">
                    <div class="player">
                        <div class="number">9</div>
                        <a href="/jogador/douglas">Douglas</a>
                        <div class="events">
                            <span class="icn_zerozero fut-11" title="Golo">&nbsp;</span><div>35' 67' (pen.)</div>
                        </div>
                    </div>
                    <div class="player"><div class="number">-</div><span>Sem link</span></div>
                </div>
                <div class="zz-tpl-col is-6 fl-r">
                    <div class="player">
                        <div class="number">10</div>
                        <a href="/jogador/pele">Pelé</a>
                        <div class="events"><span class="icn_zerozero yellow" title="Cartão amarelo">R</span><div>40'</div></div>
                    </div>
                </div>
            </div>
            <div class="zz-tpl-row game_report">
                <div class="zz-tpl-col is-6 fl-l">
                    <div class="player"><a href="/jogador/zequinha">Zequinha</a></div>
                </div>
                <div class="zz-tpl-col is-6 fl-r"></div>
            </div>
            <div class="zz-tpl-row game_report">
                <div class="zz-tpl-col is-6 fl-l"><a href="/treinador/carlos-froner">Carlos Froner</a></div>
                <div class="zz-tpl-col is-6 fl-r"><span>-</span></div>
            </div>
        </div>
        </body></html>
    "#;

    fn parse() -> MatchPage {
        let base = Url::parse("https://example.com/jogo/1").unwrap();
        parse_match_page(MATCH_PAGE, &base).unwrap()
    }

    #[test]
    fn test_header_links() {
        let page = parse();
        assert_eq!(
            page.stadium_link.as_deref(),
            Some("https://example.com/estadio/fonte-nova")
        );
        assert_eq!(
            page.referee_link.as_deref(),
            Some("https://example.com/arbitro/armando-marques")
        );
    }

    #[test]
    fn test_roster_sections() {
        let page = parse();
        assert_eq!(page.sections.len(), 2);

        let starters = &page.sections[0];
        assert!(starters.starter);
        assert_eq!(starters.sides[0].len(), 1);
        assert_eq!(starters.sides[0][0].player_link, "https://example.com/jogador/douglas");
        assert_eq!(starters.sides[0][0].shirt_number, Some(9));
        assert_eq!(starters.sides[1][0].shirt_number, Some(10));

        let subs = &page.sections[1];
        assert!(!subs.starter);
        assert_eq!(subs.sides[0].len(), 1);
        assert_eq!(subs.sides[0][0].shirt_number, None);
        assert!(subs.sides[0][0].annotations.is_empty());
        assert!(subs.sides[1].is_empty());
    }

    #[test]
    fn test_annotation_nodes() {
        let page = parse();
        let annotations = &page.sections[0].sides[0][0].annotations;

        assert_eq!(annotations.len(), 2);
        match &annotations[0] {
            AnnotationNode::Icon(icon) => {
                assert_eq!(icon.title, "Golo");
                assert!(icon.class.contains("fut-11"));
            }
            other => panic!("expected icon, got {other:?}"),
        }
        assert_eq!(
            annotations[1],
            AnnotationNode::Text("35' 67' (pen.)".to_string())
        );

        let card = &page.sections[0].sides[1][0].annotations;
        match &card[0] {
            AnnotationNode::Icon(icon) => assert_eq!(icon.glyph, "R"),
            other => panic!("expected icon, got {other:?}"),
        }
    }

    #[test]
    fn test_coach_links() {
        let page = parse();
        assert_eq!(
            page.coach_links[0].as_deref(),
            Some("https://example.com/treinador/carlos-froner")
        );
        assert_eq!(page.coach_links[1], None);
    }

    #[test]
    fn test_page_without_report() {
        let base = Url::parse("https://example.com/jogo/2").unwrap();
        let page = parse_match_page("<html><body></body></html>", &base).unwrap();
        assert!(page.sections.is_empty());
        assert_eq!(page.stadium_link, None);
    }
}
