use super::{absolute_link, css, element_text};
use crate::ExtractionError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A team cell of the listing: display name plus detail link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCell {
    pub name: String,
    pub link: Option<String>,
}

/// One row of the match listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// ISO date when the cell text is a recognised date, raw text otherwise
    pub date: String,
    pub time: String,
    pub home: TeamCell,
    pub away: TeamCell,
    pub score_text: String,
    /// Match-detail address; also the crawl checkpoint value
    pub match_link: Option<String>,
    pub phase: String,
}

/// Rows of one listing page plus the address of the following page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    pub next_page: Option<String>,
}

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

fn normalize_date(text: &str) -> String {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| text.to_string())
}

fn team_cell(cell: &ElementRef<'_>, anchor: &Selector, base: &Url) -> TeamCell {
    match cell.select(anchor).next() {
        Some(a) => TeamCell {
            name: element_text(&a),
            link: a.value().attr("href").and_then(|href| absolute_link(href, base)),
        },
        None => TeamCell {
            name: element_text(cell),
            link: None,
        },
    }
}

fn next_page_link(document: &Html, base: &Url) -> Result<Option<String>, ExtractionError> {
    let selector = css("a[rel~='next'][href], link[rel~='next'][href], .pagination a.next[href]")?;
    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| absolute_link(href, base)))
}

/// Parses one page of the match listing
///
/// Rows with fewer than eight cells (headers, separators) are skipped. The
/// phase cell is optional.
///
/// # Arguments
///
/// * `html` - The raw listing page
/// * `base` - The page address, for resolving relative links
///
/// # Returns
///
/// * `Ok(ListingPage)` - Rows in document order and the next-page link
/// * `Err(ExtractionError::MissingSection)` - No listing table on the page
pub fn parse_listing(html: &str, base: &Url) -> Result<ListingPage, ExtractionError> {
    let document = Html::parse_document(html);
    let table_selector = css("table.zztable.stats")?;
    let row_selector = css("tr")?;
    let cell_selector = css("td")?;
    let anchor_selector = css("a")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ExtractionError::MissingSection("listing table"))?;

    let mut rows = Vec::new();

    for tr in table.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = tr.select(&cell_selector).collect();
        if cells.len() < 8 {
            continue;
        }

        let score = team_cell(&cells[5], &anchor_selector, base);

        rows.push(ListingRow {
            date: normalize_date(&element_text(&cells[1])),
            time: element_text(&cells[2]),
            home: team_cell(&cells[3], &anchor_selector, base),
            away: team_cell(&cells[7], &anchor_selector, base),
            score_text: score.name,
            match_link: score.link,
            phase: cells.get(8).map(element_text).unwrap_or_default(),
        });
    }

    Ok(ListingPage {
        rows,
        next_page: next_page_link(&document, base)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
        <table class="zztable stats">
            <tr><th>#</th><th>Data</th><th>Hora</th></tr>
            <tr>
                <td>1</td><td>07/08/1971</td><td>16:00</td>
                <td><a href="/equipa/bahia">Bahia</a></td><td></td>
                <td><a href="/jogo/1971-08-07-bahia-santos">2-1</a></td><td></td>
                <td><a href="/equipa/santos">Santos</a></td><td>R1</td>
            </tr>
            <tr>
                <td>2</td><td>08/08/1971</td><td>18:00</td>
                <td>Ceará</td><td></td><td>WO</td><td></td><td>Sport</td>
            </tr>
            <tr><td colspan="9">Fim</td></tr>
        </table>
        <div class="pagination"><a class="next" href="?page=2">Seguinte</a></div>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://example.com/edicao/1971").unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let page = parse_listing(LISTING, &base()).unwrap();
        assert_eq!(page.rows.len(), 2);

        let first = &page.rows[0];
        assert_eq!(first.date, "1971-08-07");
        assert_eq!(first.time, "16:00");
        assert_eq!(first.home.name, "Bahia");
        assert_eq!(
            first.home.link.as_deref(),
            Some("https://example.com/equipa/bahia")
        );
        assert_eq!(first.away.name, "Santos");
        assert_eq!(first.score_text, "2-1");
        assert_eq!(
            first.match_link.as_deref(),
            Some("https://example.com/jogo/1971-08-07-bahia-santos")
        );
        assert_eq!(first.phase, "R1");
    }

    #[test]
    fn test_row_without_links() {
        let page = parse_listing(LISTING, &base()).unwrap();
        let second = &page.rows[1];

        assert_eq!(second.home.name, "Ceará");
        assert_eq!(second.home.link, None);
        assert_eq!(second.match_link, None);
        assert_eq!(second.score_text, "WO");
        assert_eq!(second.phase, "");
    }

    #[test]
    fn test_next_page() {
        let page = parse_listing(LISTING, &base()).unwrap();
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://example.com/edicao/1971?page=2")
        );
    }

    #[test]
    fn test_missing_table() {
        let result = parse_listing("<html><body></body></html>", &base());
        assert!(matches!(
            result,
            Err(ExtractionError::MissingSection("listing table"))
        ));
    }

    #[test]
    fn test_date_passthrough() {
        assert_eq!(normalize_date("1971-08-07"), "1971-08-07");
        assert_eq!(normalize_date("sem data"), "sem data");
    }
}
