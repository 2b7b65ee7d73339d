//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a fake listing, match pages and entity
//! pages, and run the full crawl cycle end-to-end against on-disk stores.

use match_ledger::config::{
    Config, CrawlerConfig, OutputConfig, RetryConfig, StorageBackend, UserAgentConfig,
};
use match_ledger::crawler::{run_crawl, Coordinator};
use match_ledger::events::{EventType, GoalQualifier, Minute};
use match_ledger::model::{
    Club, CoachAssignment, Location, Match, MatchEvent, Participation, RefereeAssignment, Stadium,
};
use match_ledger::storage::{CsvStore, SqliteStore, TableStore};
use match_ledger::{LedgerError, Table};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock listing
fn create_test_config(listing_url: String, directory: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            listing_url,
            edition_id: 1971,
            courtesy_delay_ms: 0,
            max_listing_pages: 10,
        },
        retry: RetryConfig {
            max_attempts: 2,
            backoff_base_ms: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            backend: StorageBackend::Csv,
            directory: directory.display().to_string(),
            database_path: directory.join("ledger.db").display().to_string(),
        },
    }
}

async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn listing_row(date: &str, home: (&str, &str), score: &str, match_link: &str, away: (&str, &str)) -> String {
    format!(
        r#"<tr>
            <td>1</td><td>{date}</td><td>16:00</td>
            <td><a href="{}">{}</a></td><td></td>
            <td><a href="{match_link}">{score}</a></td><td></td>
            <td><a href="{}">{}</a></td><td>R1</td>
        </tr>"#,
        home.1, home.0, away.1, away.0
    )
}

fn listing_page(rows: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<div class="pagination"><a class="next" href="{href}">Seguinte</a></div>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <table class="zztable stats">
            <tr><th>#</th><th>Data</th><th>Hora</th></tr>
            {}
        </table>
        {next}
        </body></html>"#,
        rows.join("\n")
    )
}

fn bio_page(pairs: &[(&str, &str)]) -> String {
    let rows: Vec<String> = pairs
        .iter()
        .map(|(label, value)| format!(r#"<div class="bio"><span>{label}</span>{value}</div>"#))
        .collect();
    format!(
        r#"<html><body><div id="entity_bio">{}</div></body></html>"#,
        rows.join("\n")
    )
}

const BAHIA_SANTOS_PAGE: &str = r#"
    <html><body>
    <div class="header">
        <a href="/estadio/fonte-nova">Fonte Nova</a>
        <a href="/arbitro/armando-marques">Armando Marques</a>
    </div>
    <div id="game_report">
        <div class="zz-tpl-row game_report">
            <div class="zz-tpl-col is-6 fl-l">
                <div class="player">
                    <div class="number">9</div>
                    <a href="/jogador/beijoca">Beijoca</a>
                    <div class="events"><span class="icn_zerozero" title="Golo">f</span> 35' 67' (pen.)</div>
                </div>
            </div>
            <div class="zz-tpl-col is-6 fl-r">
                <div class="player">
                    <div class="number">10</div>
                    <a href="/jogador/pele">Pelé</a>
                    <div class="events"><span class="icn_zerozero yellow" title="Cartão Amarelo">R</span> 44'</div>
                </div>
            </div>
        </div>
        <div class="zz-tpl-row game_report">
            <div class="zz-tpl-col is-6 fl-l"></div>
            <div class="zz-tpl-col is-6 fl-r"></div>
        </div>
        <div class="zz-tpl-row game_report">
            <div class="zz-tpl-col is-6 fl-l"><a href="/treinador/sapo">Sapo</a></div>
            <div class="zz-tpl-col is-6 fl-r"></div>
        </div>
    </div>
    </body></html>
"#;

/// Mounts every entity page and both match pages
async fn mount_entities(server: &MockServer) {
    mount_entities_with_bahia_city(server, "Salvador (BA)").await;
}

async fn mount_entities_with_bahia_city(server: &MockServer, city: &str) {
    mount_page(
        server,
        "/equipa/bahia",
        bio_page(&[("Nome", "Esporte Clube Bahia"), ("Ano de Fundação", "1931"), ("Cidade", city)]),
    )
    .await;
    mount_page(
        server,
        "/equipa/santos",
        bio_page(&[("Nome", "Santos FC"), ("Cidade", "Santos (SP)")]),
    )
    .await;
    mount_page(
        server,
        "/estadio/fonte-nova",
        bio_page(&[("Nome", "Fonte Nova"), ("Cidade", "Salvador (BA)"), ("Lotação", "66.080")]),
    )
    .await;
    mount_page(
        server,
        "/arbitro/armando-marques",
        bio_page(&[("Nome", "Armando Marques"), ("Data de Nascimento", "1930-01-01")]),
    )
    .await;
    mount_page(
        server,
        "/treinador/sapo",
        bio_page(&[("Nome", "Sapo"), ("Nacionalidade", "Brasil")]),
    )
    .await;
    mount_page(
        server,
        "/jogador/beijoca",
        bio_page(&[("Nome", "Beijoca"), ("Data de Nascimento", "1954-09-02")]),
    )
    .await;
    mount_page(
        server,
        "/jogador/pele",
        bio_page(&[("Nome", "Pelé"), ("Data de Nascimento", "1940-10-23")]),
    )
    .await;
    mount_page(server, "/jogo/bahia-santos", BAHIA_SANTOS_PAGE.to_string()).await;
    mount_page(
        server,
        "/jogo/santos-bahia",
        "<html><body><p>Ficha indisponível</p></body></html>".to_string(),
    )
    .await;
}

fn bahia_santos() -> String {
    listing_row(
        "07/08/1971",
        ("Bahia", "/equipa/bahia"),
        "2-1",
        "/jogo/bahia-santos",
        ("Santos", "/equipa/santos"),
    )
}

fn santos_bahia() -> String {
    listing_row(
        "14/08/1971",
        ("Santos", "/equipa/santos"),
        "0-0",
        "/jogo/santos-bahia",
        ("Bahia", "/equipa/bahia"),
    )
}

/// Every CSV table in a directory, by file name
fn table_files(dir: &Path) -> BTreeMap<String, String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "csv"))
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            (name, std::fs::read_to_string(&p).unwrap())
        })
        .collect()
}

async fn crawl(config: &Config, dir: &Path, fresh: bool) -> match_ledger::output::CrawlReport {
    let store = CsvStore::new(dir).expect("Failed to open store");
    let mut coordinator =
        Coordinator::new(config.clone(), store, fresh).expect("Failed to create coordinator");
    coordinator.run().await.expect("Crawl failed")
}

#[tokio::test]
async fn test_end_to_end_single_match() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    mount_page(&server, "/edicao/1971", listing_page(&[bahia_santos()], None)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());

    let report = crawl(&config, dir.path(), false).await;
    assert_eq!(report.pages, 1);
    assert_eq!(report.recorded, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.events, 3);

    let store = CsvStore::new(dir.path()).unwrap();

    let matches: Vec<Match> = store.load().unwrap();
    assert_eq!(matches.len(), 1);
    let fixture = &matches[0];
    assert_eq!(fixture.home_score, Some(2));
    assert_eq!(fixture.away_score, Some(1));
    assert_eq!(fixture.phase, "R1");
    assert_eq!(fixture.date, "1971-08-07");
    assert_eq!(fixture.edition_id, 1971);
    assert_eq!(fixture.score_status, "");
    assert_eq!(fixture.stadium_id, Some(1));

    let clubs: Vec<Club> = store.load().unwrap();
    assert_eq!(clubs.len(), 2);
    assert_eq!(clubs[0].name, "Esporte Clube Bahia");
    assert_eq!(clubs[0].founded, "1931");
    assert_eq!(clubs[1].name, "Santos FC");
    assert_eq!((fixture.home_id, fixture.away_id), (clubs[0].id, clubs[1].id));

    // The stadium shares Bahia's city
    let locations: Vec<Location> = store.load().unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].state, "BA");
    assert_eq!(locations[1].state, "SP");
    let stadiums: Vec<Stadium> = store.load().unwrap();
    assert_eq!(stadiums.len(), 1);
    assert_eq!(stadiums[0].location_id, clubs[0].location_id);
    assert_eq!(stadiums[0].capacity, Some(66080));

    let participations: Vec<Participation> = store.load().unwrap();
    assert_eq!(participations.len(), 2);
    assert!(participations.iter().all(|p| p.starter == 1));
    assert_eq!(participations[0].shirt_number, Some(9));
    assert_eq!(participations[1].club_id, clubs[1].id);

    let events: Vec<MatchEvent> = store.load().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_type, EventType::Goal);
    assert_eq!(events[0].goal_qualifier, Some(GoalQualifier::Normal));
    assert_eq!(events[0].minute, Some(Minute::new(35, None)));
    assert_eq!(events[1].goal_qualifier, Some(GoalQualifier::Penalty));
    assert_eq!(events[1].minute, Some(Minute::new(67, None)));
    assert_eq!(events[2].event_type, EventType::YellowCard);
    assert_eq!(
        events.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let coaches: Vec<CoachAssignment> = store.load().unwrap();
    assert_eq!(coaches.len(), 2);
    assert_eq!(coaches[0].coach_id, Some(1));
    assert_eq!(coaches[0].confirmed, 1);
    assert_eq!(coaches[1].coach_id, None);
    assert_eq!(coaches[1].confirmed, 0);

    let referees: Vec<RefereeAssignment> = store.load().unwrap();
    assert_eq!(referees.len(), 1);
    assert_eq!(referees[0].referee_id, Some(1));

    assert_eq!(
        store.read_checkpoint().unwrap(),
        Some(format!("{}/jogo/bahia-santos", server.uri()))
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    mount_page(
        &server,
        "/edicao/1971",
        listing_page(&[bahia_santos(), santos_bahia()], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());

    crawl(&config, dir.path(), false).await;
    let first = table_files(dir.path());
    assert!(first.contains_key("partidas.csv"));

    // Resuming past the checkpoint writes nothing
    let resumed = crawl(&config, dir.path(), false).await;
    assert_eq!(resumed.resumed_past, 2);
    assert_eq!(resumed.rows_written, 0);
    assert_eq!(table_files(dir.path()), first);

    // Re-walking everything collapses on dedup keys
    let fresh = crawl(&config, dir.path(), true).await;
    assert_eq!(fresh.recorded, 2);
    assert_eq!(fresh.rows_written, 0);
    assert_eq!(table_files(dir.path()), first);
}

#[tokio::test]
async fn test_stateless_club_city_keeps_identity_across_runs() {
    let server = MockServer::start().await;
    mount_entities_with_bahia_city(&server, "Salvador").await;
    mount_page(
        &server,
        "/edicao/1971",
        listing_page(&[bahia_santos(), santos_bahia()], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());

    crawl(&config, dir.path(), false).await;
    let first = table_files(dir.path());
    let clubs = &first["clubes.csv"];
    assert_eq!(clubs.matches("Esporte Clube Bahia").count(), 1);

    // The stadium has since taught the store "Salvador (BA)"
    let fresh = crawl(&config, dir.path(), true).await;
    assert_eq!(fresh.rows_written, 0);
    assert_eq!(table_files(dir.path()), first);
}

#[tokio::test]
async fn test_interrupted_crawl_matches_uninterrupted() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    mount_page(
        &server,
        "/edicao/1971",
        listing_page(&[bahia_santos()], Some("/edicao/1971/pagina-2")),
    )
    .await;
    mount_page(&server, "/edicao/1971/pagina-2", listing_page(&[santos_bahia()], None)).await;
    let listing_url = format!("{}/edicao/1971", server.uri());

    let whole = TempDir::new().unwrap();
    let config = create_test_config(listing_url.clone(), whole.path());
    let report = crawl(&config, whole.path(), false).await;
    assert_eq!(report.pages, 2);
    assert_eq!(report.recorded, 2);

    // Stop after the first listing page, then pick up where it left off
    let split = TempDir::new().unwrap();
    let mut config = create_test_config(listing_url, split.path());
    config.crawler.max_listing_pages = 1;
    let partial = crawl(&config, split.path(), false).await;
    assert_eq!(partial.recorded, 1);

    config.crawler.max_listing_pages = 10;
    let rest = crawl(&config, split.path(), false).await;
    assert_eq!(rest.resumed_past, 1);
    assert_eq!(rest.recorded, 1);

    assert_eq!(table_files(split.path()), table_files(whole.path()));
}

#[tokio::test]
async fn test_resume_skips_rows_up_to_checkpoint() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    mount_page(
        &server,
        "/edicao/1971",
        listing_page(&[bahia_santos(), santos_bahia()], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut store = CsvStore::new(dir.path()).unwrap();
    store
        .write_checkpoint(&format!("{}/jogo/bahia-santos", server.uri()))
        .unwrap();

    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());
    let report = crawl(&config, dir.path(), false).await;

    assert_eq!(report.resumed_past, 1);
    assert_eq!(report.recorded, 1);

    let store = CsvStore::new(dir.path()).unwrap();
    let matches: Vec<Match> = store.load().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].date, "1971-08-14");
    assert_eq!(matches[0].stadium_id, None);
    assert_eq!(store.count(Table::Event).unwrap(), 0);
    assert_eq!(store.count(Table::RefereeAssignment).unwrap(), 1);
}

#[tokio::test]
async fn test_unresolved_club_skips_only_that_match() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/equipa/santos",
        bio_page(&[("Nome", "Santos FC"), ("Cidade", "Santos (SP)")]),
    )
    .await;
    mount_page(
        &server,
        "/jogo/bahia-santos",
        "<html><body></body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/equipa/bahia"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/edicao/1971", listing_page(&[bahia_santos()], None)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());
    let report = crawl(&config, dir.path(), false).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.recorded, 0);

    let store = CsvStore::new(dir.path()).unwrap();
    assert_eq!(store.count(Table::Match).unwrap(), 0);
}

#[tokio::test]
async fn test_listing_retried_after_rate_limit() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    Mock::given(method("GET"))
        .and(path("/edicao/1971"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/edicao/1971", listing_page(&[bahia_santos()], None)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());
    let report = crawl(&config, dir.path(), false).await;

    assert_eq!(report.recorded, 1);
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/edicao/1971"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());
    let result = run_crawl(config, false).await;

    assert!(matches!(result, Err(LedgerError::Listing { .. })));
}

#[tokio::test]
async fn test_sqlite_backend_end_to_end() {
    let server = MockServer::start().await;
    mount_entities(&server).await;
    mount_page(
        &server,
        "/edicao/1971",
        listing_page(&[bahia_santos(), santos_bahia()], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/edicao/1971", server.uri()), dir.path());
    config.output.backend = StorageBackend::Sqlite;
    let db_path = dir.path().join("ledger.db");

    let report = run_crawl(config.clone(), false).await.expect("Crawl failed");
    assert_eq!(report.recorded, 2);

    let counts = |store: &SqliteStore| -> Vec<u64> {
        Table::ALL.iter().map(|t| store.count(*t).unwrap()).collect()
    };
    let before = counts(&SqliteStore::new(&db_path).unwrap());
    assert_eq!(before[Table::ALL.iter().position(|t| *t == Table::Match).unwrap()], 2);
    assert_eq!(before[Table::ALL.iter().position(|t| *t == Table::Club).unwrap()], 2);

    run_crawl(config, true).await.expect("Crawl failed");
    assert_eq!(counts(&SqliteStore::new(&db_path).unwrap()), before);
}
