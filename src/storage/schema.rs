//! Database schema definitions
//!
//! Column affinities mirror the row types: `TEXT` for string fields,
//! `INTEGER` for IDs, counts and flags. A string stored under `INTEGER`
//! affinity would come back as a number and fail to load.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS locais (
    id INTEGER PRIMARY KEY,
    cidade TEXT NOT NULL,
    uf TEXT NOT NULL,
    estado TEXT NOT NULL,
    regiao TEXT NOT NULL,
    pais TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clubes (
    id INTEGER PRIMARY KEY,
    clube TEXT NOT NULL,
    apelido TEXT NOT NULL,
    local_id INTEGER,
    fundacao TEXT NOT NULL,
    ativo INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS estadios (
    id INTEGER PRIMARY KEY,
    estadio TEXT NOT NULL,
    capacidade INTEGER,
    local_id INTEGER,
    inauguracao TEXT NOT NULL,
    ativo INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS jogadores (
    id INTEGER PRIMARY KEY,
    nome TEXT NOT NULL,
    nascimento TEXT NOT NULL,
    falecimento TEXT NOT NULL,
    nacionalidade TEXT NOT NULL,
    naturalidade TEXT NOT NULL,
    altura INTEGER,
    peso INTEGER,
    posicao TEXT NOT NULL,
    pe_preferido TEXT NOT NULL,
    aposentado INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS treinadores (
    id INTEGER PRIMARY KEY,
    nome TEXT NOT NULL,
    nascimento TEXT NOT NULL,
    falecimento TEXT NOT NULL,
    nacionalidade TEXT NOT NULL,
    naturalidade TEXT NOT NULL,
    situacao TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS arbitros (
    id INTEGER PRIMARY KEY,
    nome TEXT NOT NULL,
    nascimento TEXT NOT NULL,
    falecimento TEXT NOT NULL,
    nacionalidade TEXT NOT NULL,
    naturalidade TEXT NOT NULL,
    situacao TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS partidas (
    id INTEGER PRIMARY KEY,
    edicao_id INTEGER NOT NULL,
    data TEXT NOT NULL,
    hora TEXT NOT NULL,
    fase TEXT NOT NULL,
    rodada TEXT NOT NULL,
    estadio_id INTEGER,
    mandante_id INTEGER NOT NULL,
    visitante_id INTEGER NOT NULL,
    mandante_placar INTEGER,
    visitante_placar INTEGER,
    placar_status TEXT NOT NULL,
    mandante_penalti INTEGER,
    visitante_penalti INTEGER,
    prorrogacao INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_partidas_data ON partidas(data);

CREATE TABLE IF NOT EXISTS jogadores_em_partida (
    partida_id INTEGER NOT NULL,
    jogador_id INTEGER NOT NULL,
    clube_id INTEGER NOT NULL,
    titular INTEGER NOT NULL,
    posicao_jogada TEXT NOT NULL,
    numero_camisa INTEGER
);

CREATE INDEX IF NOT EXISTS idx_jogadores_em_partida_partida ON jogadores_em_partida(partida_id);

CREATE TABLE IF NOT EXISTS treinadores_em_partida (
    partida_id INTEGER NOT NULL,
    treinador_id INTEGER,
    clube_id INTEGER NOT NULL,
    titular INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS arbitros_em_partida (
    partida_id INTEGER NOT NULL,
    arbitro_id INTEGER
);

CREATE TABLE IF NOT EXISTS eventos_partida (
    id INTEGER PRIMARY KEY,
    partida_id INTEGER NOT NULL,
    jogador_id INTEGER NOT NULL,
    clube_id INTEGER NOT NULL,
    tipo_evento TEXT NOT NULL,
    tipo_gol TEXT,
    minuto TEXT
);

CREATE INDEX IF NOT EXISTS idx_eventos_partida_partida ON eventos_partida(partida_id);

-- Single-row crawl position
CREATE TABLE IF NOT EXISTS crawl_checkpoint (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    address TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_every_table_exists_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let names = Table::ALL
            .iter()
            .map(|t| t.name())
            .chain(std::iter::once("crawl_checkpoint"));

        for table in names {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
