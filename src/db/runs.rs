use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

#[derive(Debug, Clone)]
pub struct ScrapeRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sites: String,
    pub pages_per_site: i64,
    pub pages_fetched: Option<i64>,
    pub properties_found: Option<i64>,
    pub outcome: String,
    pub error_message: Option<String>,
}

pub fn start_run(
    conn: &Connection,
    started_at: DateTime<Utc>,
    sites: &str,
    pages_per_site: u32,
) -> Result<i64, ServerError> {
    conn.execute(
        "INSERT INTO scrape_runs (started_at, sites, pages_per_site, outcome) VALUES (?, ?, ?, 'running')",
        params![started_at, sites, pages_per_site],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

pub fn end_run(
    conn: &Connection,
    run_id: i64,
    finished_at: DateTime<Utc>,
    pages_fetched: u32,
    properties_found: usize,
    outcome: &str,
    error: Option<&str>,
) -> Result<(), ServerError> {
    conn.execute(
        "UPDATE scrape_runs SET finished_at = ?, pages_fetched = ?, properties_found = ?, outcome = ?, error_message = ? WHERE id = ?",
        params![finished_at, pages_fetched, properties_found as i64, outcome, error, run_id],
    )
    .map_err(|e| ServerError::DbError(e.to_string()))?;
    Ok(())
}

pub fn recent_runs(conn: &Connection, limit: u32) -> Result<Vec<ScrapeRun>, ServerError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, started_at, finished_at, sites, pages_per_site, pages_fetched, properties_found, outcome, error_message
             FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT ?",
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(ScrapeRun {
                id: row.get(0)?,
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                sites: row.get(3)?,
                pages_per_site: row.get(4)?,
                pages_fetched: row.get(5)?,
                properties_found: row.get(6)?,
                outcome: row.get(7)?,
                error_message: row.get(8)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(runs)
}
