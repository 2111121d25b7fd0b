use regex::Regex;
use rusqlite::{Connection, OpenFlags, Result as SqliteResult};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::info;

use crate::error::{Error, Result};
use crate::record::RawRow;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier regex"));

fn validate_table_name(table: &str) -> Result<()> {
    if IDENTIFIER.is_match(table) {
        Ok(())
    } else {
        Err(Error::InvalidTableName(table.to_string()))
    }
}

/// Reads `content` and `time` from every row of `table`. NULLs become empty strings.
pub fn load_rows(path: &Path, table: &str) -> Result<Vec<RawRow>> {
    let start_time = Instant::now();
    validate_table_name(table)?;

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    info!(action = "open", component = "sqlite_source", file_path = ?path, table = table, "Connected to database");

    let rows: Vec<RawRow> = conn
        .prepare(&format!("SELECT content, time FROM {table}"))?
        .query_map([], |row| {
            let content: Option<String> = row.get(0)?;
            let time: Option<String> = row.get(1)?;
            Ok(RawRow::new(content.unwrap_or_default(), time.unwrap_or_default()))
        })?
        .collect::<SqliteResult<Vec<RawRow>>>()?;

    info!(
        action = "complete",
        component = "sqlite_source",
        row_count = rows.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded rows from database"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsafe_table_names() {
        assert!(validate_table_name("messages").is_ok());
        assert!(validate_table_name("_chat2018").is_ok());
        assert!(validate_table_name("messages; DROP TABLE x").is_err());
        assert!(validate_table_name("").is_err());
    }

    #[test]
    fn loads_rows_and_maps_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE messages (content TEXT, time TEXT);
             INSERT INTO messages VALUES ('红包 https://h5.ele.me/a', '2018-03-01 11:00');
             INSERT INTO messages VALUES (NULL, '2018-03-01 12:00');",
        )
        .unwrap();
        drop(conn);

        let rows = load_rows(&path, "messages").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRow::new("红包 https://h5.ele.me/a", "2018-03-01 11:00"));
        assert_eq!(rows[1].content, "");
    }
}
