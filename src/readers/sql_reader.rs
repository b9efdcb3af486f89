use crate::error::{ProcessingError, Result};
use crate::models::{Cell, Table};
use crate::readers::TableQuery;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MEMORY_PATH: &str = ":memory:";

/// Read-only access to the survey database
pub struct SqlReader {
    conn: Connection,
}

impl SqlReader {
    /// Open a connection from a URI-style path (`sqlite:///survey.db`), a plain
    /// path, or `:memory:`. Files are opened read only, so a missing database
    /// fails here instead of being created empty.
    pub fn open(db_path: &str) -> Result<Self> {
        let path = resolve_db_path(db_path)?;

        let conn = if path.as_os_str() == MEMORY_PATH {
            Connection::open_in_memory()
        } else {
            Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        }
        .map_err(|e| ProcessingError::Connection {
            path: db_path.to_string(),
            message: e.to_string(),
        })?;

        info!("Opened survey database {}", path.display());
        Ok(Self { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Run a query and collect the full result set
    pub fn query(&self, sql: &str) -> Result<Table> {
        let query_error = |e: rusqlite::Error| ProcessingError::Query {
            sql: sql.trim().to_string(),
            message: e.to_string(),
        };

        let mut stmt = self.conn.prepare(sql).map_err(query_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut table = Table::new(columns);

        let mut rows = stmt.query([]).map_err(query_error)?;
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(query_error)?;
                cells.push(cell_from_value(value));
            }
            table.push_row(cells)?;
        }

        debug!("Query returned {} rows x {} columns", table.height(), table.width());
        Ok(table)
    }
}

impl TableQuery for SqlReader {
    fn query(&self, sql: &str) -> Result<Table> {
        SqlReader::query(self, sql)
    }
}

/// Strip the `sqlite://` scheme; `sqlite:///a.db` is relative, `sqlite:////a.db` absolute
fn resolve_db_path(db_path: &str) -> Result<PathBuf> {
    let trimmed = db_path.trim();
    let path = trimmed
        .strip_prefix("sqlite:///")
        .or_else(|| trimmed.strip_prefix("sqlite://"))
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);

    if path.is_empty() {
        return Err(ProcessingError::Connection {
            path: db_path.to_string(),
            message: "empty database path".to_string(),
        });
    }

    Ok(Path::new(path).to_path_buf())
}

fn cell_from_value(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(v) => Cell::Integer(v),
        ValueRef::Real(v) => Cell::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Cell::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
