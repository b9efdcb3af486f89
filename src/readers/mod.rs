pub mod csv_fetcher;
pub mod sql_reader;

pub use csv_fetcher::{parse_csv, CsvFetcher};
pub use sql_reader::SqlReader;

use crate::error::Result;
use crate::models::Table;

/// Something that can answer a SQL query with a table
pub trait TableQuery {
    fn query(&self, sql: &str) -> Result<Table>;
}

/// Something that can produce a table from a CSV location
pub trait CsvSource {
    fn fetch_csv(&self, location: &str) -> Result<Table>;
}
