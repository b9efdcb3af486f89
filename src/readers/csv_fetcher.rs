use crate::error::{ProcessingError, Result};
use crate::models::{Cell, Table};
use crate::readers::CsvSource;
use crate::utils::constants::FETCH_TIMEOUT_SECS;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches CSV resources over HTTP(S) or from the local filesystem
pub struct CsvFetcher {
    timeout: Duration,
}

impl CsvFetcher {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }

    /// Retrieve and parse a CSV resource. `http(s)://` locations are fetched,
    /// `file://` locations and plain paths are read from disk.
    pub fn fetch_csv(&self, location: &str) -> Result<Table> {
        let bytes = if is_remote(location) {
            self.fetch_remote(location)?
        } else {
            read_local(location)?
        };

        let text = decode(&bytes, location);
        let table = parse_csv(&text, location)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.height(),
            table.width(),
            location
        );
        Ok(table)
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |message: String| ProcessingError::Fetch {
            location: url.to_string(),
            message,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(e.to_string()))?;

        debug!("GET {}", url);
        let response = client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP status {}", status)));
        }

        let body = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl Default for CsvFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSource for CsvFetcher {
    fn fetch_csv(&self, location: &str) -> Result<Table> {
        CsvFetcher::fetch_csv(self, location)
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn read_local(location: &str) -> Result<Vec<u8>> {
    let trimmed = location.trim();
    let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
    std::fs::read(Path::new(path)).map_err(|e| ProcessingError::Fetch {
        location: location.to_string(),
        message: e.to_string(),
    })
}

/// UTF-8 first, Windows-1252 for anything else
fn decode(bytes: &[u8], location: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => {
            warn!("{} is not valid UTF-8, decoding as Windows-1252", location);
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Parse CSV text into a table, inferring cell types
pub fn parse_csv(text: &str, location: &str) -> Result<Table> {
    let parse_error = |message: String| ProcessingError::Parse {
        location: location.to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| parse_error(e.to_string()))?;
    if headers.is_empty() {
        return Err(parse_error("missing header row".to_string()));
    }
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record.map_err(|e| parse_error(e.to_string()))?;
        table.push_row(record.iter().map(Cell::infer).collect())?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::NamedTempFile;

    /// Answer a single request on a loopback port with a canned response
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1");
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
        });

        format!("http://{}/weather_data_field_mapping.csv", addr)
    }

    #[test]
    fn test_parse_csv_infers_cells() -> Result<()> {
        let table = parse_csv(
            "Weather_station_ID,Message\n0,\"Rainfall: 2.3mm\"\n1,Pollution at 3.5\n",
            "inline",
        )?;

        assert_eq!(table.columns(), &["Weather_station_ID", "Message"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, 0), Some(&Cell::Integer(0)));
        assert_eq!(
            table.cell(1, 1),
            Some(&Cell::Text("Pollution at 3.5".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_ragged_csv_is_parse_error() {
        let err = parse_csv("a,b\n1,2,3\n", "inline").unwrap_err();
        assert!(matches!(err, ProcessingError::Parse { .. }));
    }

    #[test]
    fn test_empty_csv_is_parse_error() {
        let err = parse_csv("", "inline").unwrap_err();
        assert!(matches!(err, ProcessingError::Parse { .. }));
    }

    #[test]
    fn test_fetch_local_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Field_ID,Weather_station_ID")?;
        writeln!(file, "40734,4")?;

        let fetcher = CsvFetcher::new();
        let table = fetcher.fetch_csv(&file.path().display().to_string())?;
        assert_eq!(table.shape(), (1, 2));

        let url = format!("file://{}", file.path().display());
        assert_eq!(fetcher.fetch_csv(&url)?, table);
        Ok(())
    }

    #[test]
    fn test_missing_local_file_is_fetch_error() {
        let err = CsvFetcher::new()
            .fetch_csv("/nonexistent/weather.csv")
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Fetch { .. }));
    }

    #[test]
    fn test_fetch_remote_csv() -> Result<()> {
        let url = serve_once("200 OK", "Field_ID,Weather_station_ID\n40734,4\n30629,1\n");

        let table = CsvFetcher::new().fetch_csv(&url)?;
        assert_eq!(table.columns(), &["Field_ID", "Weather_station_ID"]);
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.cell(1, 0), Some(&Cell::Integer(30629)));
        Ok(())
    }

    #[test]
    fn test_http_error_status_is_fetch_error() {
        let url = serve_once("404 Not Found", "missing");

        let err = CsvFetcher::new().fetch_csv(&url).unwrap_err();
        match err {
            ProcessingError::Fetch { location, message } => {
                assert_eq!(location, url);
                assert!(message.contains("404"), "message: {}", message);
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_1252_fallback() {
        let bytes = b"Location\nR\xe9gion\n";
        let text = decode(bytes, "inline");
        assert!(text.contains("Région"));
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/data.csv"));
        assert!(is_remote("HTTP://example.org/data.csv"));
        assert!(!is_remote("file:///tmp/data.csv"));
        assert!(!is_remote("data/weather.csv"));
    }
}
