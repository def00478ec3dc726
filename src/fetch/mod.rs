mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Downloads `url` and decodes the body as text. Any non-success status is an
/// error.
pub fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let req = reqwest::blocking::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client
        .execute(req)
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?;
    let text = resp.text()?;

    debug!(url, bytes = text.len(), "Source downloaded");
    Ok(text)
}

/// Fetches `source` over HTTP when it is a URL, otherwise reads it from disk.
#[tracing::instrument(skip(client))]
pub fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<String> {
    let text = if source.starts_with("http") {
        fetch_text(client, source)?
    } else {
        let bytes = std::fs::read(source).with_context(|| format!("cannot read {source}"))?;
        String::from_utf8_lossy(&bytes).into_owned()
    };
    info!(bytes = text.len(), "Source loaded");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_source_reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Country/Region,1/22/20\nItaly,1\n").unwrap();

        let client = BasicClient::new().unwrap();
        let text = load_source(&client, file.path().to_str().unwrap()).unwrap();
        assert!(text.starts_with("Country/Region"));
    }

    #[test]
    fn test_load_source_missing_file() {
        let client = BasicClient::new().unwrap();
        let result = load_source(&client, "/nonexistent/covid_rates/cases.csv");
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_text_rejects_bad_url() {
        let client = BasicClient::new().unwrap();
        assert!(fetch_text(&client, "not a url").is_err());
    }
}
