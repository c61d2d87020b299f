#![forbid(unsafe_code)]

use gs_core::CandidateEntry;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// category, tick type, source repo, description, source URL.
pub(crate) const FEED_COLUMNS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FeedSource {
    Http { url: String, timeout: Duration },
    File(PathBuf),
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url, .. } => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum FeedError {
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("reading response body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("reading {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed feed at line {line}: {reason}")]
    Parse { line: u64, reason: String },
}

/// Loads and parses the whole feed. Either every row parses or nothing is returned.
pub(crate) fn fetch(source: &FeedSource) -> Result<Vec<CandidateEntry>, FeedError> {
    let body = match source {
        FeedSource::Http { url, timeout } => download(url, *timeout)?,
        FeedSource::File(path) => std::fs::read(path).map_err(|source| FeedError::Read {
            path: path.clone(),
            source,
        })?,
    };
    log::debug!("read {} byte(s) from {source}", body.len());
    parse_feed(body.as_slice())
}

fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, FeedError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|source| FeedError::Fetch {
        url: url.to_string(),
        source: Box::new(source),
    })?;

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|source| FeedError::Body {
            url: url.to_string(),
            source,
        })?;
    Ok(body)
}

pub(crate) fn parse_feed(reader: impl Read) -> Result<Vec<CandidateEntry>, FeedError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .quote(b'"')
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |pos| pos.line());
        if record.len() != FEED_COLUMNS {
            return Err(FeedError::Parse {
                line,
                reason: format!("expected {FEED_COLUMNS} columns, found {}", record.len()),
            });
        }
        let entry: CandidateEntry = record.deserialize(None).map_err(|err| FeedError::Parse {
            line,
            reason: err.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn csv_error(err: csv::Error) -> FeedError {
    FeedError::Parse {
        line: err.position().map_or(0, |pos| pos.line()),
        reason: err.to_string(),
    }
}
