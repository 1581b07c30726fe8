//! TiddlyWiki JSON export import.
//!
//! # Responsibility
//! - Parse a JSON array of exported tiddlers.
//! - Convert 17-digit `YYYYMMDDHHmmssSSS` timestamps to epoch milliseconds.
//! - Create one article per tiddler through the uniqueness-guarded write path.
//!
//! # Invariants
//! - Imported articles have no stable ID; they are addressed by title.
//! - A tiddler that fails validation or collides is skipped and reported;
//!   storage failures abort the whole import.

use crate::model::article::ArticleData;
use crate::repo::article_repo::{ArticleRepository, RepoError};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static TIDDLER_TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{17}$").expect("valid tiddler timestamp regex"));

/// One exported tiddler. Fields other than these four are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tiddler {
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// Import target and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Namespace receiving every imported article.
    pub namespace: String,
    /// Tiddler titles to leave out.
    pub skip_titles: BTreeSet<String>,
}

/// Tiddler that was not imported, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTiddler {
    pub title: String,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<SkippedTiddler>,
}

/// Import errors that abort the run.
#[derive(Debug)]
pub enum ImportError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    InvalidTimestamp(String),
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read tiddler export `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "malformed tiddler export: {err}"),
            Self::InvalidTimestamp(value) => write!(
                f,
                "invalid tiddler timestamp `{value}`; expected YYYYMMDDHHmmssSSS"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::InvalidTimestamp(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a tiddler export document.
pub fn parse_tiddlers(raw: &str) -> Result<Vec<Tiddler>, ImportError> {
    Ok(serde_json::from_str(raw)?)
}

/// Reads and parses a tiddler export file.
pub fn load_tiddlers(path: impl AsRef<Path>) -> Result<Vec<Tiddler>, ImportError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tiddlers(&raw)
}

/// Converts a `YYYYMMDDHHmmssSSS` UTC timestamp to epoch milliseconds.
pub fn parse_tiddler_timestamp(value: &str) -> Result<i64, ImportError> {
    let invalid = || ImportError::InvalidTimestamp(value.to_string());
    if !TIDDLER_TIMESTAMP_RE.is_match(value) {
        return Err(invalid());
    }

    // The regex guarantees 17 ASCII digits, so byte slicing is in bounds.
    let field = |range: std::ops::Range<usize>| value[range].parse::<u32>().map_err(|_| invalid());
    let year = value[0..4].parse::<i32>().map_err(|_| invalid())?;
    let date = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?).ok_or_else(invalid)?;
    let datetime = date
        .and_hms_milli_opt(field(8..10)?, field(10..12)?, field(12..14)?, field(14..17)?)
        .ok_or_else(invalid)?;

    Ok(datetime.and_utc().timestamp_millis())
}

/// Imports `tiddlers` into `options.namespace`.
pub fn import_tiddlers<R: ArticleRepository>(
    repo: &mut R,
    tiddlers: &[Tiddler],
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();
    info!(
        "event=tiddler_import module=import status=start namespace={} tiddlers={}",
        options.namespace,
        tiddlers.len()
    );

    for tiddler in tiddlers {
        if options.skip_titles.contains(&tiddler.title) {
            report.skipped.push(SkippedTiddler {
                title: tiddler.title.clone(),
                reason: "excluded by import options".to_string(),
            });
            continue;
        }

        let timestamps = tiddler_timestamps(tiddler);
        let (created_at, last_modified_at) = match timestamps {
            Ok(value) => value,
            Err(err) => {
                skip(&mut report, tiddler, err.to_string());
                continue;
            }
        };

        let data = ArticleData::new(
            options.namespace.as_str(),
            None,
            tiddler.title.as_str(),
            tiddler.text.as_str(),
        );
        match repo.import_article(&data, created_at, last_modified_at) {
            Ok(_) => report.imported.push(tiddler.title.clone()),
            Err(err @ (RepoError::IntegrityViolation(_) | RepoError::Validation(_))) => {
                skip(&mut report, tiddler, err.to_string());
            }
            Err(err) => return Err(ImportError::Repo(err)),
        }
    }

    info!(
        "event=tiddler_import module=import status=ok namespace={} imported={} skipped={}",
        options.namespace,
        report.imported.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn tiddler_timestamps(tiddler: &Tiddler) -> Result<(i64, i64), ImportError> {
    let now = Utc::now().timestamp_millis();
    let created_at = match tiddler.created.as_deref() {
        Some(value) => parse_tiddler_timestamp(value)?,
        None => now,
    };
    let last_modified_at = match tiddler.modified.as_deref() {
        Some(value) => parse_tiddler_timestamp(value)?,
        None => created_at.max(now),
    };
    Ok((created_at, last_modified_at))
}

fn skip(report: &mut ImportReport, tiddler: &Tiddler, reason: String) {
    warn!(
        "event=tiddler_import module=import status=skipped reason={}",
        reason
    );
    report.skipped.push(SkippedTiddler {
        title: tiddler.title.clone(),
        reason,
    });
}
