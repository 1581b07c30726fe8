//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve `(namespace, id-or-title)` lookups against the `articles` table.
//! - Provide insert/update/count operations for article records.
//! - Route every mutation through the uniqueness-guarded transaction.
//!
//! # Invariants
//! - Write paths call `ArticleData::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing order is `namespace ASC, title ASC`.

use crate::db::DbError;
use crate::model::article::{ArticleData, ArticleValidationError};
use crate::model::locator::Locator;
use crate::repo::uniqueness::{count_name_matches, guarded_write, IntegrityViolation};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ARTICLE_SELECT_SQL: &str = "SELECT
    row_id,
    namespace,
    article_id,
    title,
    text,
    created_at,
    last_modified_at
FROM articles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for article persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    NotFound(Locator),
    IntegrityViolation(IntegrityViolation),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(locator) => write!(f, "article not found: {locator}"),
            Self::IntegrityViolation(violation) => write!(f, "{violation}"),
            Self::InvalidData(message) => write!(f, "invalid persisted article data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persisted article row: content fields plus bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArticle {
    pub data: ArticleData,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Last write time in epoch milliseconds.
    pub last_modified_at: i64,
}

/// Repository interface for article storage.
pub trait ArticleRepository {
    /// Finds the record whose id or title equals `locator.name`.
    fn find_article(&self, locator: &Locator) -> RepoResult<Option<StoredArticle>>;
    /// Lists records in the given namespaces.
    fn list_articles(&self, namespaces: &[String]) -> RepoResult<Vec<StoredArticle>>;
    /// Returns every namespace that holds at least one record, sorted.
    fn list_namespaces(&self) -> RepoResult<Vec<String>>;
    /// Counts records in `namespace` whose id or title equals `name`.
    fn count_name_matches(&self, namespace: &str, name: &str) -> RepoResult<u32>;
    /// Inserts a new record stamped with the current time.
    fn create_article(&mut self, data: &ArticleData) -> RepoResult<StoredArticle>;
    /// Inserts a new record carrying externally supplied timestamps.
    fn import_article(
        &mut self,
        data: &ArticleData,
        created_at: i64,
        last_modified_at: i64,
    ) -> RepoResult<StoredArticle>;
    /// Replaces all fields of the record `locator` resolves to.
    fn update_article(&mut self, locator: &Locator, data: &ArticleData)
        -> RepoResult<StoredArticle>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        if !table_exists(conn, "articles")? {
            return Err(RepoError::MissingRequiredTable("articles"));
        }
        Ok(Self { conn })
    }

    fn insert(
        &mut self,
        operation: &'static str,
        data: &ArticleData,
        created_at: i64,
        last_modified_at: i64,
    ) -> RepoResult<StoredArticle> {
        data.validate()?;

        guarded_write(self.conn, operation, data, |tx| {
            tx.execute(
                "INSERT INTO articles (
                    namespace,
                    article_id,
                    title,
                    text,
                    created_at,
                    last_modified_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    data.namespace.as_str(),
                    data.id.as_deref(),
                    data.title.as_str(),
                    data.text.as_str(),
                    created_at,
                    last_modified_at,
                ],
            )?;
            load_by_row_id(tx, tx.last_insert_rowid())
        })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn find_article(&self, locator: &Locator) -> RepoResult<Option<StoredArticle>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTICLE_SELECT_SQL}
             WHERE namespace = ?1
               AND (article_id = ?2 OR title = ?2)
             ORDER BY (article_id = ?2) DESC, row_id ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![locator.namespace, locator.name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }

        Ok(None)
    }

    fn list_articles(&self, namespaces: &[String]) -> RepoResult<Vec<StoredArticle>> {
        if namespaces.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; namespaces.len()].join(", ");
        let sql = format!(
            "{ARTICLE_SELECT_SQL}
             WHERE namespace IN ({placeholders})
             ORDER BY namespace ASC, title ASC"
        );
        let bind_values = namespaces
            .iter()
            .map(|namespace| Value::Text(namespace.clone()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }

    fn list_namespaces(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT namespace FROM articles ORDER BY namespace ASC;")?;
        let mut rows = stmt.query([])?;
        let mut namespaces = Vec::new();
        while let Some(row) = rows.next()? {
            namespaces.push(row.get(0)?);
        }
        Ok(namespaces)
    }

    fn count_name_matches(&self, namespace: &str, name: &str) -> RepoResult<u32> {
        Ok(count_name_matches(&*self.conn, namespace, name)?)
    }

    fn create_article(&mut self, data: &ArticleData) -> RepoResult<StoredArticle> {
        let now = now_epoch_ms();
        self.insert("create", data, now, now)
    }

    fn import_article(
        &mut self,
        data: &ArticleData,
        created_at: i64,
        last_modified_at: i64,
    ) -> RepoResult<StoredArticle> {
        self.insert("import", data, created_at, last_modified_at)
    }

    fn update_article(
        &mut self,
        locator: &Locator,
        data: &ArticleData,
    ) -> RepoResult<StoredArticle> {
        data.validate()?;
        let now = now_epoch_ms();

        guarded_write(self.conn, "update", data, |tx| {
            let row_id: Option<i64> = tx
                .query_row(
                    "SELECT row_id
                     FROM articles
                     WHERE namespace = ?1
                       AND (article_id = ?2 OR title = ?2)
                     ORDER BY (article_id = ?2) DESC, row_id ASC
                     LIMIT 1;",
                    params![locator.namespace, locator.name],
                    |row| row.get(0),
                )
                .optional()?;
            let row_id = row_id.ok_or_else(|| RepoError::NotFound(locator.clone()))?;

            tx.execute(
                "UPDATE articles
                 SET
                    namespace = ?1,
                    article_id = ?2,
                    title = ?3,
                    text = ?4,
                    last_modified_at = ?5
                 WHERE row_id = ?6;",
                params![
                    data.namespace.as_str(),
                    data.id.as_deref(),
                    data.title.as_str(),
                    data.text.as_str(),
                    now,
                    row_id,
                ],
            )?;
            load_by_row_id(tx, row_id)
        })
    }
}

fn load_by_row_id(conn: &Connection, row_id: i64) -> RepoResult<StoredArticle> {
    let mut stmt = conn.prepare(&format!("{ARTICLE_SELECT_SQL} WHERE row_id = ?1;"))?;
    let mut rows = stmt.query([row_id])?;
    match rows.next()? {
        Some(row) => parse_article_row(row),
        None => Err(RepoError::InvalidData(format!(
            "article row {row_id} missing in read-back"
        ))),
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<StoredArticle> {
    let row_id: i64 = row.get("row_id")?;
    let data = ArticleData {
        namespace: row.get("namespace")?,
        id: row.get("article_id")?,
        title: row.get("title")?,
        text: row.get("text")?,
    };
    data.validate()
        .map_err(|err| RepoError::InvalidData(format!("articles.row_id={row_id}: {err}")))?;

    Ok(StoredArticle {
        data,
        created_at: row.get("created_at")?,
        last_modified_at: row.get("last_modified_at")?,
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
