use async_trait::async_trait;
use chrono::NaiveDate;
use movie_log_config::DatabaseConfig;
use movie_log_models::{DateRange, ImdbId, NewViewing, PriorViewing, ViewingEntry};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError};
use sqlx::{Connection, FromRow};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::LogBackend;
use crate::error::StoreError;

const SELECT_BETWEEN: &str = "SELECT movieTitle, viewingDate, movieURL, viewFormat, viewLocation, \
     CAST(firstViewing AS SIGNED) AS firstViewing, movieGenre, movieReview \
     FROM movies WHERE viewingDate BETWEEN ? AND ?";

const SELECT_BY_URL: &str = "SELECT movieTitle, movieGenre, viewingDate, viewFormat, viewLocation, movieReview, movieURL \
     FROM movies WHERE movieURL LIKE ? ORDER BY viewingDate DESC";

const INSERT_VIEWING: &str = "INSERT INTO movies \
     (movieTitle, viewingDate, movieURL, viewFormat, viewLocation, movieGenre, movieReview, firstViewing) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/// MySQL error numbers the server raises for values it cannot store.
///
/// In non-strict SQL modes MariaDB reports some of these without a 22/23
/// SQLSTATE, so the number is checked as well as the state class.
const BAD_VALUE_ERRORS: [u16; 6] = [
    1048, // column cannot be null
    1264, // out of range
    1292, // truncated incorrect value
    1366, // incorrect value for column
    1406, // data too long
    1411, // incorrect value for function
];

#[derive(Debug, FromRow)]
struct ViewingRow {
    #[sqlx(rename = "movieTitle")]
    movie_title: Option<String>,
    #[sqlx(rename = "viewingDate")]
    viewing_date: Option<NaiveDate>,
    #[sqlx(rename = "movieURL")]
    movie_url: Option<String>,
    #[sqlx(rename = "viewFormat")]
    view_format: Option<String>,
    #[sqlx(rename = "viewLocation")]
    view_location: Option<String>,
    #[sqlx(rename = "firstViewing")]
    first_viewing: Option<i64>,
    #[sqlx(rename = "movieGenre")]
    movie_genre: Option<String>,
    #[sqlx(rename = "movieReview")]
    movie_review: Option<String>,
}

impl From<ViewingRow> for ViewingEntry {
    fn from(row: ViewingRow) -> Self {
        Self {
            movie_title: row.movie_title.unwrap_or_default(),
            viewing_date: row.viewing_date,
            movie_url: row.movie_url.unwrap_or_default(),
            view_format: row.view_format.unwrap_or_default(),
            view_location: row.view_location.unwrap_or_default(),
            first_viewing: row.first_viewing == Some(1),
            movie_genre: row.movie_genre.unwrap_or_default(),
            movie_review: row.movie_review.unwrap_or_default(),
        }
    }
}

#[derive(Debug, FromRow)]
struct PriorRow {
    #[sqlx(rename = "movieTitle")]
    movie_title: Option<String>,
    #[sqlx(rename = "movieGenre")]
    movie_genre: Option<String>,
    #[sqlx(rename = "viewingDate")]
    viewing_date: Option<NaiveDate>,
    #[sqlx(rename = "viewFormat")]
    view_format: Option<String>,
    #[sqlx(rename = "viewLocation")]
    view_location: Option<String>,
    #[sqlx(rename = "movieReview")]
    movie_review: Option<String>,
    #[sqlx(rename = "movieURL")]
    movie_url: Option<String>,
}

impl From<PriorRow> for PriorViewing {
    fn from(row: PriorRow) -> Self {
        Self {
            movie_title: row.movie_title.unwrap_or_default(),
            movie_genre: row.movie_genre.unwrap_or_default(),
            viewing_date: row.viewing_date,
            view_format: row.view_format.unwrap_or_default(),
            view_location: row.view_location.unwrap_or_default(),
            movie_review: row.movie_review.unwrap_or_default(),
        }
    }
}

/// Single shared MySQL/MariaDB connection.
///
/// Requests are serialized on the connection mutex; a reconnect swaps the
/// connection while holding the same lock.
pub struct MySqlBackend {
    options: MySqlConnectOptions,
    conn: Mutex<MySqlConnection>,
}

impl MySqlBackend {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| StoreError::ConnectionLost(e.to_string()))?;

        info!(
            operation = "db_connect",
            host = %config.host,
            database = %config.name,
            "Connected to MySQL"
        );

        Ok(Self {
            options,
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl LogBackend for MySqlBackend {
    fn backend_name(&self) -> &str {
        "mysql"
    }

    async fn rows_between(&self, range: &DateRange) -> Result<Vec<ViewingEntry>, StoreError> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<ViewingRow> = sqlx::query_as(SELECT_BETWEEN)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&mut *conn)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(ViewingEntry::from).collect())
    }

    async fn viewings_of(&self, imdb_id: &ImdbId) -> Result<Vec<PriorViewing>, StoreError> {
        // ImdbId holds only `tt` and digits, so it carries no LIKE wildcards
        // LIKE narrows the scan; exact token matching happens below so tt123 never hits tt1234
        let pattern = format!("%{}%", imdb_id.as_str());
        let mut conn = self.conn.lock().await;
        let rows: Vec<PriorRow> = sqlx::query_as(SELECT_BY_URL)
            .bind(pattern)
            .fetch_all(&mut *conn)
            .await
            .map_err(classify)?;
        drop(conn);

        let candidates = rows.len();
        let matches: Vec<PriorViewing> = rows
            .into_iter()
            .filter(|row| {
                row.movie_url
                    .as_deref()
                    .map_or(false, |url| imdb_id.is_contained_in(url))
            })
            .map(PriorViewing::from)
            .collect();
        debug!(
            operation = "viewings_of",
            imdb_id = %imdb_id,
            candidates,
            matches = matches.len(),
            "Looked up prior viewings"
        );
        Ok(matches)
    }

    async fn insert(&self, entry: &NewViewing) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        sqlx::query(INSERT_VIEWING)
            .bind(&entry.movie_title)
            .bind(entry.viewing_date)
            .bind(&entry.movie_url)
            .bind(&entry.view_format)
            .bind(&entry.view_location)
            .bind(&entry.movie_genre)
            .bind(&entry.movie_review)
            .bind(entry.first_viewing_flag())
            .execute(&mut *conn)
            .await
            .map_err(classify_insert)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        conn.ping().await.map_err(classify)
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().await;
        let fresh = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| StoreError::ConnectionLost(e.to_string()))?;
        // the stale connection is already broken; dropping it is enough
        *conn = fresh;
        info!(operation = "db_reconnect", "Reconnected to MySQL");
        Ok(())
    }
}

// Protocol errors show up when the server closes an idle socket mid-packet
// (wait_timeout), so they are treated like a dropped connection and earn one
// reconnect. Everything else is a real statement failure.
fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn classify(err: sqlx::Error) -> StoreError {
    if is_connection_error(&err) {
        StoreError::ConnectionLost(err.to_string())
    } else {
        StoreError::Database(err.to_string())
    }
}

/// Insert failures caused by the submitted values (bad dates, overlong text,
/// NULLs) become `InvalidParams` so the caller answers with a param error
/// instead of a server fault.
fn classify_insert(err: sqlx::Error) -> StoreError {
    let bad_value = err.as_database_error().map_or(false, |db| {
        let sqlstate_class = db.code().map_or(false, |code| code.starts_with("22") || code.starts_with("23"));
        let number = db
            .try_downcast_ref::<MySqlDatabaseError>()
            .map_or(false, |e| BAD_VALUE_ERRORS.contains(&e.number()));
        sqlstate_class || number
    });
    if bad_value {
        StoreError::InvalidParams(err.to_string())
    } else {
        classify(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_parameterized() {
        for sql in [SELECT_BETWEEN, SELECT_BY_URL, INSERT_VIEWING] {
            assert!(!sql.contains('%'), "{}", sql);
            assert!(!sql.contains('\''), "{}", sql);
        }
        assert_eq!(INSERT_VIEWING.matches('?').count(), 8);
        assert!(SELECT_BETWEEN.contains("BETWEEN ? AND ?"));
    }

    #[test]
    fn test_connection_errors_are_transient() {
        let io = sqlx::Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));
        assert!(classify(io).is_connection_lost());
        assert!(classify(sqlx::Error::PoolTimedOut).is_connection_lost());
        assert!(!classify(sqlx::Error::RowNotFound).is_connection_lost());
    }

    #[test]
    fn test_row_decoding_defaults() {
        let row = ViewingRow {
            movie_title: Some("Heat".to_string()),
            viewing_date: None,
            movie_url: None,
            view_format: None,
            view_location: None,
            first_viewing: Some(0),
            movie_genre: Some("Crime".to_string()),
            movie_review: None,
        };
        let entry = ViewingEntry::from(row);
        assert_eq!(entry.movie_title, "Heat");
        assert_eq!(entry.movie_url, "");
        assert!(!entry.first_viewing);
        assert!(entry.viewing_date.is_none());
    }
}
