use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::model::{Part, Tool};
use crate::toollist;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("setup sheet not found")]
    NotFound,
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("store closed")]
    Closed,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Persistence for [`Part`] records plus the live-query fan-out.
///
/// Every successful mutation bumps a monotonic revision published on a
/// watch channel; live views re-query the table when it moves. A consumer
/// that lags behind reads the latest committed state on its next poll:
/// notifications coalesce, state is never stale.
#[derive(Clone)]
pub struct PartStore {
    pool: Pool<Sqlite>,
    revision: Arc<watch::Sender<u64>>,
}

impl PartStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            pool,
            revision: Arc::new(revision),
        }
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Insert `part`, letting SQLite assign the id when it is 0.
    ///
    /// An explicit id replaces any existing row with that id, matching the
    /// replace-on-conflict policy of the schema.
    pub async fn insert(&self, part: &Part) -> Result<i64, StoreError> {
        let explicit_id = (part.id != 0).then_some(part.id);
        let result = sqlx::query(
            "INSERT OR REPLACE INTO parts (id, title, coordinates, content, \
             main_spindle_tools, sub_spindle_tools, projection_length, bar_size, \
             sub_spindle_collet_size) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(explicit_id)
        .bind(&part.title)
        .bind(&part.coordinates)
        .bind(&part.content)
        .bind(toollist::encode_tools(&part.main_spindle_tools))
        .bind(toollist::encode_tools(&part.sub_spindle_tools))
        .bind(&part.projection_length)
        .bind(&part.bar_size)
        .bind(&part.sub_spindle_collet_size)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;

        let id = explicit_id.unwrap_or_else(|| result.last_insert_rowid());
        debug!(target: "setup_sheets", event = "part_inserted", id);
        self.bump_revision();
        Ok(id)
    }

    /// Replace the stored row sharing `part.id`.
    pub async fn update(&self, part: &Part) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE parts SET title = ?, coordinates = ?, content = ?, \
             main_spindle_tools = ?, sub_spindle_tools = ?, projection_length = ?, \
             bar_size = ?, sub_spindle_collet_size = ? WHERE id = ?",
        )
        .bind(&part.title)
        .bind(&part.coordinates)
        .bind(&part.content)
        .bind(toollist::encode_tools(&part.main_spindle_tools))
        .bind(toollist::encode_tools(&part.sub_spindle_tools))
        .bind(&part.projection_length)
        .bind(&part.bar_size)
        .bind(&part.sub_spindle_collet_size)
        .bind(part.id)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        debug!(target: "setup_sheets", event = "part_updated", id = part.id);
        self.bump_revision();
        Ok(())
    }

    /// Idempotent: deleting an id that is already gone succeeds and leaves
    /// the store (and its live views) untouched.
    pub async fn delete(&self, part: &Part) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM parts WHERE id = ?")
            .bind(part.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(target: "setup_sheets", event = "part_delete_noop", id = part.id);
            return Ok(());
        }
        debug!(target: "setup_sheets", event = "part_deleted", id = part.id);
        self.bump_revision();
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Part>, StoreError> {
        let row = sqlx::query("SELECT * FROM parts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| part_from_row(&row)).transpose()
    }

    /// Live view of every setup sheet, newest id first.
    pub fn observe_all(&self) -> LiveParts {
        LiveParts::new(self.pool.clone(), self.revision.subscribe(), PartsQuery::All)
    }

    /// Live view of sheets whose title or content contains `term`,
    /// case-insensitive and unanchored.
    pub fn search(&self, term: &str) -> LiveParts {
        LiveParts::new(
            self.pool.clone(),
            self.revision.subscribe(),
            PartsQuery::Search(term.to_string()),
        )
    }
}

fn map_constraint(err: sqlx::Error) -> StoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Constraint(db.message().to_string()),
        _ => StoreError::Db(err),
    }
}

fn part_from_row(row: &SqliteRow) -> Result<Part, StoreError> {
    let id: i64 = row.try_get("id")?;
    Ok(Part {
        id,
        title: row.try_get("title")?,
        coordinates: row.try_get("coordinates")?,
        content: row.try_get("content")?,
        main_spindle_tools: tool_column(row, "main_spindle_tools", id)?,
        sub_spindle_tools: tool_column(row, "sub_spindle_tools", id)?,
        projection_length: row.try_get("projection_length")?,
        bar_size: row.try_get("bar_size")?,
        sub_spindle_collet_size: row.try_get("sub_spindle_collet_size")?,
    })
}

/// A column written by hand or by an older build may fail to decode; the
/// row still loads, with the bad list read as empty and the anomaly logged.
fn tool_column(row: &SqliteRow, column: &str, id: i64) -> Result<Vec<Tool>, StoreError> {
    let raw: String = row.try_get(column)?;
    match toollist::decode_tools(&raw) {
        Ok(tools) => Ok(tools),
        Err(err) => {
            warn!(
                target: "setup_sheets",
                event = "tool_list_malformed",
                id,
                column,
                error = %err
            );
            Ok(Vec::new())
        }
    }
}

enum PartsQuery {
    All,
    Search(String),
}

/// A continuously-updating query over the parts table.
///
/// [`LiveParts::recv`] yields the current snapshot on first call, then a
/// fresh snapshot after each committed mutation. Dropping the value
/// unsubscribes.
pub struct LiveParts {
    pool: Pool<Sqlite>,
    revision: watch::Receiver<u64>,
    query: PartsQuery,
    primed: bool,
}

impl LiveParts {
    fn new(pool: Pool<Sqlite>, revision: watch::Receiver<u64>, query: PartsQuery) -> Self {
        Self {
            pool,
            revision,
            query,
            primed: false,
        }
    }

    /// Current snapshot first, then one snapshot per change.
    ///
    /// A query error is returned to the caller but leaves the subscription
    /// alive; the next call retries against the current revision.
    pub async fn recv(&mut self) -> Result<Vec<Part>, StoreError> {
        if self.primed {
            self.changed().await?;
        }
        let parts = self.fetch().await?;
        self.primed = true;
        Ok(parts)
    }

    /// Wait for the next committed mutation. Cancel-safe: dropping the
    /// future before it resolves leaves the revision unseen.
    pub(crate) async fn changed(&mut self) -> Result<(), StoreError> {
        self.revision.changed().await.map_err(|_| StoreError::Closed)
    }

    pub(crate) async fn fetch(&self) -> Result<Vec<Part>, StoreError> {
        let rows = match &self.query {
            PartsQuery::All => {
                sqlx::query("SELECT * FROM parts ORDER BY id DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
            PartsQuery::Search(term) => {
                sqlx::query(
                    "SELECT * FROM parts WHERE title LIKE '%' || ? || '%' \
                     OR content LIKE '%' || ? || '%' ORDER BY id DESC",
                )
                .bind(term)
                .bind(term)
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(part_from_row).collect()
    }
}
