use std::path::Path;

use anyhow::Result as AnyResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Executor, Pool, Sqlite};

/// Bumped whenever the `parts` table shape changes. Any mismatch wipes and
/// recreates the table; there is no migration history to replay.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_PARTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS parts (\
       id INTEGER PRIMARY KEY AUTOINCREMENT,\
       title TEXT NOT NULL,\
       coordinates TEXT NOT NULL,\
       content TEXT NOT NULL,\
       main_spindle_tools TEXT NOT NULL,\
       sub_spindle_tools TEXT NOT NULL,\
       projection_length TEXT NOT NULL,\
       bar_size TEXT NOT NULL,\
       sub_spindle_collet_size TEXT NOT NULL\
     )";

/// Open the database file, creating it (and its parent directory) on first
/// run. One connection only; SQLite serializes statements on it.
pub async fn open_sqlite_pool(db_path: &Path) -> AnyResult<Pool<Sqlite>> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!(
                target: "setup_sheets",
                error = %e,
                event = "db_dir_create_failed",
                path = %parent.display()
            );
            e
        })?;
    }
    tracing::info!(target: "setup_sheets", event = "db_path", path = %db_path.display());

    let opts = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(|conn, _| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys=ON;")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA busy_timeout = 5000;")
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, sqlx::Error>(())
            })
        })
        .connect_with(opts)
        .await?;

    log_effective_pragmas(&pool).await;

    Ok(pool)
}

async fn log_effective_pragmas(pool: &Pool<Sqlite>) {
    use tracing::{info, warn};

    let jm: (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(pool)
        .await
        .unwrap_or((String::from("unknown"),));

    let busy: (i64,) = sqlx::query_as("PRAGMA busy_timeout;")
        .fetch_one(pool)
        .await
        .unwrap_or((i64::MIN,));

    info!(
        target: "setup_sheets",
        event = "db_opened",
        journal_mode = %jm.0,
        busy_timeout = busy.0
    );

    if !jm.0.eq_ignore_ascii_case("wal") {
        warn!(
            target: "setup_sheets",
            event = "db_open_warning",
            msg = "journal_mode != WAL; running with reduced crash safety"
        );
    }
}

/// Create the schema, destructively resetting it when the stored version
/// does not match [`SCHEMA_VERSION`].
pub async fn init_schema(pool: &Pool<Sqlite>) -> AnyResult<()> {
    let (version,): (i64,) = sqlx::query_as("PRAGMA user_version;").fetch_one(pool).await?;
    if version != 0 && version != SCHEMA_VERSION {
        tracing::warn!(
            target: "setup_sheets",
            event = "schema_destructive_reset",
            from = version,
            to = SCHEMA_VERSION
        );
        pool.execute("DROP TABLE IF EXISTS parts").await?;
    }
    pool.execute(CREATE_PARTS_TABLE).await?;
    if version != SCHEMA_VERSION {
        let set_version = format!("PRAGMA user_version = {SCHEMA_VERSION};");
        pool.execute(set_version.as_str()).await?;
    }
    Ok(())
}
