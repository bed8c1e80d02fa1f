pub mod db;
pub mod editor;
mod error;
pub mod model;
pub mod repo;
pub mod state;
pub mod store;
pub mod toollist;

pub use editor::{EditorForm, ToolRow, ValidationError, NEW_PART_ID};
pub use error::{AppError, AppResult};
pub use model::{Part, Tool};
pub use repo::PartRepository;
pub use state::{PartListModel, VisibleParts};
pub use store::{LiveParts, PartStore, StoreError};

/// Install the tracing subscriber. Safe to call more than once; only the
/// first call wins.
///
/// Events go to stderr; stdout stays reserved for command output.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("setup_sheets=info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
