use tokio::sync::watch;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::model::Part;
use crate::repo::PartRepository;
use crate::store::{LiveParts, StoreError};

/// Presentation state for the list screen: a live filter joined with the
/// repository's live record stream.
///
/// The model's lifetime matches the owning screen scope; dropping it (and
/// the [`VisibleParts`] handles it produced) tears every subscription down.
pub struct PartListModel {
    repo: PartRepository,
    filter: watch::Sender<String>,
}

impl PartListModel {
    pub fn new(repo: PartRepository) -> Self {
        let (filter, _) = watch::channel(String::new());
        Self { repo, filter }
    }

    /// Last-write-wins; takes effect on the next join emission.
    pub fn set_filter(&self, text: impl Into<String>) {
        self.filter.send_replace(text.into());
    }

    pub fn filter(&self) -> String {
        self.filter.borrow().clone()
    }

    /// Subscribe to the filtered record list. Each call returns an
    /// independent subscription.
    pub fn visible(&self) -> VisibleParts {
        VisibleParts {
            parts: self.repo.all_parts(),
            filter: self.filter.subscribe(),
            latest: Vec::new(),
            primed: false,
        }
    }

    pub async fn add(&self, part: &Part) -> AppResult<i64> {
        self.repo
            .insert(part)
            .await
            .map_err(|err| AppError::from(err).with_context("operation", "add"))
    }

    /// An update targeting an id that has already disappeared is logged and
    /// ignored; the record is gone from the user's perspective either way.
    pub async fn update(&self, part: &Part) -> AppResult<()> {
        match self.repo.update(part).await {
            Err(StoreError::NotFound) => {
                warn!(target: "setup_sheets", event = "part_update_missing", id = part.id);
                Ok(())
            }
            other => other.map_err(|err| AppError::from(err).with_context("operation", "update")),
        }
    }

    pub async fn delete(&self, part: &Part) -> AppResult<()> {
        self.repo
            .delete(part)
            .await
            .map_err(|err| AppError::from(err).with_context("operation", "delete"))
    }
}

/// The continuous join of the live record stream and the live filter.
pub struct VisibleParts {
    parts: LiveParts,
    filter: watch::Receiver<String>,
    latest: Vec<Part>,
    primed: bool,
}

impl VisibleParts {
    /// Yield the current filtered list, then one list per change on either
    /// side of the join.
    ///
    /// A store error is returned to the caller but the subscriptions stay
    /// alive; the next call picks up from the current revision.
    pub async fn recv(&mut self) -> AppResult<Vec<Part>> {
        if self.primed {
            tokio::select! {
                changed = self.parts.changed() => {
                    changed?;
                    self.latest = self.parts.fetch().await?;
                }
                changed = self.filter.changed() => {
                    changed.map_err(|_| {
                        AppError::new("STATE/FILTER_CLOSED", "The list model has shut down")
                    })?;
                }
            }
        } else {
            self.latest = self.parts.fetch().await?;
            self.primed = true;
        }
        let filter = self.filter.borrow_and_update().clone();
        Ok(filter_parts(&self.latest, &filter))
    }
}

/// A blank (after trimming) filter passes the list through unchanged;
/// otherwise the raw filter text must appear in the title or content,
/// case-insensitively. Ordering is whatever the store emitted.
fn filter_parts(parts: &[Part], filter: &str) -> Vec<Part> {
    if filter.trim().is_empty() {
        return parts.to_vec();
    }
    let needle = filter.to_lowercase();
    parts
        .iter()
        .filter(|part| {
            part.title.to_lowercase().contains(&needle)
                || part.content.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
