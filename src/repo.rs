use crate::model::Part;
use crate::store::{LiveParts, PartStore, StoreError};

/// Pass-through façade between the state layer and the storage layer.
///
/// Exists so the store implementation can be swapped (or doubled in tests)
/// without touching the state holder's contract. No validation happens
/// here; the editor owns that.
#[derive(Clone)]
pub struct PartRepository {
    store: PartStore,
}

impl PartRepository {
    pub fn new(store: PartStore) -> Self {
        Self { store }
    }

    /// Every record, newest id first, as a live stream.
    pub fn all_parts(&self) -> LiveParts {
        self.store.observe_all()
    }

    /// Records whose title or content contains `term`, as a live stream.
    pub fn search(&self, term: &str) -> LiveParts {
        self.store.search(term)
    }

    pub async fn insert(&self, part: &Part) -> Result<i64, StoreError> {
        self.store.insert(part).await
    }

    pub async fn update(&self, part: &Part) -> Result<(), StoreError> {
        self.store.update(part).await
    }

    pub async fn delete(&self, part: &Part) -> Result<(), StoreError> {
        self.store.delete(part).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Part>, StoreError> {
        self.store.get_by_id(id).await
    }
}
