//! Runtime-selected store.
//!
//! The binary picks a backend from configuration; everything above it is
//! generic over [`CounterStore`] and sees this enum as one more store.

use crate::dragonfly::DragonflyStore;
use crate::error::StoreError;
use crate::file::FileStore;
use crate::CounterStore;

/// Either of the concrete stores.
#[derive(Clone)]
pub enum CounterBackend {
    /// Local file.
    File(FileStore),
    /// `Dragonfly`/Redis key.
    Dragonfly(DragonflyStore),
}

impl CounterStore for CounterBackend {
    async fn read(&self) -> Result<Option<u64>, StoreError> {
        match self {
            Self::File(store) => store.read().await,
            Self::Dragonfly(store) => store.read().await,
        }
    }

    async fn write(&self, value: u64) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.write(value).await,
            Self::Dragonfly(store) => store.write(value).await,
        }
    }

    fn location(&self) -> String {
        match self {
            Self::File(store) => store.location(),
            Self::Dragonfly(store) => store.location(),
        }
    }
}

impl From<FileStore> for CounterBackend {
    fn from(store: FileStore) -> Self {
        Self::File(store)
    }
}

impl From<DragonflyStore> for CounterBackend {
    fn from(store: DragonflyStore) -> Self {
        Self::Dragonfly(store)
    }
}
