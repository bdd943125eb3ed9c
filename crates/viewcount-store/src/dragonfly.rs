//! `Dragonfly` (Redis-compatible) counter store.
//!
//! The count lives under a single string key (default `counter:count`)
//! as decimal text, mirroring the file layout so the two backends are
//! interchangeable.

use fred::prelude::*;

use crate::error::StoreError;
use crate::{CounterStore, parse_count};

/// Default key holding the counter.
pub const DEFAULT_KEY: &str = "counter:count";

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`] bound to one key.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
    key: String,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL and bind to `key`.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str, key: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(key, "Connected to Dragonfly");
        Ok(Self {
            client,
            key: key.to_owned(),
        })
    }

    /// The key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl CounterStore for DragonflyStore {
    async fn read(&self) -> Result<Option<u64>, StoreError> {
        let value: Option<String> = self.client.get(self.key.as_str()).await?;
        value.map(|s| parse_count(&s)).transpose()
    }

    async fn write(&self, value: u64) -> Result<(), StoreError> {
        let _: () = self
            .client
            .set(
                self.key.as_str(),
                value.to_string().as_str(),
                None,
                None,
                false,
            )
            .await?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("dragonfly:{}", self.key)
    }
}
