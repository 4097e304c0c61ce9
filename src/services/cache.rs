//! Redis-backed cache for catalog search results
//!
//! Every key is namespaced with the configured prefix. Callers decide whether
//! a failure matters; the catalog treats the cache as optional.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct CacheService {
    connection: ConnectionManager,
    prefix: String,
    ttl_seconds: u64,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("prefix", &self.prefix)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl CacheService {
    /// Connect to Redis
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        info!(prefix = %config.prefix, "Redis cache connected");
        Ok(Self {
            connection,
            prefix: config.prefix.clone(),
            ttl_seconds: config.ttl_seconds,
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Store a value with the configured TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.connection.clone();
        let serialized = serde_json::to_string(value)?;
        let full_key = self.full_key(key);

        let _: () = conn.set_ex(&full_key, serialized, self.ttl_seconds).await?;

        debug!(key = %full_key, ttl = self.ttl_seconds, "Value set in Redis");
        Ok(())
    }

    /// Fetch a value, `None` on a miss
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.connection.clone();
        let full_key = self.full_key(key);

        let raw: Option<String> = conn.get(&full_key).await?;
        match raw {
            Some(data) => {
                debug!(key = %full_key, "Cache hit");
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Delete every key matching `pattern` under the prefix
    pub async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.connection.clone();
        let full_pattern = self.full_key(pattern);

        let keys: Vec<String> = conn.keys(&full_pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: u64 = conn.del(&keys).await?;
        debug!(pattern = %full_pattern, deleted = deleted, "Keys deleted by pattern");
        Ok(deleted)
    }

    /// Check that Redis answers PING
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
