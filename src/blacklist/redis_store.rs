use chrono::Duration;
use redis::Commands;

use super::BlacklistStore;
use crate::error::{Error, Result, StorageError};

/// Redis 黑名单存储
///
/// 键格式为 `{namespace}:{jti}`，使用 `SET EX` 写入、`EXISTS` 查询
#[derive(Debug, Clone)]
pub struct RedisBlacklistStore {
    client: redis::Client,
}

impl RedisBlacklistStore {
    /// 使用 Redis URL 创建存储，例如 `redis://127.0.0.1:6379`
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            Error::Storage(StorageError::ConnectionFailed(format!(
                "invalid redis URL: {}",
                e
            )))
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }

    fn connection(&self) -> Result<redis::Connection> {
        self.client.get_connection().map_err(|e| {
            Error::Storage(StorageError::ConnectionFailed(e.to_string()))
        })
    }
}

impl BlacklistStore for RedisBlacklistStore {
    fn exists(&self, namespace: &str, key: &str) -> Result<bool> {
        let mut conn = self.connection()?;
        conn.exists(Self::key(namespace, key))
            .map_err(|e| Error::Storage(StorageError::OperationFailed(e.to_string())))
    }

    fn insert(&self, namespace: &str, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection()?;
        let ttl_secs = ttl.num_seconds().max(1) as u64;

        let _: () = conn
            .set_ex(Self::key(namespace, key), 1, ttl_secs)
            .map_err(|e| Error::Storage(StorageError::OperationFailed(e.to_string())))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let result = RedisBlacklistStore::new("not a url");
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::ConnectionFailed(_)))
        ));
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            RedisBlacklistStore::key("jwt_token/blacklist", "abc"),
            "jwt_token/blacklist:abc"
        );
    }
}
