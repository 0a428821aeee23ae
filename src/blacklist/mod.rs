//! Token 黑名单
//!
//! 黑名单是一个按命名空间划分的键存在性存储，键为 Token 的 `jti`。
//! 条目带有 TTL，Token 自然过期后条目也随之失效。
//!
//! ## 存储后端
//!
//! - [`InMemoryBlacklistStore`]: 进程内存储，用于开发和测试
//! - `RedisBlacklistStore`: 需启用 `redis` feature

#[cfg(feature = "redis")]
mod redis_store;

#[cfg(feature = "redis")]
pub use redis_store::RedisBlacklistStore;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result, StorageError};

/// 黑名单条目所在的命名空间
pub const BLACKLIST_NAMESPACE: &str = "jwt_token/blacklist";

/// 黑名单存储 trait
///
/// 实现此 trait 可以自定义黑名单的存储后端。单次请求/响应，不做重试
pub trait BlacklistStore: Send + Sync {
    /// 键是否存在（且未过期）
    fn exists(&self, namespace: &str, key: &str) -> Result<bool>;

    /// 写入键，`ttl` 之后自动失效
    fn insert(&self, namespace: &str, key: &str, ttl: Duration) -> Result<()>;
}

/// 内存黑名单存储
///
/// 生产环境多实例部署时应使用 Redis 等共享存储
#[derive(Debug, Default)]
pub struct InMemoryBlacklistStore {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryBlacklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }

    /// 清理已过期的条目，返回清理数量
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok(before - entries.len())
    }

    /// 当前条目数量（包括尚未清理的过期条目）
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl BlacklistStore for InMemoryBlacklistStore {
    fn exists(&self, namespace: &str, key: &str) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .get(&Self::entry_key(namespace, key))
            .is_some_and(|expires_at| *expires_at > Utc::now()))
    }

    fn insert(&self, namespace: &str, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        // 超出可表示范围的 TTL 视为永不过期
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        entries.insert(Self::entry_key(namespace, key), expires_at);
        Ok(())
    }
}

fn poisoned() -> Error {
    Error::Storage(StorageError::OperationFailed("lock poisoned".into()))
}
