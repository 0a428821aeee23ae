//! # JwtGuard
//!
//! 签发、重建和吊销带有时效的签名 Token。
//!
//! ## 功能特性
//!
//! - **三种 Token 角色**: 用户会话 Token、刷新 Token、通用 Token
//! - **配对签发**: 刷新 Token 的 `nbf`/`rtt` 与访问 Token 的 `exp`/`jti` 严格对应
//! - **容错重建**: 解码失败时返回带状态的 `ErrorToken`，而不是错误
//! - **黑名单**: 基于 `jti` 的吊销检查，内存或 Redis 存储
//!
//! ## Features
//!
//! - `redis` - 启用 Redis 黑名单存储
//!
//! ## 示例
//!
//! ```rust
//! use jwtguard::{ClaimSet, JwtConfig, JwtManager, TokenKind, TokenStatus};
//! use serde_json::json;
//!
//! let manager = JwtManager::new(
//!     JwtConfig::new("my-secret-key-at-least-32-bytes!").with_refresh(true),
//! )
//! .unwrap();
//!
//! // 签发通用 Token
//! let data = ClaimSet::from_value(json!({ "user": { "id": 42 } })).unwrap();
//! let tokens = manager.issue(data).unwrap();
//!
//! // 重建并检查状态
//! let token = manager.rebuild(&tokens.api_token);
//! assert_eq!(token.kind(), Some(TokenKind::Common));
//! assert_eq!(manager.validate_token(&token), TokenStatus::Valid);
//!
//! // 无效字符串不会返回错误
//! let broken = manager.rebuild("not-a-token");
//! assert_eq!(broken.status(), TokenStatus::Malformed);
//!
//! // 吊销
//! manager.blacklist(&tokens.api_token).unwrap();
//! assert!(manager.is_blacklisted(&tokens.api_token).unwrap());
//! ```

pub mod blacklist;
pub mod config;
pub mod error;
pub mod manager;
pub mod random;
pub mod token;

pub use error::{Error, Result};

pub use blacklist::{BLACKLIST_NAMESPACE, BlacklistStore, InMemoryBlacklistStore};
#[cfg(feature = "redis")]
pub use blacklist::RedisBlacklistStore;
pub use config::JwtConfig;
pub use manager::{IssuedTokens, JwtManager};
pub use random::{IdGenerator, RandomIdGenerator};
pub use token::{ClaimSet, ErrorToken, JwtCodec, SignedToken, Token, TokenKind, TokenStatus};
