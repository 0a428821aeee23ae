//! Token 模块
//!
//! 提供 Token 的 claim 集合、签名原语、角色变体和状态。
//!
//! ## 子模块
//!
//! - **claims**: Claim 集合及短键名常量
//! - **codec**: HS256 编解码（签名原语）
//! - **variant**: 用户 / 刷新 / 通用 / 错误四种 Token 变体
//! - **status**: Token 状态及解码失败的归类
//!
//! ## 示例
//!
//! ```rust
//! use jwtguard::token::{JwtCodec, SignedToken, Token, TokenKind, TokenStatus};
//! use jwtguard::ClaimSet;
//! use serde_json::json;
//!
//! let codec = JwtCodec::new(b"my-secret-key-at-least-32-bytes!");
//! let exp = chrono::Utc::now().timestamp() + 900;
//! let claims = ClaimSet::from_value(json!({ "user_id": 7 })).unwrap();
//!
//! let signed = SignedToken::issue(claims, "token-id", exp, &codec).unwrap();
//! let kind = TokenKind::classify(signed.claims());
//! assert_eq!(kind, TokenKind::Common);
//!
//! let token = Token::from_signed(kind, signed);
//! assert_eq!(token.status(), TokenStatus::Valid);
//! ```

pub mod claims;
pub mod codec;
pub mod status;
pub mod variant;

pub use claims::ClaimSet;
pub use codec::JwtCodec;
pub use status::TokenStatus;
pub use variant::{ErrorToken, SignedToken, Token, TokenKind};
