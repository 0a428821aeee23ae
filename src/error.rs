//! 统一错误类型模块
//!
//! 提供 jwtguard 库中所有操作的错误类型定义。
//!
//! 签发（`issue`）阶段的错误会直接返回给调用方；重建（`rebuild`）阶段的
//! 解码错误则会被转换为 [`crate::token::ErrorToken`]，调用方无需处理。

use thiserror::Error;

/// jwtguard 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// jwtguard 库的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// Token 相关错误
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// 加密错误
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 创建一个缺少字段的错误
    pub fn missing_field(path: impl Into<String>) -> Self {
        Error::Token(TokenError::MissingField(path.into()))
    }

    /// 如果是 Token 错误，返回其引用
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            Error::Token(e) => Some(e),
            _ => None,
        }
    }
}

/// Token 相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token 已过期
    #[error("token has expired")]
    Expired,
    /// Token 签名无效
    #[error("invalid token signature")]
    InvalidSignature,
    /// Token 格式无效
    #[error("invalid token format: {0}")]
    InvalidFormat(String),
    /// Token 编码失败
    #[error("token encoding failed: {0}")]
    EncodingFailed(String),
    /// Token 解码失败
    #[error("token decoding failed: {0}")]
    DecodingFailed(String),
    /// 签发时缺少必需的数据字段（例如 `user.id`）
    #[error("missing required field: {0}")]
    MissingField(String),
    /// 无效的 claim 值
    #[error("invalid claim value: {0}")]
    InvalidClaim(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 缺少必需的配置
    #[error("missing required configuration: {0}")]
    MissingRequired(String),
    /// 无效的配置值
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// 连接失败
    #[error("storage connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作失败
    #[error("storage operation failed: {0}")]
    OperationFailed(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// 随机数生成失败
    #[error("random number generation failed: {0}")]
    RngFailed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    /// 按错误种类（而非错误消息）归类签名原语的失败
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::InvalidFormat("invalid token structure".to_string()),
            ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidFormat("algorithm not allowed".to_string())
            }
            ErrorKind::MissingRequiredClaim(claim) => TokenError::InvalidClaim(format!(
                "missing required claim: {}",
                claim
            )),
            _ => TokenError::DecodingFailed(err.to_string()),
        }
    }
}
