//! Token 状态

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, TokenError};

/// Token 的有效性状态
///
/// `Blacklisted` 不会由 Token 自身推导出来，需要调用方显式查询黑名单
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    /// 有效
    Valid,
    /// 已过期
    Expired,
    /// 签名无效
    InvalidSignature,
    /// 结构无效或无法识别的失败
    Malformed,
    /// 已被吊销
    Blacklisted,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Valid => "VALID",
            TokenStatus::Expired => "EXPIRED",
            TokenStatus::InvalidSignature => "INVALID_SIGNATURE",
            TokenStatus::Malformed => "MALFORMED",
            TokenStatus::Blacklisted => "BLACKLISTED",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid)
    }

    /// 将解码失败归类为状态
    ///
    /// 只识别过期和签名无效两类，其余一律视为 `Malformed`，
    /// 不向状态泄露内部错误细节
    pub fn from_error(err: &Error) -> Self {
        match err.as_token_error() {
            Some(TokenError::Expired) => TokenStatus::Expired,
            Some(TokenError::InvalidSignature) => TokenStatus::InvalidSignature,
            _ => TokenStatus::Malformed,
        }
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Error> for TokenStatus {
    fn from(err: &Error) -> Self {
        TokenStatus::from_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, StorageError};

    #[test]
    fn test_classification_by_kind() {
        assert_eq!(
            TokenStatus::from_error(&Error::Token(TokenError::Expired)),
            TokenStatus::Expired
        );
        assert_eq!(
            TokenStatus::from_error(&Error::Token(TokenError::InvalidSignature)),
            TokenStatus::InvalidSignature
        );
        assert_eq!(
            TokenStatus::from_error(&Error::Token(TokenError::InvalidFormat("x".into()))),
            TokenStatus::Malformed
        );
    }

    #[test]
    fn test_unknown_failures_are_malformed() {
        let errors = [
            Error::Token(TokenError::DecodingFailed("boom".into())),
            Error::Token(TokenError::InvalidClaim("missing exp".into())),
            Error::Storage(StorageError::OperationFailed("lock poisoned".into())),
            Error::Config(ConfigError::MissingRequired("secret".into())),
            Error::internal("unexpected"),
        ];

        for err in &errors {
            assert_eq!(TokenStatus::from(err), TokenStatus::Malformed);
        }
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(TokenStatus::InvalidSignature.to_string(), "INVALID_SIGNATURE");
        assert_eq!(
            serde_json::to_string(&TokenStatus::Blacklisted).unwrap(),
            "\"BLACKLISTED\""
        );
        assert!(TokenStatus::Valid.is_valid());
        assert!(!TokenStatus::Expired.is_valid());
    }
}
