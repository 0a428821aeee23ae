//! Token 变体
//!
//! 一个 Token 要么是签名成功的三种角色之一（用户、刷新、通用），
//! 要么是重建失败后的 [`ErrorToken`]。角色由解码出的 claim 按固定顺序判定，
//! 见 [`TokenKind::classify`]。

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::claims::{self, ClaimSet};
use super::codec::JwtCodec;
use super::status::TokenStatus;
use crate::error::{Error, Result};

/// Token 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// 用户会话 Token（签发时带有 `euo`）
    User,
    /// 刷新 Token
    Refresh,
    /// 通用 Token
    Common,
}

impl TokenKind {
    /// 根据 claim 判定角色
    ///
    /// 依次检查 `rti`、`rtt`，都不存在时为通用 Token
    pub fn classify(claims: &ClaimSet) -> Self {
        match (claims.contains(claims::RTI), claims.contains(claims::RTT)) {
            (true, _) => TokenKind::User,
            (false, true) => TokenKind::Refresh,
            (false, false) => TokenKind::Common,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::User => "user",
            TokenKind::Refresh => "refresh",
            TokenKind::Common => "common",
        }
    }
}

/// 已签名的 Token
///
/// 签发时由 [`SignedToken::issue`] 写入信封并签名；重建时由管理器解码后构造。
/// 创建后不可修改
#[derive(Debug, Clone, PartialEq)]
pub struct SignedToken {
    claims: ClaimSet,
    encoded: String,
    leeway: i64,
}

impl SignedToken {
    /// 写入信封字段（`jti`、`exp`）并签名
    ///
    /// 调用方数据中同名的信封字段会被覆盖
    pub fn issue(
        mut claims: ClaimSet,
        jti: impl Into<String>,
        exp: i64,
        codec: &JwtCodec,
    ) -> Result<Self> {
        claims.insert(claims::JTI, jti.into());
        claims.insert(claims::EXP, exp);
        let encoded = codec.encode(&claims)?;
        Ok(Self {
            claims,
            encoded,
            leeway: 0,
        }
        .with_leeway(codec.leeway()))
    }

    /// 由已验证的解码结果构造
    pub(crate) fn from_decoded(claims: ClaimSet, encoded: impl Into<String>) -> Self {
        Self {
            claims,
            encoded: encoded.into(),
            leeway: 0,
        }
    }

    /// 设置过期判定的时钟偏差容忍度（秒），应与解码时使用的一致
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
        self
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// 紧凑格式的 JWT 字符串
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn into_encoded(self) -> String {
        self.encoded
    }

    pub fn jti(&self) -> Option<&str> {
        self.claims.jti()
    }

    pub fn exp(&self) -> Option<i64> {
        self.claims.exp()
    }

    pub fn not_before(&self) -> Option<i64> {
        self.claims.nbf()
    }

    /// 当前时刻的状态
    pub fn status(&self) -> TokenStatus {
        self.status_at(Utc::now().timestamp())
    }

    /// 指定时刻的状态
    ///
    /// 超过 `exp` 加容忍度后为过期，没有 `exp` 的 Token 视为结构无效
    pub fn status_at(&self, now: i64) -> TokenStatus {
        match self.exp() {
            Some(exp) if now > exp.saturating_add(self.leeway) => TokenStatus::Expired,
            Some(_) => TokenStatus::Valid,
            None => TokenStatus::Malformed,
        }
    }

    /// 指定时刻是否已到生效时间（没有 `nbf` 时总是生效）
    pub fn is_active_at(&self, now: i64) -> bool {
        self.not_before().is_none_or(|nbf| now >= nbf)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now().timestamp())
    }
}

/// 重建失败时返回的哨兵 Token
///
/// 不持有密钥和 claim，只有一个状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorToken {
    status: TokenStatus,
}

impl ErrorToken {
    pub fn new() -> Self {
        Self {
            status: TokenStatus::Malformed,
        }
    }

    /// 根据解码失败归类状态
    pub fn from_error(err: &Error) -> Self {
        Self {
            status: TokenStatus::from_error(err),
        }
    }

    pub fn set_status(&mut self, status: TokenStatus) {
        self.status = status;
    }

    pub fn status(&self) -> TokenStatus {
        self.status
    }
}

impl Default for ErrorToken {
    fn default() -> Self {
        Self::new()
    }
}

/// 多态 Token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    User(SignedToken),
    Refresh(SignedToken),
    Common(SignedToken),
    Error(ErrorToken),
}

impl Token {
    /// 按角色包装已签名的 Token
    pub fn from_signed(kind: TokenKind, token: SignedToken) -> Self {
        match kind {
            TokenKind::User => Token::User(token),
            TokenKind::Refresh => Token::Refresh(token),
            TokenKind::Common => Token::Common(token),
        }
    }

    /// 角色，`ErrorToken` 没有角色
    pub fn kind(&self) -> Option<TokenKind> {
        match self {
            Token::User(_) => Some(TokenKind::User),
            Token::Refresh(_) => Some(TokenKind::Refresh),
            Token::Common(_) => Some(TokenKind::Common),
            Token::Error(_) => None,
        }
    }

    pub fn signed(&self) -> Option<&SignedToken> {
        match self {
            Token::User(t) | Token::Refresh(t) | Token::Common(t) => Some(t),
            Token::Error(_) => None,
        }
    }

    pub fn status(&self) -> TokenStatus {
        match self {
            Token::User(t) | Token::Refresh(t) | Token::Common(t) => t.status(),
            Token::Error(e) => e.status(),
        }
    }

    pub fn status_at(&self, now: i64) -> TokenStatus {
        match self {
            Token::User(t) | Token::Refresh(t) | Token::Common(t) => t.status_at(now),
            Token::Error(e) => e.status(),
        }
    }

    pub fn claims(&self) -> Option<&ClaimSet> {
        self.signed().map(SignedToken::claims)
    }

    pub fn jti(&self) -> Option<&str> {
        self.signed().and_then(SignedToken::jti)
    }

    pub fn exp(&self) -> Option<i64> {
        self.signed().and_then(SignedToken::exp)
    }

    pub fn encoded(&self) -> Option<&str> {
        self.signed().map(SignedToken::encoded)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }
}

impl From<ErrorToken> for Token {
    fn from(token: ErrorToken) -> Self {
        Token::Error(token)
    }
}
