//! Token 管理器
//!
//! 负责签发（一个访问 Token，启用刷新时再加一个配对的刷新 Token）、
//! 重建（把原始字符串还原为带类型的 [`Token`]）以及黑名单查询。
//!
//! 配对关系只有两条：刷新 Token 的 `nbf` 等于访问 Token 的 `exp`，
//! 刷新 Token 的 `rtt` 等于访问 Token 的 `jti`。
//!
//! ```rust
//! use jwtguard::{ClaimSet, JwtConfig, JwtManager, TokenKind};
//! use serde_json::json;
//!
//! let manager = JwtManager::new(
//!     JwtConfig::new("my-secret-key-at-least-32-bytes!")
//!         .with_token_ttl_minutes(15)
//!         .with_refresh(true)
//!         .with_refresh_ttl_days(7),
//! )
//! .unwrap();
//!
//! let data = ClaimSet::from_value(json!({ "euo": { "name": "a" }, "user": { "id": 1 } })).unwrap();
//! let tokens = manager.issue(data).unwrap();
//!
//! let api = manager.rebuild(&tokens.api_token);
//! assert_eq!(api.kind(), Some(TokenKind::User));
//! assert!(manager.validate_token(&api).is_valid());
//!
//! let refresh = manager.rebuild(tokens.refresh_token.as_deref().unwrap());
//! assert_eq!(refresh.kind(), Some(TokenKind::Refresh));
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::blacklist::{BLACKLIST_NAMESPACE, BlacklistStore, InMemoryBlacklistStore};
use crate::config::{self, JwtConfig};
use crate::error::{Error, Result, TokenError};
use crate::random::{IdGenerator, RandomIdGenerator};
use crate::token::claims::{self, ClaimSet};
use crate::token::{ErrorToken, JwtCodec, SignedToken, Token, TokenKind, TokenStatus};

/// 刷新 Token 引用数据中不允许覆盖的键
const RESERVED_KEYS: [&str; 6] = [
    claims::JTI,
    claims::EXP,
    claims::NBF,
    claims::RTI,
    claims::RTD,
    claims::RTT,
];

/// 调用方数据中不允许出现的配对字段，否则重建时的角色判定可被伪造
const LINKAGE_KEYS: [&str; 4] = [claims::NBF, claims::RTI, claims::RTD, claims::RTT];

/// 签发结果
///
/// 序列化为 `{"api_token": ..., "refresh_token": ...}`，未启用刷新时没有 `refresh_token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTokens {
    /// 访问 Token
    pub api_token: String,
    /// 刷新 Token（仅在启用刷新时存在）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// JWT 管理器
///
/// 创建后配置不可变，多个线程可以共享同一个实例
#[derive(Clone)]
pub struct JwtManager {
    codec: JwtCodec,
    token_ttl_secs: i64,
    refresh_enabled: bool,
    refresh_ttl_secs: i64,
    store: Arc<dyn BlacklistStore>,
    ids: Arc<dyn IdGenerator>,
}

impl JwtManager {
    /// 使用配置创建管理器（内存黑名单、随机 ID）
    pub fn new(config: JwtConfig) -> Result<Self> {
        config.validate()?;

        let codec = JwtCodec::new(config.secret.expose_secret().as_bytes())
            .with_leeway(config.leeway_seconds);
        Ok(Self::with_codec(
            codec,
            config.token_ttl_seconds()?,
            config.refresh_enabled,
            config.refresh_ttl_seconds()?,
        ))
    }

    /// 使用密钥和有效期直接创建管理器
    ///
    /// 访问 Token 有效期单位为分钟，刷新 Token 有效期单位为天，在此一次性换算为秒。
    /// 换算结果超出 [`Duration`] 表示范围时返回配置错误
    pub fn from_parts(
        secret: &[u8],
        token_ttl_minutes: u64,
        refresh_enabled: bool,
        refresh_ttl_days: u64,
    ) -> Result<Self> {
        Ok(Self::with_codec(
            JwtCodec::new(secret),
            config::minutes_to_seconds(token_ttl_minutes)?,
            refresh_enabled,
            config::days_to_seconds(refresh_ttl_days)?,
        ))
    }

    fn with_codec(
        codec: JwtCodec,
        token_ttl_secs: i64,
        refresh_enabled: bool,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            codec,
            token_ttl_secs,
            refresh_enabled,
            refresh_ttl_secs,
            store: Arc::new(InMemoryBlacklistStore::new()),
            ids: Arc::new(RandomIdGenerator::new()),
        }
    }

    /// 替换黑名单存储
    pub fn with_blacklist_store(mut self, store: Arc<dyn BlacklistStore>) -> Self {
        self.store = store;
        self
    }

    /// 替换 ID 生成器
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// 访问 Token 有效期（构造时已校验范围）
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs)
    }

    /// 刷新 Token 有效期
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_secs)
    }

    pub fn refresh_enabled(&self) -> bool {
        self.refresh_enabled
    }

    /// 签发 Token
    ///
    /// `data` 中带有 `euo` 时签发用户 Token，否则签发通用 Token。
    /// 启用刷新时，通用 Token 路径要求 `data.user.id` 存在。
    /// `data` 不能包含 `nbf`、`rti`、`rtd`、`rtt`
    pub fn issue(&self, data: ClaimSet) -> Result<IssuedTokens> {
        self.issue_at(data, Utc::now().timestamp())
    }

    /// 以指定时刻签发 Token
    pub fn issue_at(&self, data: ClaimSet, now: i64) -> Result<IssuedTokens> {
        if let Some(key) = LINKAGE_KEYS.into_iter().find(|key| data.contains(key)) {
            return Err(Error::Token(TokenError::InvalidClaim(format!(
                "{} is reserved",
                key
            ))));
        }

        // 无论是否启用刷新都先生成
        let refresh_jti = self.ids.generate_id()?;

        let kind = if data.contains(claims::EUO) {
            TokenKind::User
        } else {
            TokenKind::Common
        };

        let reference = if self.refresh_enabled {
            Some(refresh_reference_data(kind, &data)?)
        } else {
            None
        };

        let access_claims = match kind {
            TokenKind::User if self.refresh_enabled => {
                let mut fragment = ClaimSet::new();
                fragment.insert(claims::RTI, refresh_jti.as_str());
                fragment.insert(claims::RTD, self.refresh_ttl_secs);
                data.merged(fragment)
            }
            _ => data,
        };

        let access = SignedToken::issue(
            access_claims,
            self.ids.generate_id()?,
            expires_at(now, self.token_ttl_secs)?,
            &self.codec,
        )?;
        let (access_jti, access_exp) = envelope(&access)?;

        debug!(
            kind = kind.as_str(),
            jti = access_jti,
            exp = access_exp,
            "issued access token"
        );

        let refresh_token = match reference {
            Some(reference) => {
                let mut linkage = ClaimSet::new();
                linkage.insert(claims::JTI, refresh_jti.as_str());
                linkage.insert(claims::NBF, access_exp);
                linkage.insert(claims::RTT, access_jti);

                let refresh = SignedToken::issue(
                    reference.merged(linkage),
                    refresh_jti.as_str(),
                    expires_at(now, self.refresh_ttl_secs)?,
                    &self.codec,
                )?;

                debug!(
                    jti = %refresh_jti,
                    rtt = access_jti,
                    nbf = access_exp,
                    "issued refresh token"
                );
                Some(refresh.into_encoded())
            }
            None => None,
        };

        Ok(IssuedTokens {
            api_token: access.into_encoded(),
            refresh_token,
        })
    }

    /// 将原始字符串重建为 Token
    ///
    /// 解码失败不会返回错误，而是得到一个带有归类状态的 [`ErrorToken`]
    pub fn rebuild(&self, raw_token: &str) -> Token {
        match self.decode(raw_token) {
            Ok(claims) => {
                let kind = TokenKind::classify(&claims);
                debug!(kind = kind.as_str(), jti = ?claims.jti(), "rebuilt token");
                let signed =
                    SignedToken::from_decoded(claims, raw_token).with_leeway(self.codec.leeway());
                Token::from_signed(kind, signed)
            }
            Err(err) => {
                let mut token = ErrorToken::new();
                token.set_status(TokenStatus::from_error(&err));
                warn!(status = %token.status(), error = %err, "token rebuild failed");
                Token::Error(token)
            }
        }
    }

    /// 验证签名和过期时间并解码，错误原样返回
    pub fn decode(&self, raw_token: &str) -> Result<ClaimSet> {
        self.codec.decode(raw_token)
    }

    /// 返回 Token 自身的状态
    pub fn validate_token(&self, token: &Token) -> TokenStatus {
        token.status()
    }

    /// 查询 Token 是否已被吊销
    pub fn is_blacklisted(&self, raw_token: &str) -> Result<bool> {
        let claims = self.decode(raw_token)?;
        self.store.exists(BLACKLIST_NAMESPACE, required_jti(&claims)?)
    }

    /// 吊销 Token
    ///
    /// 条目的 TTL 为 Token 的剩余有效期（至少 1 秒），之后 Token 本身也已过期
    pub fn blacklist(&self, raw_token: &str) -> Result<()> {
        let claims = self.decode(raw_token)?;
        let jti = required_jti(&claims)?;

        let now = Utc::now().timestamp();
        let remaining = claims
            .exp()
            .map_or(self.token_ttl_secs, |exp| exp.saturating_sub(now));
        let ttl = Duration::try_seconds(remaining.max(1)).unwrap_or(Duration::MAX);

        self.store.insert(BLACKLIST_NAMESPACE, jti, ttl)?;
        info!(jti, ttl_secs = ttl.num_seconds(), "token blacklisted");
        Ok(())
    }

    /// 重建并检查黑名单
    ///
    /// 有效但已被吊销的 Token 返回 `Blacklisted`，其余情况与 [`Token::status`] 相同
    pub fn inspect(&self, raw_token: &str) -> Result<TokenStatus> {
        let token = self.rebuild(raw_token);
        let status = token.status();

        match token.jti() {
            Some(jti) if status.is_valid() && self.store.exists(BLACKLIST_NAMESPACE, jti)? => {
                Ok(TokenStatus::Blacklisted)
            }
            _ => Ok(status),
        }
    }
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("codec", &self.codec)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("refresh_enabled", &self.refresh_enabled)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

/// 刷新 Token 携带的引用数据
///
/// 用户 Token 路径为 `euo` 对象本身，通用 Token 路径为 `{user_id: data.user.id}`
fn refresh_reference_data(kind: TokenKind, data: &ClaimSet) -> Result<ClaimSet> {
    let mut reference = match kind {
        TokenKind::User => match data.get(claims::EUO) {
            Some(Value::Object(map)) => ClaimSet::from(map.clone()),
            _ => {
                return Err(Error::Token(TokenError::InvalidClaim(
                    "euo must be a JSON object".to_string(),
                )));
            }
        },
        _ => {
            let user_id = data
                .nested_user_id()
                .ok_or_else(|| Error::missing_field("user.id"))?;
            let mut reference = ClaimSet::new();
            reference.insert(claims::USER_ID, user_id.clone());
            reference
        }
    };

    for key in RESERVED_KEYS {
        reference.remove(key);
    }
    Ok(reference)
}

fn expires_at(now: i64, ttl_secs: i64) -> Result<i64> {
    now.checked_add(ttl_secs)
        .ok_or_else(|| Error::Token(TokenError::InvalidClaim("exp is out of range".to_string())))
}

fn envelope(token: &SignedToken) -> Result<(&str, i64)> {
    match (token.jti(), token.exp()) {
        (Some(jti), Some(exp)) => Ok((jti, exp)),
        _ => Err(Error::internal("issued token is missing its envelope")),
    }
}

fn required_jti(claims: &ClaimSet) -> Result<&str> {
    claims
        .jti()
        .ok_or_else(|| Error::Token(TokenError::InvalidClaim("missing jti".to_string())))
}
