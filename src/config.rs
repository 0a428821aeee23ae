//! 管理器配置
//!
//! ```rust
//! use jwtguard::JwtConfig;
//!
//! let config = JwtConfig::new("my-secret-key-at-least-32-bytes!")
//!     .with_token_ttl_minutes(15)
//!     .with_refresh(true)
//!     .with_refresh_ttl_days(7);
//!
//! assert!(config.validate().is_ok());
//! ```

use std::str::FromStr;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{ConfigError, Result};

const ENV_SECRET: &str = "JWT_SECRET";
const ENV_TTL_MINUTES: &str = "JWT_TTL_MINUTES";
const ENV_REFRESH_ENABLED: &str = "JWT_REFRESH_ENABLED";
const ENV_REFRESH_TTL_DAYS: &str = "JWT_REFRESH_TTL_DAYS";
const ENV_LEEWAY_SECONDS: &str = "JWT_LEEWAY_SECONDS";

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_DAY: i64 = 86400;

/// JWT 管理器配置
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// 签名密钥
    pub secret: SecretString,
    /// 访问 Token 有效期（分钟）
    pub token_ttl_minutes: u64,
    /// 是否签发刷新 Token
    pub refresh_enabled: bool,
    /// 刷新 Token 有效期（天）
    pub refresh_ttl_days: u64,
    /// 过期校验的时钟偏差容忍度（秒）
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::from(String::new()),
            token_ttl_minutes: 60,
            refresh_enabled: false,
            refresh_ttl_days: 14,
            leeway_seconds: 0,
        }
    }
}

impl JwtConfig {
    /// 使用签名密钥创建默认配置
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            ..Default::default()
        }
    }

    pub fn with_token_ttl_minutes(mut self, minutes: u64) -> Self {
        self.token_ttl_minutes = minutes;
        self
    }

    pub fn with_refresh(mut self, enabled: bool) -> Self {
        self.refresh_enabled = enabled;
        self
    }

    pub fn with_refresh_ttl_days(mut self, days: u64) -> Self {
        self.refresh_ttl_days = days;
        self
    }

    pub fn with_leeway_seconds(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// 从环境变量读取配置
    ///
    /// 只有 `JWT_SECRET` 是必需的，其余未设置时使用默认值
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secret = lookup(ENV_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired(ENV_SECRET.to_string()))?;

        let config = Self {
            secret: SecretString::from(secret),
            token_ttl_minutes: parse_or(&lookup, ENV_TTL_MINUTES, defaults.token_ttl_minutes)?,
            refresh_enabled: parse_or(&lookup, ENV_REFRESH_ENABLED, defaults.refresh_enabled)?,
            refresh_ttl_days: parse_or(&lookup, ENV_REFRESH_TTL_DAYS, defaults.refresh_ttl_days)?,
            leeway_seconds: parse_or(&lookup, ENV_LEEWAY_SECONDS, defaults.leeway_seconds)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired("secret".to_string()).into());
        }
        if self.token_ttl_minutes == 0 {
            return Err(invalid("token_ttl_minutes", "must be greater than zero").into());
        }
        if self.refresh_enabled && self.refresh_ttl_days == 0 {
            return Err(invalid("refresh_ttl_days", "must be greater than zero").into());
        }
        self.token_ttl_seconds()?;
        self.refresh_ttl_seconds()?;
        Ok(())
    }

    /// 访问 Token 有效期（秒）
    pub fn token_ttl_seconds(&self) -> Result<i64> {
        minutes_to_seconds(self.token_ttl_minutes)
    }

    /// 刷新 Token 有效期（秒）
    pub fn refresh_ttl_seconds(&self) -> Result<i64> {
        days_to_seconds(self.refresh_ttl_days)
    }
}

/// 分钟换算为秒，超出 [`Duration`] 表示范围时报错
pub(crate) fn minutes_to_seconds(minutes: u64) -> Result<i64> {
    checked_seconds("token_ttl_minutes", minutes, SECONDS_PER_MINUTE)
}

/// 天换算为秒，超出 [`Duration`] 表示范围时报错
pub(crate) fn days_to_seconds(days: u64) -> Result<i64> {
    checked_seconds("refresh_ttl_days", days, SECONDS_PER_DAY)
}

fn checked_seconds(key: &str, value: u64, unit: i64) -> Result<i64> {
    i64::try_from(value)
        .ok()
        .and_then(|value| value.checked_mul(unit))
        .filter(|seconds| Duration::try_seconds(*seconds).is_some())
        .ok_or_else(|| invalid(key, "duration is out of range").into())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &e.to_string()).into()),
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = JwtConfig::new("secret");
        assert_eq!(config.token_ttl_minutes, 60);
        assert!(!config.refresh_enabled);
        assert_eq!(config.refresh_ttl_days, 14);
        assert_eq!(config.leeway_seconds, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seconds_conversion() {
        let config = JwtConfig::new("secret")
            .with_token_ttl_minutes(15)
            .with_refresh_ttl_days(7);
        assert_eq!(config.token_ttl_seconds().unwrap(), 900);
        assert_eq!(config.refresh_ttl_seconds().unwrap(), 604800);
    }

    #[test]
    fn test_validate_ttl_out_of_range() {
        let result = JwtConfig::new("secret")
            .with_token_ttl_minutes(u64::MAX)
            .validate();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { ref key, .. })) if key == "token_ttl_minutes"
        ));

        // 乘法不溢出，但超出 Duration 的表示范围
        let result = JwtConfig::new("secret")
            .with_refresh(true)
            .with_refresh_ttl_days(1_000_000_000_000)
            .validate();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { ref key, .. })) if key == "refresh_ttl_days"
        ));
    }

    #[test]
    fn test_checked_seconds_bounds() {
        assert_eq!(minutes_to_seconds(0).unwrap(), 0);
        assert_eq!(days_to_seconds(1).unwrap(), 86400);
        assert!(minutes_to_seconds(i64::MAX as u64 / 60 + 1).is_err());
        assert!(days_to_seconds(u64::MAX).is_err());
    }

    #[test]
    fn test_validate_empty_secret() {
        let result = JwtConfig::default().validate();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingRequired(_)))
        ));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let result = JwtConfig::new("secret").with_token_ttl_minutes(0).validate();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));

        let result = JwtConfig::new("secret")
            .with_refresh(true)
            .with_refresh_ttl_days(0)
            .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = JwtConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "from-env-secret"),
            ("JWT_TTL_MINUTES", "15"),
            ("JWT_REFRESH_ENABLED", "true"),
            ("JWT_REFRESH_TTL_DAYS", " 7 "),
        ]))
        .unwrap();

        assert_eq!(config.secret.expose_secret(), "from-env-secret");
        assert_eq!(config.token_ttl_minutes, 15);
        assert!(config.refresh_enabled);
        assert_eq!(config.refresh_ttl_days, 7);
        assert_eq!(config.leeway_seconds, 0);
    }

    #[test]
    fn test_from_lookup_missing_secret() {
        let result = JwtConfig::from_lookup(lookup_from(&[("JWT_TTL_MINUTES", "15")]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingRequired(key))) if key == "JWT_SECRET"
        ));
    }

    #[test]
    fn test_from_lookup_bad_value() {
        let result = JwtConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s"),
            ("JWT_REFRESH_ENABLED", "maybe"),
        ]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { key, .. })) if key == "JWT_REFRESH_ENABLED"
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: JwtConfig = serde_json::from_value(serde_json::json!({
            "secret": "deserialized-secret",
            "refresh_enabled": true,
        }))
        .unwrap();

        assert_eq!(config.secret.expose_secret(), "deserialized-secret");
        assert!(config.refresh_enabled);
        assert_eq!(config.token_ttl_minutes, 60);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new("super-secret-value");
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
