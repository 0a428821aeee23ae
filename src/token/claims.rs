//! Claim 集合
//!
//! Token 的 payload 是一个由短键名组成的 JSON 对象。除了信封字段
//! （`jti`、`exp`）之外，不同角色的 Token 携带不同的关联字段：
//!
//! - 用户 Token：调用方数据，启用刷新时附带 `rti` / `rtd`
//! - 刷新 Token：`jti`、`nbf`、`rtt` 以及引用数据
//! - 通用 Token：调用方数据原样保留

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result, TokenError};

/// Token 唯一标识
pub const JTI: &str = "jti";
/// 过期时间（Unix 时间戳，秒）
pub const EXP: &str = "exp";
/// 生效时间（Unix 时间戳，秒）
pub const NBF: &str = "nbf";
/// 配对的刷新 Token ID
pub const RTI: &str = "rti";
/// 配对的刷新 Token 有效期（秒）
pub const RTD: &str = "rtd";
/// 刷新 Token 指回的访问 Token ID
pub const RTT: &str = "rtt";
/// 内嵌用户对象
pub const EUO: &str = "euo";
/// 用户引用
pub const USER_ID: &str = "user_id";
/// 调用方数据中的用户对象
pub const USER: &str = "user";

/// Claim 集合
///
/// 对 JSON 对象的透明包装，序列化结果就是 JWT payload 本身
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// 创建空的 Claim 集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 值创建，只接受对象
    ///
    /// ```rust
    /// use jwtguard::ClaimSet;
    /// use serde_json::json;
    ///
    /// let claims = ClaimSet::from_value(json!({ "user": { "id": 1 } })).unwrap();
    /// assert!(claims.contains("user"));
    /// assert!(ClaimSet::from_value(json!([1, 2])).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::Token(TokenError::InvalidClaim(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )))),
        }
    }

    /// 是否包含指定的 claim
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// 获取原始 claim 值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 获取并反序列化 claim 值
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// 写入 claim，返回旧值
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// 移除 claim
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// 合并另一个集合，键冲突时以 `other` 为准
    pub fn merge(&mut self, other: ClaimSet) {
        self.0.extend(other.0);
    }

    /// 返回合并后的新集合，键冲突时以 `other` 为准
    pub fn merged(mut self, other: ClaimSet) -> Self {
        self.merge(other);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Token 唯一标识
    pub fn jti(&self) -> Option<&str> {
        self.0.get(JTI).and_then(Value::as_str)
    }

    /// 过期时间
    pub fn exp(&self) -> Option<i64> {
        self.0.get(EXP).and_then(Value::as_i64)
    }

    /// 生效时间
    pub fn nbf(&self) -> Option<i64> {
        self.0.get(NBF).and_then(Value::as_i64)
    }

    /// 配对的刷新 Token ID
    pub fn rti(&self) -> Option<&str> {
        self.0.get(RTI).and_then(Value::as_str)
    }

    /// 配对的刷新 Token 有效期（秒）
    pub fn rtd(&self) -> Option<i64> {
        self.0.get(RTD).and_then(Value::as_i64)
    }

    /// 刷新 Token 指回的访问 Token ID
    pub fn rtt(&self) -> Option<&str> {
        self.0.get(RTT).and_then(Value::as_str)
    }

    /// 用户引用，数字或字符串均原样返回
    pub fn user_id(&self) -> Option<&Value> {
        self.0.get(USER_ID)
    }

    /// 调用方数据中的 `user.id`
    pub fn nested_user_id(&self) -> Option<&Value> {
        self.0
            .get(USER)
            .and_then(|user| user.get("id"))
            .filter(|id| !id.is_null())
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ClaimSet> for Value {
    fn from(claims: ClaimSet) -> Self {
        Value::Object(claims.0)
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
