//! 签名原语
//!
//! 使用共享密钥和固定算法（HS256）对 [`ClaimSet`] 进行编码和验证解码。
//!
//! 解码时只允许 HS256 一种算法，使用其他算法签名的 Token 一律拒绝，
//! 防止算法混淆攻击。
//!
//! ```rust
//! use jwtguard::token::codec::JwtCodec;
//! use jwtguard::ClaimSet;
//! use serde_json::json;
//!
//! let codec = JwtCodec::new(b"my-secret-key-at-least-32-bytes!");
//! let claims = ClaimSet::from_value(json!({
//!     "jti": "abc",
//!     "exp": chrono::Utc::now().timestamp() + 60,
//! }))
//! .unwrap();
//!
//! let token = codec.encode(&claims).unwrap();
//! assert_eq!(codec.decode(&token).unwrap(), claims);
//! ```

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

use super::claims::ClaimSet;
use crate::error::{Error, Result, TokenError};

/// 唯一允许的签名算法
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT 编解码器
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    leeway: u64,
}

impl JwtCodec {
    /// 使用共享密钥创建编解码器
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            leeway: 0,
        }
    }

    /// 设置过期校验的时钟偏差容忍度（秒）
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// 过期校验的时钟偏差容忍度（秒）
    pub fn leeway(&self) -> u64 {
        self.leeway
    }

    /// 将 Claim 集合签名为紧凑格式的 JWT 字符串
    pub fn encode(&self, claims: &ClaimSet) -> Result<String> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding_key).map_err(|e| {
            Error::Token(TokenError::EncodingFailed(format!(
                "failed to encode JWT: {}",
                e
            )))
        })
    }

    /// 验证签名和过期时间，并解码出 Claim 集合
    ///
    /// 失败时返回的 [`TokenError`] 按签名原语的错误种类归类：
    /// `Expired`、`InvalidSignature` 或格式类错误
    pub fn decode(&self, token: &str) -> Result<ClaimSet> {
        let token_data: TokenData<ClaimSet> =
            jsonwebtoken::decode(token, &self.decoding_key, &self.validation())
                .map_err(|e| Error::Token(TokenError::from(e)))?;

        Ok(token_data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        validation.algorithms = vec![ALGORITHM];
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        // 刷新 Token 的 nbf 指向访问 Token 的过期时间，解码时不拒绝
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = self.leeway;
        validation
    }
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &ALGORITHM)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    const TEST_SECRET: &[u8] = b"test-secret-key-at-least-32-bytes!";

    fn claims_expiring_in(seconds: i64) -> ClaimSet {
        ClaimSet::from_value(json!({
            "jti": "token-1",
            "exp": Utc::now().timestamp() + seconds,
            "role": "admin",
        }))
        .unwrap()
    }

    #[test]
    fn test_encode_produces_compact_jwt() {
        let token = JwtCodec::new(TEST_SECRET)
            .encode(&claims_expiring_in(60))
            .unwrap();
        assert_eq!(token.matches('.').count(), 2);
    }

    #[test]
    fn test_decode_returns_original_claims() {
        let codec = JwtCodec::new(TEST_SECRET);
        let claims = claims_expiring_in(60);

        let decoded = codec.decode(&codec.encode(&claims).unwrap()).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_expired() {
        let codec = JwtCodec::new(TEST_SECRET);
        let token = codec.encode(&claims_expiring_in(-10)).unwrap();

        let result = codec.decode(&token);
        assert!(matches!(result, Err(Error::Token(TokenError::Expired))));
    }

    #[test]
    fn test_leeway_accepts_recently_expired() {
        let codec = JwtCodec::new(TEST_SECRET).with_leeway(60);
        let token = codec.encode(&claims_expiring_in(-10)).unwrap();

        assert!(codec.decode(&token).is_ok());
        assert_eq!(codec.leeway(), 60);
    }

    #[test]
    fn test_decode_wrong_secret() {
        let token = JwtCodec::new(TEST_SECRET)
            .encode(&claims_expiring_in(60))
            .unwrap();

        let other = JwtCodec::new(b"wrong-secret-key-at-least-32-bytes!");
        let result = other.decode(&token);
        assert!(matches!(
            result,
            Err(Error::Token(TokenError::InvalidSignature))
        ));
    }

    #[test]
    fn test_decode_garbage() {
        let result = JwtCodec::new(TEST_SECRET).decode("not-a-jwt");
        assert!(matches!(
            result,
            Err(Error::Token(TokenError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_other_algorithm() {
        let claims = claims_expiring_in(60);
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        let result = JwtCodec::new(TEST_SECRET).decode(&token);
        assert!(matches!(
            result,
            Err(Error::Token(TokenError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_decode_requires_exp() {
        let codec = JwtCodec::new(TEST_SECRET);
        let claims = ClaimSet::from_value(json!({ "jti": "no-exp" })).unwrap();
        let token = codec.encode(&claims).unwrap();

        assert!(codec.decode(&token).is_err());
    }

    #[test]
    fn test_decode_ignores_future_nbf() {
        let codec = JwtCodec::new(TEST_SECRET);
        let mut claims = claims_expiring_in(3600);
        claims.insert("nbf", Utc::now().timestamp() + 600);

        let decoded = codec.decode(&codec.encode(&claims).unwrap()).unwrap();
        assert_eq!(decoded.nbf(), claims.nbf());
    }
}
