//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成 Token 唯一标识（`jti`）。
//!
//! [`IdGenerator`] 是注入到 [`crate::JwtManager`] 中的能力，测试时可以替换为
//! 确定性的实现。

use rand::{Rng, TryRngCore, distr::Alphanumeric, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 随机前缀的最小长度
const MIN_PREFIX_LEN: usize = 3;

/// 随机前缀的最大长度（包含）
const MAX_PREFIX_LEN: usize = 33;

/// 唯一后缀的字节数
const SUFFIX_BYTES: usize = 16;

/// 唯一标识生成能力
///
/// 实现此 trait 可以替换默认的随机 ID 生成方式
pub trait IdGenerator: Send + Sync {
    /// 生成一个高熵、唯一的字符串
    fn generate_id(&self) -> Result<String>;
}

/// 基于操作系统 CSPRNG 的 ID 生成器
///
/// 生成格式：长度在 3 到 33 之间的随机字母数字前缀 + 32 个十六进制字符
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    /// 创建新的生成器
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate_id(&self) -> Result<String> {
        let prefix_len = rand::rng().random_range(MIN_PREFIX_LEN..=MAX_PREFIX_LEN);
        let prefix = generate_random_alphanumeric(prefix_len)?;
        let suffix = generate_random_hex(SUFFIX_BYTES)?;
        Ok(format!("{}{}", prefix, suffix))
    }
}

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use jwtguard::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(32).unwrap();
/// assert_eq!(bytes.len(), 32);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成指定长度的十六进制随机字符串
///
/// 最终字符串长度为字节数的两倍
///
/// ```rust
/// use jwtguard::random::generate_random_hex;
///
/// let hex = generate_random_hex(16).unwrap();
/// assert_eq!(hex.len(), 32);
/// ```
pub fn generate_random_hex(byte_length: usize) -> Result<String> {
    let bytes = generate_random_bytes(byte_length)?;
    Ok(hex::encode(bytes))
}

/// 生成指定长度的字母数字随机字符串
///
/// 只包含 a-z, A-Z, 0-9 字符
pub fn generate_random_alphanumeric(length: usize) -> Result<String> {
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_random_bytes() {
        let bytes = generate_random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);

        // 两次生成不应相同
        let bytes2 = generate_random_bytes(32).unwrap();
        assert_ne!(bytes, bytes2);
    }

    #[test]
    fn test_generate_random_hex() {
        let hex = generate_random_hex(16).unwrap();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_random_alphanumeric() {
        let token = generate_random_alphanumeric(24).unwrap();
        assert_eq!(token.len(), 24);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_id_shape() {
        let id = RandomIdGenerator::new().generate_id().unwrap();

        let min = MIN_PREFIX_LEN + SUFFIX_BYTES * 2;
        let max = MAX_PREFIX_LEN + SUFFIX_BYTES * 2;
        assert!(id.len() >= min && id.len() <= max, "unexpected length {}", id.len());
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_ids_are_unique() {
        let generator = RandomIdGenerator::new();
        let ids: HashSet<String> = (0..200)
            .map(|_| generator.generate_id().unwrap())
            .collect();
        assert_eq!(ids.len(), 200);
    }
}
