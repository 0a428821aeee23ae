//! Token 签发、重建与吊销示例
//!
//! 运行：`RUST_LOG=jwtguard=debug cargo run --example issue_and_rebuild`

use jwtguard::{ClaimSet, JwtConfig, JwtManager};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> jwtguard::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = JwtConfig::new("demo-secret-key-at-least-32-bytes!")
        .with_token_ttl_minutes(15)
        .with_refresh(true)
        .with_refresh_ttl_days(7);
    let manager = JwtManager::new(config)?;

    println!("=== 签发用户 Token ===\n");
    let data = ClaimSet::from_value(json!({
        "euo": { "name": "alice", "role": "admin" },
        "user": { "id": 1 },
    }))?;
    let tokens = manager.issue(data)?;
    println!("{}\n", serde_json::to_string_pretty(&tokens).unwrap_or_default());

    println!("=== 重建 ===\n");
    let api = manager.rebuild(&tokens.api_token);
    println!("api_token     -> {:?} / {}", api.kind(), manager.validate_token(&api));

    if let Some(raw) = tokens.refresh_token.as_deref() {
        let refresh = manager.rebuild(raw);
        println!(
            "refresh_token -> {:?} / {}",
            refresh.kind(),
            manager.validate_token(&refresh)
        );
    }

    let broken = manager.rebuild("not-a-token");
    println!("garbage       -> {:?} / {}\n", broken.kind(), broken.status());

    println!("=== 吊销 ===\n");
    println!("blacklisted before: {}", manager.is_blacklisted(&tokens.api_token)?);
    manager.blacklist(&tokens.api_token)?;
    println!("blacklisted after:  {}", manager.is_blacklisted(&tokens.api_token)?);
    println!("inspect:            {}", manager.inspect(&tokens.api_token)?);

    Ok(())
}
