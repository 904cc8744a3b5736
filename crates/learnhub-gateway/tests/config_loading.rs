use std::{env, fs};

use learnhub_gateway::{ConfigError, CredentialScheme, GatewayConfig};

#[test]
fn config_parsing_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("learnhub.toml");

    let toml_content = r#"
base_url = "https://lms.example.com"
request_timeout_ms = 2500
auth_scheme = "Token"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = GatewayConfig::load(path.to_str()).expect("should parse config");
    assert_eq!(cfg.base_url, "https://lms.example.com");
    assert_eq!(cfg.request_timeout_ms, Some(2500));
    assert_eq!(cfg.credential_scheme().unwrap(), CredentialScheme::Token);
    assert!(cfg.user_agent.is_some());

    // 2) Env override should win over file
    unsafe {
        env::set_var("LEARNHUB__REQUEST_TIMEOUT_MS", "900");
    }
    let cfg_env = GatewayConfig::load(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.request_timeout_ms, Some(900));
    unsafe {
        env::remove_var("LEARNHUB__REQUEST_TIMEOUT_MS");
    }

    // 3) Invalid values are rejected
    fs::write(&path, "base_url = \"ftp://lms.example.com\"\n").expect("write toml");
    let err = GatewayConfig::load(path.to_str()).expect_err("ftp base url should be rejected");
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("absent.toml");

    let cfg = GatewayConfig::load(path.to_str()).expect("defaults should load");
    assert_eq!(cfg.base_url, learnhub_gateway::config::DEFAULT_BASE_URL);
    assert_eq!(cfg.credential_scheme().unwrap(), CredentialScheme::Bearer);
}
