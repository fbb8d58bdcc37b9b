use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 16] = [
    "GONGGO_KINTEL_URL",
    "GONGGO_MODELS_URL",
    "GONGGO_STORE_PATH",
    "GONGGO_TIMEOUT_PARSE",
    "GONGGO_TIMEOUT_SUMMARY",
    "GONGGO_TIMEOUT_REQUEST",
    "GONGGO_CHUNK_SIZE",
    "GONGGO_MAX_FILE_SIZE",
    "GONGGO_FAQ_RETRY_DELAY",
    "GONGGO_GATEWAY_BIND",
    "GONGGO_GATEWAY_PORT",
    "GONGGO_GATEWAY_MAX_BODY",
    "GONGGO_KINTEL_UPSTREAM",
    "GONGGO_MODELS_UPSTREAM",
    "GONGGO_FAQ_UPSTREAM",
    "GONGGO_CONFIG",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.client.kintel_url, "http://127.0.0.1:3000/api/kintel");
    assert_eq!(config.client.models_url, "http://127.0.0.1:3000/api/models");
    assert_eq!(config.timeouts.parse_seconds, 30);
    assert_eq!(config.timeouts.summary_seconds, 120);
    assert_eq!(config.chunking.chunk_size, 500);
    assert!((config.chunking.window_ratio - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.faq.summary_cap, 800);
    assert_eq!(config.faq.chunk_cap, 600);
    assert_eq!(config.faq.chunk_min, 200);
    assert_eq!(config.faq.retry_cap, 300);
    assert_eq!(config.faq.retry_delay_seconds, 2);
    assert_eq!(config.limits.max_file_size, 50 * 1024 * 1024);
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.gateway.max_body_size, 60 * 1024 * 1024);
    assert_eq!(config.gateway.kintel_upstream, "http://localhost:51037");
    assert_eq!(config.gateway.models_upstream, "http://localhost:51036");
    assert_eq!(config.gateway.faq_upstream, "http://localhost:51038");
    config.validate().unwrap();
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    clear_env();
    let config = Config::load(Path::new("/nonexistent/gonggo.toml")).unwrap();
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.store.path, "./data/documents");
}

#[test]
#[serial]
fn parse_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[client]
kintel_url = "http://parser:51037"

[chunking]
chunk_size = 800

[gateway]
port = 8080
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.client.kintel_url, "http://parser:51037");
    assert_eq!(config.client.models_url, "http://127.0.0.1:3000/api/models");
    assert_eq!(config.chunking.chunk_size, 800);
    assert!((config.chunking.window_ratio - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.timeouts.summary_seconds, 120);
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[chunking\nchunk_size = ").unwrap();
    clear_env();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    std::fs::write(&path, "[timeouts]\nparse_seconds = 10\n").unwrap();

    clear_env();
    unsafe {
        std::env::set_var("GONGGO_TIMEOUT_PARSE", "45");
        std::env::set_var("GONGGO_TIMEOUT_SUMMARY", "90");
        std::env::set_var("GONGGO_KINTEL_URL", "http://10.0.0.1:51037");
        std::env::set_var("GONGGO_STORE_PATH", "/tmp/docs");
        std::env::set_var("GONGGO_MAX_FILE_SIZE", "1024");
        std::env::set_var("GONGGO_GATEWAY_PORT", "3100");
        std::env::set_var("GONGGO_FAQ_UPSTREAM", "http://faq:9000");
    }

    let config = Config::load(&path).unwrap();
    clear_env();

    assert_eq!(config.timeouts.parse_seconds, 45);
    assert_eq!(config.timeouts.summary_seconds, 90);
    assert_eq!(config.client.kintel_url, "http://10.0.0.1:51037");
    assert_eq!(config.store.path, "/tmp/docs");
    assert_eq!(config.limits.max_file_size, 1024);
    assert_eq!(config.gateway.port, 3100);
    assert_eq!(config.gateway.faq_upstream, "http://faq:9000");
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("GONGGO_CHUNK_SIZE", "lots");
        std::env::set_var("GONGGO_GATEWAY_PORT", "99999");
    }
    let config = Config::load(Path::new("/nonexistent.toml")).unwrap();
    clear_env();
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.gateway.port, 3000);
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = Config::default();
    config.chunking.chunk_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.client.models_url = "not a url".into();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("client.models_url"));

    let mut config = Config::default();
    config.chunking.window_ratio = 1.0;
    assert!(config.validate().is_err());
}

#[test]
fn derived_configs_carry_values() {
    let mut config = Config::default();
    config.timeouts.parse_seconds = 5;
    config.faq.retry_delay_seconds = 0;
    let client = config.client_config();
    assert_eq!(client.parse_timeout, Duration::from_secs(5));
    assert_eq!(client.summary_timeout, Duration::from_secs(120));
    assert_eq!(config.chunker_config().chunk_size, 500);
    assert_eq!(config.context_limits().retry_delay, Duration::ZERO);
    assert_eq!(config.context_limits().retry_cap, 300);
}
