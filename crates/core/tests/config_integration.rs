//! dockwatch.toml 통합 설정 테스트
//!
//! - dockwatch.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use dockwatch_core::config::{DockwatchConfig, parse_api_version};
use dockwatch_core::error::{ConfigError, DockwatchError};

const EXAMPLE: &str = include_str!("../../../dockwatch.toml.example");

/// 환경변수를 설정한 채로 `f`를 실행하고 원래 값으로 되돌립니다.
fn with_env<T>(key: &str, value: &str, f: impl FnOnce() -> T) -> T {
    let original = std::env::var(key).ok();
    // SAFETY: 호출하는 테스트는 serial_test로 직렬화됩니다.
    unsafe {
        std::env::set_var(key, value);
    }
    let result = f();
    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var(key, val),
            None => std::env::remove_var(key),
        }
    }
    result
}

// =============================================================================
// dockwatch.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = DockwatchConfig::parse(EXAMPLE).expect("example config should parse");
    config.validate().expect("example config should validate");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert!(config.docker.endpoint.is_empty());
    assert!(config.docker.api_version.is_empty());
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = DockwatchConfig::parse(EXAMPLE).expect("should parse");
    let from_code = DockwatchConfig::default();

    assert_eq!(from_file.general, from_code.general);
    assert_eq!(from_file.docker, from_code.docker);
    assert_eq!(from_file.metrics, from_code.metrics);
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"
"#;
    let config = DockwatchConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "pretty");
    // docker 섹션은 기본값
    assert_eq!(config.docker.backoff_initial_ms, 1_000);
    assert_eq!(config.docker.backoff_max_ms, 20_000);
}

#[test]
fn partial_config_single_docker_field() {
    let toml = r#"
[docker]
endpoint = "10.0.0.5:2375"
"#;
    let config = DockwatchConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.docker.endpoint, "10.0.0.5:2375");
    assert_eq!(config.docker.backoff_initial_ms, 1_000);
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn pinned_api_version_is_parsed() {
    let toml = r#"
[docker]
api_version = "1.41"
"#;
    let config = DockwatchConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");
    assert_eq!(parse_api_version(&config.docker.api_version), Some((1, 41)));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[general]
log_level = "info"
"#;
    let level = with_env("DOCKWATCH_GENERAL_LOG_LEVEL", "error", || {
        let mut config = DockwatchConfig::parse(toml).expect("should parse");
        config.apply_env_overrides();
        config.general.log_level
    });
    assert_eq!(level, "error");
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let initial = with_env("DOCKWATCH_DOCKER_BACKOFF_INITIAL_MS", "250", || {
        let mut config = DockwatchConfig::default();
        config.apply_env_overrides();
        config.docker.backoff_initial_ms
    });
    assert_eq!(initial, 250);
}

#[test]
#[serial_test::serial]
fn env_override_unparsable_number_keeps_value() {
    let max = with_env("DOCKWATCH_DOCKER_BACKOFF_MAX_MS", "soon", || {
        let mut config = DockwatchConfig::parse("[docker]\nbackoff_max_ms = 4000\n")
            .expect("should parse");
        config.apply_env_overrides();
        config.docker.backoff_max_ms
    });
    assert_eq!(max, 4000);
}

#[test]
#[serial_test::serial]
fn env_override_can_fail_validation() {
    let result = with_env("DOCKWATCH_DOCKER_API_VERSION", "latest", || {
        let mut config = DockwatchConfig::default();
        config.apply_env_overrides();
        config.validate()
    });
    assert!(matches!(
        result,
        Err(DockwatchError::Config(ConfigError::InvalidValue { ref field, .. }))
            if field == "docker.api_version"
    ));
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[test]
fn backoff_ceiling_is_enforced() {
    let config = DockwatchConfig::parse("[docker]\nbackoff_max_ms = 7200000\n").expect("should parse");
    assert!(matches!(
        config.validate(),
        Err(DockwatchError::Config(ConfigError::InvalidValue { ref field, .. }))
            if field == "docker.backoff_max_ms"
    ));
}

#[test]
fn empty_string_parses_with_defaults() {
    let config = DockwatchConfig::parse("").expect("empty should parse");
    config.validate().expect("defaults should validate");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = DockwatchConfig::parse("[general\nlog_level = ");
    assert!(matches!(
        result,
        Err(DockwatchError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let result = DockwatchConfig::parse("[docker]\nbackoff_initial_ms = \"fast\"\n");
    assert!(matches!(
        result,
        Err(DockwatchError::Config(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[general]
log_level = "warn"

[tracing]
sample_rate = 0.5
"#;
    let config = DockwatchConfig::parse(toml).expect("unknown section should be ignored");
    assert_eq!(config.general.log_level, "warn");
}

#[tokio::test]
async fn from_file_nonexistent_returns_file_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = DockwatchConfig::from_file(dir.path().join("nope.toml")).await;
    assert!(matches!(
        result,
        Err(DockwatchError::Config(ConfigError::FileNotFound { .. }))
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_example_config_from_disk() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let example_path = format!("{manifest_dir}/../../dockwatch.toml.example");

    let config = DockwatchConfig::load(&example_path)
        .await
        .expect("example should load");
    assert_eq!(config.docker.backoff_max_ms, 20_000);
}

// =============================================================================
// 직렬화 라운드트립 테스트
// =============================================================================

#[test]
fn serialize_and_reparse_roundtrip() {
    let mut config = DockwatchConfig::default();
    config.docker.endpoint = "unix:///run/docker.sock".to_owned();
    config.docker.backoff_max_ms = 60_000;

    let serialized = toml::to_string(&config).expect("should serialize");
    let reparsed = DockwatchConfig::parse(&serialized).expect("should reparse");

    assert_eq!(reparsed.docker, config.docker);
    assert_eq!(reparsed.general, config.general);
}
