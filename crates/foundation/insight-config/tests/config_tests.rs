use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
struct TestAnalyzerConfig {
    pub horizon_days: u32,
    pub critical_ratio: f64,
    #[serde(default = "default_threads")]
    pub worker_threads: usize,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_threads() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
struct DefaultedConfig {
    pub horizon_days: u32,
    pub seed: u64,
}

#[test]
fn test_load_from_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.yaml");
    fs::write(
        &path,
        r#"
horizon_days: 7
critical_ratio: 0.5
keywords: ["nurse", "care"]
"#,
    )
    .unwrap();

    let config: TestAnalyzerConfig = insight_config::load_from_file(&path).unwrap();

    assert_eq!(config.horizon_days, 7);
    assert_eq!(config.critical_ratio, 0.5);
    assert_eq!(config.worker_threads, 4);
    assert_eq!(config.keywords, vec!["nurse", "care"]);
}

#[test]
fn test_load_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.toml");
    fs::write(
        &path,
        r#"
horizon_days = 14
critical_ratio = 0.4
worker_threads = 2
"#,
    )
    .unwrap();

    let config: TestAnalyzerConfig = insight_config::load_from_file(&path).unwrap();

    assert_eq!(config.horizon_days, 14);
    assert_eq!(config.worker_threads, 2);
}

#[test]
fn test_load_from_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.json");
    fs::write(&path, r#"{"horizon_days": 3, "critical_ratio": 0.45}"#).unwrap();

    let config: TestAnalyzerConfig = insight_config::load_from_file(&path).unwrap();

    assert_eq!(config.horizon_days, 3);
    assert!((config.critical_ratio - 0.45).abs() < 1e-12);
}

#[test]
fn test_env_override() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.yaml");
    fs::write(&path, "horizon_days: 7\ncritical_ratio: 0.5\n").unwrap();

    std::env::set_var("CFGTEST_ENV__HORIZON_DAYS", "21");
    std::env::set_var("CFGTEST_ENV__WORKER_THREADS", "8");

    let config: TestAnalyzerConfig = insight_config::load_with_env(&path, "CFGTEST_ENV").unwrap();

    assert_eq!(config.horizon_days, 21);
    assert_eq!(config.worker_threads, 8);
    assert_eq!(config.critical_ratio, 0.5);
}

#[test]
fn test_env_only_uses_defaults() {
    std::env::set_var("CFGTEST_DEFAULTS__SEED", "99");

    let config: DefaultedConfig = insight_config::load_env_only("CFGTEST_DEFAULTS").unwrap();

    assert_eq!(config.horizon_days, 0);
    assert_eq!(config.seed, 99);
}

#[test]
fn test_missing_required_field() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.yaml");
    fs::write(&path, "critical_ratio: 0.5\n").unwrap();

    let result: Result<TestAnalyzerConfig, _> = insight_config::load_from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_invalid_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("analyzer.toml");
    fs::write(&path, "horizon_days = [unterminated").unwrap();

    let result: Result<TestAnalyzerConfig, _> = insight_config::load_from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_nonexistent_file_error() {
    let result: Result<TestAnalyzerConfig, _> =
        insight_config::load_from_file("/nonexistent/path/analyzer.yaml");
    assert!(result.is_err());
}
