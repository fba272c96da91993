// tests/config_env.rs
//
// EngineConfig::load() resolution: file → env overrides.
// Env vars and CWD are process-global, so every test here is #[serial].

use std::env;
use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use ritmo_score::config::{
    EngineConfig, HistoryBackend, DEFAULT_HISTORY_PATH, ENV_CONFIG_PATH, ENV_HISTORY_PATH,
    ENV_METRICS, ENV_TEMPLATES_PATH,
};
use ritmo_score::RitmoEngine;
use ritmo_score::{CheckIn, Environment, Mood};

fn clear_env() {
    for k in [ENV_CONFIG_PATH, ENV_HISTORY_PATH, ENV_TEMPLATES_PATH, ENV_METRICS] {
        env::remove_var(k);
    }
}

/// Run `f` with the CWD set to a fresh temp dir, restoring it afterwards.
fn in_temp_cwd<F: FnOnce(&std::path::Path)>(f: F) {
    let dir = tempfile::tempdir().expect("tempdir");
    let old = env::current_dir().expect("cwd");
    env::set_current_dir(dir.path()).expect("chdir");
    f(dir.path());
    env::set_current_dir(old).expect("restore cwd");
}

#[test]
#[serial]
fn defaults_when_nothing_is_configured() {
    clear_env();
    in_temp_cwd(|_| {
        let cfg = EngineConfig::load().expect("load");
        assert_eq!(
            cfg.history,
            HistoryBackend::Jsonl(PathBuf::from(DEFAULT_HISTORY_PATH))
        );
        assert!(cfg.templates_path.is_none());
        assert!(cfg.metrics_enabled);
    });
}

#[test]
#[serial]
fn default_file_in_cwd_is_picked_up() {
    clear_env();
    in_temp_cwd(|dir| {
        fs::create_dir_all(dir.join("config")).unwrap();
        fs::write(
            dir.join("config/ritmo.toml"),
            "[history]\npath = \"memory\"\n[metrics]\nenabled = false\n",
        )
        .unwrap();

        let cfg = EngineConfig::load().expect("load");
        assert_eq!(cfg.history, HistoryBackend::Memory);
        assert!(!cfg.metrics_enabled);
    });
}

#[test]
#[serial]
fn explicit_path_must_exist() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    env::set_var(ENV_CONFIG_PATH, dir.path().join("missing.toml"));
    let err = EngineConfig::load().unwrap_err();
    assert!(err.to_string().contains(ENV_CONFIG_PATH));
    clear_env();
}

#[test]
#[serial]
fn malformed_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ritmo.toml");
    fs::write(&path, "[history\npath = ").unwrap();
    env::set_var(ENV_CONFIG_PATH, &path);
    assert!(EngineConfig::load().is_err());
    clear_env();
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("ritmo.toml");
    fs::write(
        &cfg_path,
        "[history]\npath = \"from-file.jsonl\"\n[metrics]\nenabled = true\n",
    )
    .unwrap();
    let history = dir.path().join("from-env.jsonl");

    env::set_var(ENV_CONFIG_PATH, &cfg_path);
    env::set_var(ENV_HISTORY_PATH, &history);
    env::set_var(ENV_TEMPLATES_PATH, "config/templates.json");
    env::set_var(ENV_METRICS, "0");

    let cfg = EngineConfig::load().expect("load");
    assert_eq!(cfg.history, HistoryBackend::Jsonl(history));
    assert_eq!(
        cfg.templates_path,
        Some(PathBuf::from("config/templates.json"))
    );
    assert!(!cfg.metrics_enabled);
    clear_env();
}

#[test]
#[serial]
fn engine_from_config_uses_templates_override() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates.json");
    fs::write(
        &templates,
        r#"{"mission_prefix":"Hoje: ","missions":{"study_block":"estudar 30 minutos."}}"#,
    )
    .unwrap();

    env::set_var(ENV_HISTORY_PATH, "memory");
    env::set_var(ENV_TEMPLATES_PATH, &templates);
    let cfg = in_memory_cfg();
    clear_env();

    let engine = RitmoEngine::from_config(&cfg);
    // Neutral level, first measurement → fallback mission.
    let o = engine
        .evaluate(&CheckIn::new("u", Mood::Good, 3, Environment::Home).sleep(7.0))
        .unwrap();
    assert_eq!(o.mission, "Hoje: estudar 30 minutos.");
    assert!(!o.insight.is_empty());
}

fn in_memory_cfg() -> EngineConfig {
    let mut out = None;
    in_temp_cwd(|_| out = Some(EngineConfig::load().expect("load")));
    let cfg = out.expect("config loaded");
    assert_eq!(cfg.history, HistoryBackend::Memory);
    cfg
}
