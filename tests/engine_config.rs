// tests/engine_config.rs
//
// Engine::from_env wiring: classifier selection and entity pattern
// loading driven by environment variables. Serialized because the
// variables are process-global.

use std::fs;

use serial_test::serial;

use reward_nlp_engine::classifier::ENV_CLASSIFIER_TEST_MODE;
use reward_nlp_engine::config::classifier::ENV_CLASSIFIER_CONFIG_PATH;
use reward_nlp_engine::entities::ENV_ENTITY_CONFIG_DIR;
use reward_nlp_engine::{Engine, FeedbackRequest, Provenance};

fn clear_env() {
    std::env::remove_var(ENV_CLASSIFIER_TEST_MODE);
    std::env::remove_var(ENV_CLASSIFIER_CONFIG_PATH);
    std::env::remove_var(ENV_ENTITY_CONFIG_DIR);
}

#[tokio::test]
#[serial]
async fn mock_mode_scores_every_sentence_externally() {
    clear_env();
    std::env::set_var(ENV_CLASSIFIER_TEST_MODE, "mock");

    let engine = Engine::from_env();
    let info = engine.model_info();
    assert_eq!(info.classifier.provider, "mock");
    assert!(info.classifier.enabled);

    let out = engine
        .process_feedback(&FeedbackRequest::new("Solid quarter overall.", "peer"))
        .await
        .unwrap();
    assert!(out
        .sentences
        .iter()
        .all(|s| s.provenance == Provenance::External));

    clear_env();
}

#[tokio::test]
#[serial]
async fn invalid_classifier_config_degrades_to_rule_based() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("classifier.toml");
    fs::write(&path, "enabled = true\nprovider = \"nonsense\"\n").unwrap();
    std::env::set_var(ENV_CLASSIFIER_CONFIG_PATH, path.display().to_string());

    let info = Engine::from_env().model_info();
    assert!(!info.classifier.enabled);
    assert_eq!(info.classifier.provider, "disabled");

    clear_env();
}

#[test]
#[serial]
fn entity_patterns_come_from_configured_dir() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("codes.json"),
        r#"{ "patterns": [ { "regex": "\\bC-\\d+\\b", "label": "commission" } ] }"#,
    )
    .unwrap();
    std::env::set_var(ENV_ENTITY_CONFIG_DIR, tmp.path());

    let info = Engine::from_env().model_info();
    assert!(info.features.entity_tagging);
    assert_eq!(info.entity_patterns_count, 1);

    clear_env();
}

#[test]
#[serial]
fn shipped_entity_patterns_load_by_default() {
    clear_env();
    // cargo runs integration tests from the package root
    let info = Engine::from_env().model_info();
    assert!(info.entity_patterns_count >= 5);
    clear_env();
}
