//! Integration tests for YAML tree definitions

mod common;

use cmdtree::config::{
    build_tree, find_config_file_from, parse_config, parse_config_file, run_context, NodeKind,
};
use cmdtree::error::{CliError, ConfigError, ValidationError};
use cmdtree::{Env, Lifecycle, OptionType, Outcome, Value};
use common::{create_test_config, create_test_config_in_subdir};
use std::fs;

const TREE: &str = r#"
name: ops
description: Operations tree
options:
  log-level:
    default: info
    choices: [debug, info, warn]
children:
  - name: deploy
    default: true
    usage: deploy [--env ENV]
    options:
      env: { default: staging }
      replicas: { type: number, default: 1 }
      dry-run: { type: boolean }
    run: echo ${env}:${replicas}:${dryRun} > deploy.txt
  - name: db
    children:
      - name: migrate
        options:
          step: { type: array }
        run:
          - echo steps ${step} > migrate.txt
          - echo "done" >> migrate.txt
      - name: show
        description: Print the resolved arguments
"#;

#[test]
fn test_parse_complete_tree() {
    let config = parse_config(TREE, None).unwrap();

    assert_eq!(config.name.as_deref(), Some("ops"));
    assert_eq!(config.options["log-level"].choices.len(), 3);

    let deploy = &config.children[0];
    assert_eq!(deploy.kind(), NodeKind::Command);
    assert!(deploy.default);
    assert_eq!(deploy.options["replicas"].option_type, OptionType::Number);
    assert_eq!(deploy.options["replicas"].default, Some(Value::Number(1.0)));

    let db = &config.children[1];
    assert_eq!(db.kind(), NodeKind::Group);
    assert_eq!(db.children.as_ref().unwrap().len(), 2);
}

#[test]
fn test_find_config_from_subdir() {
    let (_dir, config_path, sub_dir) = create_test_config_in_subdir(TREE);
    assert_eq!(find_config_file_from(sub_dir).unwrap(), config_path);
}

#[test]
fn test_bool_alias() {
    let yaml = r#"
children:
  - name: build
    options:
      release: { type: bool }
"#;
    let config = parse_config(yaml, None).unwrap();
    assert_eq!(
        config.children[0].options["release"].option_type,
        OptionType::Boolean
    );
}

#[test]
fn test_default_type_mismatch_rejected() {
    let yaml = r#"
children:
  - name: build
    options:
      jobs: { type: number, default: many }
"#;
    let config = parse_config(yaml, None).unwrap();
    assert!(matches!(
        build_tree(&config),
        Err(ConfigError::DefaultTypeMismatch { ref option, .. }) if option == "jobs"
    ));
}

#[test]
fn test_multiple_defaults_rejected() {
    let yaml = r#"
children:
  - name: a
    default: true
  - name: b
    default: true
"#;
    let config = parse_config(yaml, None).unwrap();
    assert!(matches!(
        build_tree(&config),
        Err(ConfigError::MultipleDefaults(_))
    ));
}

#[test]
fn test_reserved_option_name_rejected() {
    let yaml = r#"
children:
  - name: build
    options:
      passthrough: { type: array }
"#;
    let config = parse_config(yaml, None).unwrap();
    assert!(matches!(
        build_tree(&config),
        Err(ConfigError::ReservedOptionName(ref option)) if option == "passthrough"
    ));
}

#[test]
fn test_invalid_yaml() {
    let err = parse_config("children: [", None).unwrap_err();
    assert!(matches!(err, CliError::Yaml(_)));
}

#[tokio::test]
async fn test_default_command_runs_with_env() {
    let (dir, config_path) = create_test_config(TREE);
    let config = parse_config_file(&config_path).unwrap();
    let tree = build_tree(&config).unwrap();
    let ctx = run_context(&config, Some(config_path));
    let env: Env = [("ENV".to_string(), "prod".to_string())].into_iter().collect();

    let outcome = tree.execute(&ctx, Vec::<String>::new(), Some(&env)).await.unwrap();

    assert_eq!(outcome, Outcome::Completed);
    let out = fs::read_to_string(dir.path().join("deploy.txt")).unwrap();
    // Unresolved references reach the shell, which expands them to nothing
    assert_eq!(out.trim(), "prod:1:");
}

#[tokio::test]
async fn test_named_command_with_flags() {
    let (dir, config_path) = create_test_config(TREE);
    let config = parse_config_file(&config_path).unwrap();
    let tree = build_tree(&config).unwrap();
    let ctx = run_context(&config, Some(config_path));

    tree.execute(&ctx, ["deploy", "--dry-run", "--replicas", "0x2"], None)
        .await
        .unwrap();

    let out = fs::read_to_string(dir.path().join("deploy.txt")).unwrap();
    assert_eq!(out.trim(), "staging:2:true");
}

#[tokio::test]
async fn test_nested_array_option() {
    let (dir, config_path) = create_test_config(TREE);
    let config = parse_config_file(&config_path).unwrap();
    let tree = build_tree(&config).unwrap();
    let ctx = run_context(&config, Some(config_path));

    tree.execute(&ctx, ["db", "migrate", "--step", "a", "--step", "b"], None)
        .await
        .unwrap();

    let out = fs::read_to_string(dir.path().join("migrate.txt")).unwrap();
    assert_eq!(out, "steps a b\ndone\n");
}

#[tokio::test]
async fn test_root_option_choices() {
    let (_dir, config_path) = create_test_config(TREE);
    let config = parse_config_file(&config_path).unwrap();
    let tree = build_tree(&config).unwrap();
    let ctx = run_context(&config, Some(config_path));

    assert!(tree.meta().options().contains_key("log-level"));

    let err = tree
        .execute(&ctx, ["--log-level", "trace", "deploy"], None)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::InvalidValue("log-level".to_string()))
    );
}
