//! Conversion of a tree definition into a command tree

use crate::config::schema::validate_config;
use crate::config::types::{NodeConfig, NodeKind, OptionConfig, TreeConfig};
use crate::error::{ConfigResult, Result};
use crate::node::{app, CommandSpec, Group, GroupSpec, NodeSpec};
use crate::option::Options;
use crate::resolver::ParsedArgs;
use crate::runner::{run_templates, RunContext};
use futures::FutureExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the root group when the definition has none
pub const DEFAULT_ROOT_NAME: &str = "cmdtree";

fn to_options(options: &BTreeMap<String, OptionConfig>) -> Options {
    options
        .iter()
        .map(|(key, option)| (key.clone(), option.to_spec()))
        .collect()
}

/// Run the node's templates, or print its arguments when it has none
async fn perform(templates: Arc<[String]>, ctx: &RunContext, args: ParsedArgs) -> Result<()> {
    if templates.is_empty() {
        print!("{}", serde_yaml::to_string(&args)?);
    } else {
        run_templates(&templates, &args, ctx)?;
    }
    Ok(())
}

fn command_spec(node: &NodeConfig) -> CommandSpec<RunContext> {
    let templates: Arc<[String]> = node.run.clone().into();

    let mut spec = CommandSpec::new(node.name.clone(), move |ctx: &RunContext, args: ParsedArgs| {
        perform(Arc::clone(&templates), ctx, args).boxed()
    })
    .with_options(to_options(&node.options));

    if node.default {
        spec = spec.as_default();
    }
    if let Some(usage) = &node.usage {
        spec = spec.with_usage(usage.clone());
    }
    if let Some(description) = &node.description {
        spec = spec.with_description(description.clone());
    }
    spec
}

fn group_spec(node: &NodeConfig) -> GroupSpec<RunContext> {
    let mut spec = GroupSpec::new(node.name.clone()).with_options(to_options(&node.options));

    for child in node.children.iter().flatten() {
        spec = spec.child(node_spec(child));
    }

    if node.default {
        spec = spec.as_default();
    }
    if let Some(usage) = &node.usage {
        spec = spec.with_usage(usage.clone());
    }
    if let Some(description) = &node.description {
        spec = spec.with_description(description.clone());
    }
    spec
}

fn node_spec(node: &NodeConfig) -> NodeSpec<RunContext> {
    match node.kind() {
        NodeKind::Command => command_spec(node).into(),
        NodeKind::Group => group_spec(node).into(),
    }
}

/// Root group spec for a tree definition
pub fn tree_spec(config: &TreeConfig) -> GroupSpec<RunContext> {
    let name = config.name.as_deref().unwrap_or(DEFAULT_ROOT_NAME);
    let mut spec = GroupSpec::new(name).with_options(to_options(&config.options));

    for child in &config.children {
        spec = spec.child(node_spec(child));
    }

    if let Some(usage) = &config.usage {
        spec = spec.with_usage(usage.clone());
    }
    if let Some(description) = &config.description {
        spec = spec.with_description(description.clone());
    }
    spec
}

/// Validate a definition and construct its tree
pub fn build_tree(config: &TreeConfig) -> ConfigResult<Group<RunContext>> {
    validate_config(config)?;
    app(tree_spec(config))
}

/// Run context for a definition loaded from `config_path`
///
/// Commands of a tree file run in the directory holding it.
pub fn run_context(config: &TreeConfig, config_path: Option<PathBuf>) -> RunContext {
    let mut ctx = RunContext::new();

    if let Some(interpreter) = &config.interpreter {
        ctx = ctx.with_interpreter(interpreter.clone());
    }
    if let Some(path) = config_path {
        ctx = ctx.with_config_path(path);
        let dir = ctx.config_dir();
        ctx = ctx.with_working_dir(dir);
    }

    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::{CliError, ConfigError, DispatchError, ValidationError};
    use crate::node::{Lifecycle, Outcome};
    use tempfile::TempDir;

    const TREE: &str = r#"
name: app
options:
  log-level: { default: info, choices: [debug, info, warn] }
children:
  - name: deploy
    default: true
    options:
      env: { default: dev }
      replicas: { type: number, default: 1 }
    run: echo ${env} ${replicas} > out.txt
  - name: db
    children:
      - name: migrate
        run: [ "echo one >> out.txt", "echo two >> out.txt" ]
"#;

    fn tree() -> Group<RunContext> {
        build_tree(&parse_config(TREE, None).unwrap()).unwrap()
    }

    #[test]
    fn test_build_shape() {
        let group = tree();
        assert_eq!(group.meta().name(), "app");
        assert!(group.meta().options().contains_key("log-level"));

        let deploy = group.child("deploy").unwrap();
        assert!(deploy.is_default());
        assert!(deploy.as_command().is_some());

        let db = group.child("db").unwrap().as_group().unwrap();
        assert!(db.child("migrate").is_some());
    }

    #[test]
    fn test_root_name_default() {
        let config = parse_config("children: []\n", None).unwrap();
        let group = build_tree(&config).unwrap();
        assert_eq!(group.meta().name(), DEFAULT_ROOT_NAME);
    }

    #[test]
    fn test_duplicate_children_rejected() {
        let yaml = r#"
children:
  - name: a
  - name: a
"#;
        let config = parse_config(yaml, None).unwrap();
        assert!(matches!(
            build_tree(&config),
            Err(ConfigError::DuplicateChild { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_default_command() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new().with_working_dir(dir.path().to_path_buf());

        let outcome = tree().execute(&ctx, Vec::<String>::new(), None).await.unwrap();

        assert_eq!(outcome, Outcome::Completed);
        let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out.trim(), "dev 1");
    }

    #[tokio::test]
    async fn test_run_named_command_with_options() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new().with_working_dir(dir.path().to_path_buf());

        tree()
            .execute(&ctx, ["deploy", "--env", "prod", "--replicas", "3"], None)
            .await
            .unwrap();

        let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out.trim(), "prod 3");
    }

    #[tokio::test]
    async fn test_run_nested_templates() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new().with_working_dir(dir.path().to_path_buf());

        tree().execute(&ctx, ["db", "migrate"], None).await.unwrap();

        let out = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out, "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_choices_enforced() {
        let ctx = RunContext::new();
        let err = tree()
            .execute(&ctx, ["--log-level", "loud", "deploy", "--env", "x"], None)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::InvalidValue("log-level".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let ctx = RunContext::new();
        let err = tree().execute(&ctx, ["nope"], None).await.unwrap_err();
        assert_eq!(
            err.as_dispatch(),
            Some(&DispatchError::UnknownCommand("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failing_template() {
        let yaml = r#"
children:
  - name: fail
    run: exit 4
"#;
        let group = build_tree(&parse_config(yaml, None).unwrap()).unwrap();
        let err = group
            .execute(&RunContext::new(), ["fail"], None)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Run(_)));
    }

    #[test]
    fn test_run_context_interpreter() {
        let config = parse_config("interpreter: [bash, -c]\nchildren: []\n", None).unwrap();
        let ctx = run_context(&config, Some(PathBuf::from("/p/cmdtree.yml")));
        assert_eq!(ctx.interpreter, vec!["bash", "-c"]);
        assert_eq!(ctx.working_dir, PathBuf::from("/p"));
    }
}
