//! Main CLI application

use crate::cli::logging::init_logging;
use crate::config::{build_tree, parse_config_auto, parse_config_file, run_context, TreeConfig};
use crate::error::{CliError, ConfigError};
use crate::node::{Group, Lifecycle, Outcome};
use crate::resolver::Env;
use crate::runner::RunContext;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Verbosity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Normal = 1,
    Verbose = 2,
}

impl Verbosity {
    /// Log filter used when `RUST_LOG` is not set
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
        }
    }
}

/// CLI application
pub struct App {
    /// The constructed command tree
    tree: Group<RunContext>,
    /// Shell settings for the tree's commands
    ctx: RunContext,
    /// Tree file path
    config_path: PathBuf,
}

impl App {
    /// Create a new app from the discovered tree file
    pub fn new() -> Result<Self, CliError> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_config(config, config_path)
    }

    /// Create app with a specific tree file
    pub fn with_config_file(path: PathBuf) -> Result<Self, CliError> {
        let config = parse_config_file(&path)?;
        Self::from_config(config, path)
    }

    fn from_config(config: TreeConfig, config_path: PathBuf) -> Result<Self, CliError> {
        let tree = build_tree(&config)?;
        let ctx = run_context(&config, Some(config_path.clone()));

        debug!(path = %config_path.display(), root = tree.meta().name(), "loaded tree");

        Ok(App {
            tree,
            ctx,
            config_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn tree(&self) -> &Group<RunContext> {
        &self.tree
    }

    /// Run the tree with argv tokens and an optional environment
    pub async fn run(&self, argv: Vec<String>, env: Option<&Env>) -> Result<Outcome, CliError> {
        self.tree.execute_argv(&self.ctx, argv, env).await
    }
}

/// Build the clap command for cmdtree's own flags
pub fn build_command() -> Command {
    Command::new("cmdtree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run a command tree defined in YAML")
        .override_usage("cmdtree [OPTIONS] [ARGS]...")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to cmdtree.yml"),
        )
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .value_name("FILE")
                .help("Read extra environment variables from a dotenv file"),
        )
        .arg(
            Arg::new("no-env")
                .long("no-env")
                .help("Do not resolve options from environment variables")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log resolution and dispatch details")
                .action(ArgAction::SetTrue),
        )
}

/// Split process args into cmdtree's own flags and the tree's argv
///
/// Own flags are only recognized before the first other token. A `--` at
/// that point ends them and is dropped; everything after the split is
/// handed to the tree verbatim.
pub fn split_args(args: &[String]) -> (Vec<String>, Vec<String>) {
    let mut own = vec![args
        .first()
        .cloned()
        .unwrap_or_else(|| "cmdtree".to_string())];
    let mut i = 1;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--" => {
                i += 1;
                break;
            }
            "-f" | "--file" | "--env-file" => {
                own.extend(args[i..].iter().take(2).cloned());
                i += 2;
            }
            "-q" | "--quiet" | "-v" | "--verbose" | "--no-env" | "-h" | "--help" | "-V"
            | "--version" => {
                own.push(arg.to_string());
                i += 1;
            }
            _ if arg.starts_with("--file=") || arg.starts_with("--env-file=") => {
                own.push(arg.to_string());
                i += 1;
            }
            _ => break,
        }
    }

    let argv = args.get(i..).map(<[String]>::to_vec).unwrap_or_default();
    (own, argv)
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Build the environment mapping handed to the tree
///
/// The process environment comes first (unless disabled), then the dotenv
/// file. The process environment itself is never modified.
pub fn build_env<I>(process_env: I, no_env: bool, env_file: Option<&Path>) -> Result<Env, CliError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env = Env::new();

    if !no_env {
        env.extend(process_env);
    }

    if let Some(path) = env_file {
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
        })?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                ConfigError::Invalid(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            env.insert(key, value);
        }
    }

    Ok(env)
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().collect();
    let (own, argv) = split_args(&args);
    let matches = build_command().get_matches_from(own);

    init_logging(get_verbosity(&matches));

    let app = match matches.get_one::<String>("file") {
        Some(path) => App::with_config_file(PathBuf::from(path))?,
        None => App::new()?,
    };

    let no_env = matches.get_flag("no-env");
    let env_file = matches.get_one::<String>("env-file").map(PathBuf::from);
    let env = if no_env && env_file.is_none() {
        None
    } else {
        Some(build_env(std::env::vars(), no_env, env_file.as_deref())?)
    };

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let outcome = runtime.block_on(app.run(argv, env.as_ref()))?;

    if let Outcome::Halted { node } = outcome {
        debug!(%node, "stopped by plugin");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_verbosity_normal() {
        let matches = build_command().get_matches_from(vec!["cmdtree"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);

        let matches = build_command().get_matches_from(vec!["cmdtree", "-v"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Verbose);
        assert_eq!(Verbosity::Verbose.filter(), "debug");
    }

    #[test]
    fn test_split_args() {
        let (own, argv) = split_args(&strings(&[
            "cmdtree", "-f", "tree.yml", "-v", "deploy", "--env", "prod", "--", "-x",
        ]));
        assert_eq!(own, strings(&["cmdtree", "-f", "tree.yml", "-v"]));
        assert_eq!(argv, strings(&["deploy", "--env", "prod", "--", "-x"]));
    }

    #[test]
    fn test_split_args_stops_at_unknown_flag() {
        let (own, argv) = split_args(&strings(&["cmdtree", "--log-level", "debug", "-v"]));
        assert_eq!(own, strings(&["cmdtree"]));
        assert_eq!(argv, strings(&["--log-level", "debug", "-v"]));
    }

    #[test]
    fn test_split_args_leading_separator() {
        let (own, argv) = split_args(&strings(&["cmdtree", "--no-env", "--", "--help"]));
        assert_eq!(own, strings(&["cmdtree", "--no-env"]));
        assert_eq!(argv, strings(&["--help"]));
    }

    #[test]
    fn test_split_args_dangling_file_flag() {
        let (own, argv) = split_args(&strings(&["cmdtree", "--file"]));
        assert_eq!(own, strings(&["cmdtree", "--file"]));
        assert!(argv.is_empty());
    }

    #[test]
    fn test_build_env_overlays_dotenv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "LOG_LEVEL=debug\nTOKEN=abc\n").unwrap();

        let process = vec![
            ("LOG_LEVEL".to_string(), "info".to_string()),
            ("HOME".to_string(), "/home/x".to_string()),
        ];
        let env = build_env(process.clone(), false, Some(path.as_path())).unwrap();
        assert_eq!(env["LOG_LEVEL"], "debug");
        assert_eq!(env["TOKEN"], "abc");
        assert_eq!(env["HOME"], "/home/x");

        let env = build_env(process, true, Some(path.as_path())).unwrap();
        assert!(!env.contains_key("HOME"));
        assert_eq!(env["TOKEN"], "abc");
    }

    #[test]
    fn test_build_env_missing_file() {
        let err = build_env(Vec::new(), false, Some(Path::new("/no/such/.env"))).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_app_runs_tree_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cmdtree.yml");
        fs::write(
            &path,
            r#"
children:
  - name: touch
    options:
      file: { default: made.txt }
    run: touch ${file}
"#,
        )
        .unwrap();

        let app = App::with_config_file(path.clone()).unwrap();
        assert_eq!(app.config_path(), path.as_path());

        let outcome = app.run(strings(&["touch"]), None).await.unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert!(dir.path().join("made.txt").exists());
    }
}
