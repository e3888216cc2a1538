//! Tree file parsing and discovery

use crate::config::types::{NodeConfig, TreeConfig};
use crate::error::{CliError, ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default tree file names to search for
const TREE_FILE_NAMES: &[&str] = &["cmdtree.yml", "cmdtree.yaml"];

/// Find the tree file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the tree file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in TREE_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a tree file from a path
pub fn parse_config_file(path: &Path) -> Result<TreeConfig, CliError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_config(&contents, Some(path))
}

/// Parse a tree definition from a string
///
/// `include` entries are resolved relative to `config_path` when one is
/// given, and left untouched otherwise.
pub fn parse_config(yaml: &str, config_path: Option<&Path>) -> Result<TreeConfig, CliError> {
    let mut config: TreeConfig = serde_yaml::from_str(yaml)?;

    if let Some(path) = config_path {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut chain = vec![canonical(path)];
        process_includes(&mut config.children, base_dir, &mut chain)?;
    }

    Ok(config)
}

/// Path used to recognise a file already on the include chain
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Replace every node carrying `include` with the node loaded from that file
///
/// `chain` holds the files being included above the current nodes; naming
/// one of them again is an include cycle.
fn process_includes(
    nodes: &mut [NodeConfig],
    base_dir: &Path,
    chain: &mut Vec<PathBuf>,
) -> ConfigResult<()> {
    for node in nodes.iter_mut() {
        if let Some(include_path) = node.include.take() {
            let full_path = base_dir.join(&include_path);
            let key = canonical(&full_path);
            if chain.contains(&key) {
                return Err(ConfigError::IncludeFile {
                    path: full_path,
                    error: "include cycle".to_string(),
                });
            }

            let mut included = load_included_node(&full_path)?;

            // The including entry names the node and picks the default
            if !node.name.is_empty() {
                included.name = std::mem::take(&mut node.name);
            }
            included.default |= node.default;
            *node = included;

            if let Some(children) = node.children.as_mut() {
                let include_dir = full_path.parent().unwrap_or(base_dir).to_path_buf();
                chain.push(key);
                let result = process_includes(children, &include_dir, chain);
                chain.pop();
                result?;
            }
        } else if let Some(children) = node.children.as_mut() {
            process_includes(children, base_dir, chain)?;
        }
    }

    Ok(())
}

/// Load a node from an included file
fn load_included_node(path: &Path) -> ConfigResult<NodeConfig> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let node: NodeConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    if node.include.is_some() {
        return Err(ConfigError::IncludeFile {
            path: path.to_path_buf(),
            error: "included nodes cannot include another file at the top level".to_string(),
        });
    }

    Ok(node)
}

/// Parse the tree with automatic file discovery
pub fn parse_config_auto() -> Result<(TreeConfig, PathBuf), CliError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}
