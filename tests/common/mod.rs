//! Common test utilities

#![allow(dead_code)]

use cmdtree::{CommandSpec, ParsedArgs, Plugin};
use futures::FutureExt;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory with a cmdtree.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("cmdtree.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test config with an empty subdirectory next to it
pub fn create_test_config_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, config_path) = create_test_config(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, config_path, sub_dir)
}

/// Context recording what handlers and plugins saw
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<(String, ParsedArgs)>>,
}

impl Recorder {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(String, ParsedArgs)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Command that records its name and arguments
pub fn recording(name: &'static str) -> CommandSpec<Recorder> {
    CommandSpec::new(name, move |ctx: &Recorder, args| {
        async move {
            ctx.push(format!("{name}:action"));
            ctx.calls.lock().unwrap().push((name.to_string(), args));
            Ok(())
        }
        .boxed()
    })
}

/// Plugin that records `label@node` and continues
pub fn tracing_plugin(label: &'static str) -> Plugin<Recorder> {
    Plugin::new(move |ctx: &Recorder, _args, next, node| {
        async move {
            ctx.push(format!("{label}@{}", node.name()));
            next.run().await
        }
        .boxed()
    })
}

/// Plugin that never continues
pub fn guard_plugin() -> Plugin<Recorder> {
    Plugin::new(|ctx: &Recorder, _args, _next, node| {
        async move {
            ctx.push(format!("guard@{}", node.name()));
            Ok(())
        }
        .boxed()
    })
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
