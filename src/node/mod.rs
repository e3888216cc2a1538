//! Command tree
//!
//! This module holds the executable tree: groups that route to children and
//! commands that run handlers, both sharing one execution lifecycle:
//! resolve arguments, run the plugin chain, then perform the node's action.

pub mod command;
pub mod group;
pub mod plugin;
pub mod schema;
pub mod spec;

// Re-export main types
pub use command::*;
pub use group::*;
pub use plugin::*;
pub use spec::*;

use crate::error::{ConfigResult, Result};
use crate::option::Options;
use crate::resolver::{resolve, Env, ParsedArgs};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

/// Descriptive state shared by groups and commands
#[derive(Debug, Clone, Default)]
pub struct NodeMeta {
    name: String,
    default: bool,
    usage: Option<String>,
    description: Option<String>,
    options: Options,
}

impl NodeMeta {
    /// Metadata with only a name
    pub fn new(name: impl Into<String>) -> Self {
        NodeMeta {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build the metadata of a node from its spec header
    ///
    /// The merged options are the plugin options in attachment order followed
    /// by the node's own, so a node's own declaration wins on collision.
    pub(crate) fn build<C>(header: SpecHeader<C>, plugins: &PluginChain<C>) -> ConfigResult<Self> {
        schema::validate_name(&header.name)?;

        let options = plugins.options().merge(&header.options);
        schema::validate_option_names(&options)?;
        schema::validate_defaults(&options)?;

        Ok(NodeMeta {
            name: header.name,
            default: header.default,
            usage: header.usage,
            description: header.description,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node runs when its parent gets no subcommand
    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Own options merged with every attached plugin's options
    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// Execution lifecycle shared by every node kind
pub trait Lifecycle<C>: Send + Sync
where
    C: Send + Sync + 'static,
{
    fn meta(&self) -> &NodeMeta;

    fn plugins(&self) -> &PluginChain<C>;

    /// Node-specific action, run once every plugin continued
    fn perform_action<'a>(
        &'a self,
        _ctx: &'a C,
        _args: &'a ParsedArgs,
        _env: Option<&'a Env>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        async { Ok(Outcome::Completed) }.boxed()
    }

    /// Resolve `argv`, then run the plugin chain around the action
    fn execute_argv<'a>(
        &'a self,
        ctx: &'a C,
        argv: Vec<String>,
        env: Option<&'a Env>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        async move {
            let meta = self.meta();
            debug!(node = meta.name(), ?argv, "executing");

            let args = resolve(&argv, meta.options(), env)?;
            self.plugins()
                .run(ctx, &args, meta, || self.perform_action(ctx, &args, env))
                .await
        }
        .boxed()
    }
}

/// A node of the command tree
pub enum Node<C> {
    Command(Command<C>),
    Group(Group<C>),
}

impl<C> Node<C>
where
    C: Send + Sync + 'static,
{
    /// Build a node from its spec, appending `inherited` plugins after its own
    pub(crate) fn build(spec: NodeSpec<C>, inherited: Vec<std::sync::Arc<Plugin<C>>>) -> ConfigResult<Self> {
        match spec {
            NodeSpec::Command(spec) => Ok(Node::Command(Command::build(spec, inherited)?)),
            NodeSpec::Group(spec) => Ok(Node::Group(Group::build(spec, inherited)?)),
        }
    }

    pub fn name(&self) -> &str {
        self.meta().name()
    }

    pub fn is_default(&self) -> bool {
        self.meta().is_default()
    }

    pub fn as_command(&self) -> Option<&Command<C>> {
        match self {
            Node::Command(command) => Some(command),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group<C>> {
        match self {
            Node::Group(group) => Some(group),
            Node::Command(_) => None,
        }
    }

    /// Execute this node with literal argv tokens and environment
    pub async fn execute<I, S>(&self, ctx: &C, argv: I, env: Option<&Env>) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = argv.into_iter().map(Into::into).collect();
        self.execute_argv(ctx, argv, env).await
    }
}

impl<C> Lifecycle<C> for Node<C>
where
    C: Send + Sync + 'static,
{
    fn meta(&self) -> &NodeMeta {
        match self {
            Node::Command(command) => command.meta(),
            Node::Group(group) => group.meta(),
        }
    }

    fn plugins(&self) -> &PluginChain<C> {
        match self {
            Node::Command(command) => command.plugins(),
            Node::Group(group) => group.plugins(),
        }
    }

    fn perform_action<'a>(
        &'a self,
        ctx: &'a C,
        args: &'a ParsedArgs,
        env: Option<&'a Env>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        match self {
            Node::Command(command) => command.perform_action(ctx, args, env),
            Node::Group(group) => group.perform_action(ctx, args, env),
        }
    }
}

impl<C> std::fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Node::Group(group) => f.debug_tuple("Group").field(group).finish(),
        }
    }
}

/// Construct the root group of an application
pub fn app<C>(spec: GroupSpec<C>) -> ConfigResult<Group<C>>
where
    C: Send + Sync + 'static,
{
    Group::new(spec)
}
