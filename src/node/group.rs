//! Command groups
//!
//! A group owns its children and routes each command line to exactly one of
//! them: the child named by the first positional token, or the child marked
//! default when there is none.

use crate::error::{ConfigResult, DispatchError, Result};
use crate::node::{schema, GroupSpec, Lifecycle, Node, NodeMeta, Outcome, Plugin, PluginChain};
use crate::resolver::{Env, ParsedArgs};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Usage text of groups that declare none
pub const DEFAULT_GROUP_USAGE: &str = "[...options] <command>";

/// A composite node routing to one of its children
pub struct Group<C> {
    meta: NodeMeta,
    plugins: PluginChain<C>,
    children: Vec<Node<C>>,
}

impl<C> Group<C>
where
    C: Send + Sync + 'static,
{
    /// Construct a group and its whole subtree
    pub fn new(spec: GroupSpec<C>) -> ConfigResult<Self> {
        Self::build(spec, Vec::new())
    }

    pub(crate) fn build(spec: GroupSpec<C>, inherited: Vec<Arc<Plugin<C>>>) -> ConfigResult<Self> {
        let GroupSpec {
            mut header,
            children,
        } = spec;

        header.plugins.extend(inherited);
        if header.usage.is_none() {
            header.usage = Some(DEFAULT_GROUP_USAGE.to_string());
        }

        let plugins = PluginChain::new(std::mem::take(&mut header.plugins));
        let meta = NodeMeta::build(header, &plugins)?;
        schema::validate_children(meta.name(), &children)?;

        // Recursive plugins, inherited ones included, follow every child's own
        let recursive = plugins.recursive();
        let children = children
            .into_iter()
            .map(|child| Node::build(child, recursive.clone()))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Group {
            meta,
            plugins,
            children,
        })
    }

    pub fn children(&self) -> &[Node<C>] {
        &self.children
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&Node<C>> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// Pick the child for `positional` and the tokens left for it
    fn select<'a>(
        &'a self,
        positional: &'a [String],
    ) -> std::result::Result<(&'a Node<C>, &'a [String]), DispatchError> {
        match positional.split_first() {
            Some((name, rest)) => self
                .child(name)
                .map(|child| (child, rest))
                .ok_or_else(|| DispatchError::UnknownCommand(name.clone())),
            None => self
                .children
                .iter()
                .find(|child| child.is_default())
                .map(|child| (child, positional))
                .ok_or(DispatchError::CommandRequired),
        }
    }

    /// Execute with literal argv tokens and environment
    pub async fn execute<I, S>(&self, ctx: &C, argv: I, env: Option<&Env>) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = argv.into_iter().map(Into::into).collect();
        self.execute_argv(ctx, argv, env).await
    }
}

/// Argv handed to a child: the remaining positional tokens, then the
/// passthrough tokens behind a fresh `--`
fn child_argv(rest: &[String], passthrough: &[String]) -> Vec<String> {
    let mut argv = rest.to_vec();
    if !passthrough.is_empty() {
        argv.push("--".to_string());
        argv.extend(passthrough.iter().cloned());
    }
    argv
}

impl<C> Lifecycle<C> for Group<C>
where
    C: Send + Sync + 'static,
{
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn plugins(&self) -> &PluginChain<C> {
        &self.plugins
    }

    fn perform_action<'a>(
        &'a self,
        ctx: &'a C,
        args: &'a ParsedArgs,
        env: Option<&'a Env>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        async move {
            let (child, rest) = self.select(&args.positional)?;
            let argv = child_argv(rest, &args.passthrough);
            debug!(group = self.meta.name(), child = child.name(), ?argv, "dispatching");

            child.execute_argv(ctx, argv, env).await
        }
        .boxed()
    }
}

impl<C> fmt::Debug for Group<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("meta", &self.meta)
            .field("plugins", &self.plugins)
            .field("children", &self.children)
            .finish()
    }
}
