//! Leaf commands

use crate::error::{ConfigResult, Result};
use crate::node::{CommandSpec, Handler, Lifecycle, NodeMeta, Outcome, Plugin, PluginChain};
use crate::option::Options;
use crate::resolver::{ensure_required, Env, ParsedArgs};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;

/// A terminal node running a user handler
pub struct Command<C> {
    meta: NodeMeta,
    plugins: PluginChain<C>,
    own_options: Options,
    handler: Handler<C>,
}

impl<C> Command<C>
where
    C: Send + Sync + 'static,
{
    /// Construct a standalone command
    pub fn new(spec: CommandSpec<C>) -> ConfigResult<Self> {
        Self::build(spec, Vec::new())
    }

    pub(crate) fn build(spec: CommandSpec<C>, inherited: Vec<Arc<Plugin<C>>>) -> ConfigResult<Self> {
        let CommandSpec { mut header, handler } = spec;

        header.plugins.extend(inherited);
        let plugins = PluginChain::new(std::mem::take(&mut header.plugins));
        let own_options = header.options.clone();
        let meta = NodeMeta::build(header, &plugins)?;

        Ok(Command {
            meta,
            plugins,
            own_options,
            handler,
        })
    }

    /// Options declared on the command itself, without plugin options
    pub fn own_options(&self) -> &Options {
        &self.own_options
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

impl<C> Lifecycle<C> for Command<C>
where
    C: Send + Sync + 'static,
{
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn plugins(&self) -> &PluginChain<C> {
        &self.plugins
    }

    /// Check the command's own required options, then run the handler
    fn perform_action<'a>(
        &'a self,
        ctx: &'a C,
        args: &'a ParsedArgs,
        _env: Option<&'a Env>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        async move {
            ensure_required(args, &self.own_options)?;
            (self.handler)(ctx, args.clone()).await?;
            Ok(Outcome::Completed)
        }
        .boxed()
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("meta", &self.meta)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}
