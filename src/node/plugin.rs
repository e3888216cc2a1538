//! Plugin middleware
//!
//! A plugin wraps the action of every node it is attached to. Plugins run in
//! attachment order; each one decides whether to continue by running the
//! [`Next`] continuation it is given. A plugin that returns without running
//! it halts the chain and the node's action never runs.

use crate::error::Result;
use crate::node::NodeMeta;
use crate::option::{OptionSpec, Options};
use crate::resolver::{ensure_required, to_camel_case, ParsedArgs};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Plugin middleware function
///
/// Receives the context, the slice of arguments matching the plugin's own
/// options, the continuation, and the node being executed.
pub type Middleware<C> = Arc<
    dyn for<'a> Fn(&'a C, ParsedArgs, Next<'a, C>, &'a NodeMeta) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync,
>;

/// How an execution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action of the leaf command ran
    Completed,

    /// A plugin on `node` did not continue
    Halted { node: String },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// Cross-cutting middleware attached to a node
pub struct Plugin<C> {
    recursive: bool,
    options: Options,
    middleware: Middleware<C>,
}

impl<C> Plugin<C> {
    /// Create a plugin from its middleware
    pub fn new<F>(middleware: F) -> Self
    where
        F: for<'a> Fn(&'a C, ParsedArgs, Next<'a, C>, &'a NodeMeta) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Plugin {
            recursive: false,
            options: Options::new(),
            middleware: Arc::new(middleware),
        }
    }

    /// Copy this plugin onto every descendant when attached to a group
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Declare an option this plugin reads
    pub fn option(mut self, key: impl Into<String>, option: OptionSpec) -> Self {
        self.options = self.options.with(key, option);
        self
    }

    /// Declare several options at once
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = self.options.merge(&options);
        self
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl<C> fmt::Debug for Plugin<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("recursive", &self.recursive)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

type Terminal<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a>;

/// Continuation handed to a middleware
///
/// Running it invokes the plugin after this one, or the node's action once
/// every plugin has continued. Dropping it halts the chain.
pub struct Next<'a, C> {
    plugins: &'a [Arc<Plugin<C>>],
    cursor: usize,
    ctx: &'a C,
    args: &'a ParsedArgs,
    node: &'a NodeMeta,
    terminal: Terminal<'a>,
}

impl<'a, C> Next<'a, C>
where
    C: Send + Sync + 'static,
{
    /// Continue with the rest of the chain
    pub fn run(self) -> BoxFuture<'a, Result<()>> {
        let Next {
            plugins,
            cursor,
            ctx,
            args,
            node,
            terminal,
        } = self;

        let Some(plugin) = plugins.get(cursor) else {
            return terminal();
        };

        async move {
            let slice = args.pick(plugin.options.keys().map(to_camel_case));
            ensure_required(&slice, &plugin.options)?;

            let next = Next {
                plugins,
                cursor: cursor + 1,
                ctx,
                args,
                node,
                terminal,
            };

            (plugin.middleware)(ctx, slice, next, node).await
        }
        .boxed()
    }
}

/// Ordered plugins of one node
pub struct PluginChain<C>(Vec<Arc<Plugin<C>>>);

impl<C> PluginChain<C> {
    pub fn new(plugins: Vec<Arc<Plugin<C>>>) -> Self {
        PluginChain(plugins)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Plugin<C>>> {
        self.0.iter()
    }

    /// Plugins to hand down to children
    pub fn recursive(&self) -> Vec<Arc<Plugin<C>>> {
        self.0.iter().filter(|p| p.recursive).cloned().collect()
    }

    /// Options declared by all plugins, later plugins winning on collision
    pub fn options(&self) -> Options {
        self.0
            .iter()
            .fold(Options::new(), |acc, plugin| acc.merge(&plugin.options))
    }
}

impl<C> PluginChain<C>
where
    C: Send + Sync + 'static,
{
    /// Run every plugin in order around `terminal`
    ///
    /// Returns the terminal's outcome, or [`Outcome::Halted`] naming `node`
    /// when a plugin did not continue.
    pub async fn run<'a, F>(
        &'a self,
        ctx: &'a C,
        args: &'a ParsedArgs,
        node: &'a NodeMeta,
        terminal: F,
    ) -> Result<Outcome>
    where
        F: FnOnce() -> BoxFuture<'a, Result<Outcome>> + Send + 'a,
    {
        let slot: Arc<OnceLock<Outcome>> = Arc::new(OnceLock::new());
        let writer = Arc::clone(&slot);

        let terminal: Terminal<'a> = Box::new(move || -> BoxFuture<'a, Result<()>> {
            async move {
                let outcome = terminal().await?;
                let _ = writer.set(outcome);
                Ok(())
            }
            .boxed()
        });

        Next {
            plugins: &self.0,
            cursor: 0,
            ctx,
            args,
            node,
            terminal,
        }
        .run()
        .await?;

        match slot.get() {
            Some(outcome) => Ok(outcome.clone()),
            None => {
                debug!(node = node.name(), "plugin chain halted");
                Ok(Outcome::Halted {
                    node: node.name().to_string(),
                })
            }
        }
    }
}

impl<C> Clone for PluginChain<C> {
    fn clone(&self) -> Self {
        PluginChain(self.0.clone())
    }
}

impl<C> Default for PluginChain<C> {
    fn default() -> Self {
        PluginChain(Vec::new())
    }
}

impl<C> fmt::Debug for PluginChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CliError, ValidationError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Trace {
        events: Mutex<Vec<String>>,
    }

    impl Trace {
        fn push(&self, event: impl Into<String>) {
            self.events.lock().unwrap().push(event.into());
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    fn wrapping(label: &'static str) -> Arc<Plugin<Trace>> {
        Arc::new(Plugin::new(move |ctx: &Trace, _args, next, _node| {
            async move {
                ctx.push(format!("{label}:before"));
                next.run().await?;
                ctx.push(format!("{label}:after"));
                Ok(())
            }
            .boxed()
        }))
    }

    fn meta() -> NodeMeta {
        NodeMeta::new("node")
    }

    fn terminal<'a>(ctx: &'a Trace) -> impl FnOnce() -> BoxFuture<'a, Result<Outcome>> + Send + 'a {
        move || {
            async move {
                ctx.push("action");
                Ok(Outcome::Completed)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_runs_in_attachment_order() {
        let chain = PluginChain::new(vec![wrapping("a"), wrapping("b")]);
        let ctx = Trace::default();
        let args = ParsedArgs::default();
        let meta = meta();

        let outcome = chain.run(&ctx, &args, &meta, terminal(&ctx)).await.unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(
            ctx.events(),
            vec!["a:before", "b:before", "action", "b:after", "a:after"]
        );
    }

    #[tokio::test]
    async fn test_halt_skips_rest() {
        let guard = Arc::new(Plugin::new(|ctx: &Trace, _args, _next, _node| {
            async move {
                ctx.push("guard");
                Ok(())
            }
            .boxed()
        }));
        let chain = PluginChain::new(vec![guard, wrapping("b")]);
        let ctx = Trace::default();
        let args = ParsedArgs::default();
        let meta = meta();

        let outcome = chain.run(&ctx, &args, &meta, terminal(&ctx)).await.unwrap();

        assert_eq!(outcome, Outcome::Halted { node: "node".into() });
        assert_eq!(ctx.events(), vec!["guard"]);
    }

    #[tokio::test]
    async fn test_plugin_sees_only_its_options() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let plugin = Plugin::new(move |_ctx: &Trace, args, next, _node| {
            *sink.lock().unwrap() = Some(args);
            next.run()
        })
        .option("api-token", OptionSpec::string());

        let chain = PluginChain::new(vec![Arc::new(plugin)]);
        let ctx = Trace::default();
        let args = ParsedArgs::new(vec!["x".into()], vec![], Default::default())
            .with_value("apiToken", "secret")
            .with_value("env", "prod");
        let meta = meta();

        chain.run(&ctx, &args, &meta, terminal(&ctx)).await.unwrap();

        let seen = seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.get_str("apiToken"), Some("secret"));
        assert!(!seen.contains("env"));
        assert!(seen.positional.is_empty());
    }

    #[tokio::test]
    async fn test_required_plugin_option() {
        let plugin = Plugin::new(|_ctx: &Trace, _args, next, _node| next.run())
            .option("api-token", OptionSpec::string().required());
        let chain = PluginChain::new(vec![Arc::new(plugin)]);
        let ctx = Trace::default();
        let args = ParsedArgs::default();
        let meta = meta();

        let err = chain.run(&ctx, &args, &meta, terminal(&ctx)).await.unwrap_err();

        assert!(matches!(
            err,
            CliError::Validation(ValidationError::RequiredOptionMissing(ref key)) if key == "api-token"
        ));
        assert!(ctx.events().is_empty());
    }

    #[tokio::test]
    async fn test_middleware_error_propagates() {
        let failing = Arc::new(Plugin::new(|_ctx: &Trace, _args, _next, _node| {
            async move { Err(anyhow::anyhow!("denied").into()) }.boxed()
        }));
        let chain = PluginChain::new(vec![failing, wrapping("b")]);
        let ctx = Trace::default();
        let args = ParsedArgs::default();
        let meta = meta();

        let err = chain.run(&ctx, &args, &meta, terminal(&ctx)).await.unwrap_err();

        assert_eq!(err.to_string(), "denied");
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_chain_options_last_write_wins() {
        let first = Plugin::<Trace>::new(|_ctx, _args, next, _node| next.run())
            .option("token", OptionSpec::string());
        let second = Plugin::<Trace>::new(|_ctx, _args, next, _node| next.run())
            .option("token", OptionSpec::number())
            .recursive();
        let chain = PluginChain::new(vec![Arc::new(first), Arc::new(second)]);

        let options = chain.options();
        assert_eq!(
            options.get("token").unwrap().option_type(),
            crate::option::OptionType::Number
        );
        assert_eq!(chain.recursive().len(), 1);
    }
}
