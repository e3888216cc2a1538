//! Tree specs
//!
//! Builders describing a command tree before it is constructed. A spec is
//! consumed once by [`Group::new`](crate::node::Group::new) or
//! [`app`](crate::node::app); the resulting tree is immutable.

use crate::error::Result;
use crate::node::Plugin;
use crate::option::{OptionSpec, Options};
use crate::resolver::ParsedArgs;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Handler run by a command with the context and its resolved arguments
pub type Handler<C> =
    Arc<dyn for<'a> Fn(&'a C, ParsedArgs) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Fields every node spec carries
pub struct SpecHeader<C> {
    pub(crate) name: String,
    pub(crate) default: bool,
    pub(crate) usage: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) options: Options,
    pub(crate) plugins: Vec<Arc<Plugin<C>>>,
}

impl<C> SpecHeader<C> {
    fn new(name: impl Into<String>) -> Self {
        SpecHeader {
            name: name.into(),
            default: false,
            usage: None,
            description: None,
            options: Options::new(),
            plugins: Vec::new(),
        }
    }
}

/// Spec of a leaf command
pub struct CommandSpec<C> {
    pub(crate) header: SpecHeader<C>,
    pub(crate) handler: Handler<C>,
}

impl<C> CommandSpec<C> {
    /// Create a command spec with its handler
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a C, ParsedArgs) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        CommandSpec {
            header: SpecHeader::new(name),
            handler: Arc::new(handler),
        }
    }

    /// Run this command when the parent group gets no subcommand
    pub fn as_default(mut self) -> Self {
        self.header.default = true;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.header.usage = Some(usage.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header.description = Some(description.into());
        self
    }

    /// Declare an option
    pub fn option(mut self, key: impl Into<String>, option: OptionSpec) -> Self {
        self.header.options = self.header.options.with(key, option);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.header.options = self.header.options.merge(&options);
        self
    }

    /// Attach a plugin
    pub fn plugin(self, plugin: Plugin<C>) -> Self {
        self.shared_plugin(Arc::new(plugin))
    }

    /// Attach a plugin that may also be attached elsewhere
    pub fn shared_plugin(mut self, plugin: Arc<Plugin<C>>) -> Self {
        self.header.plugins.push(plugin);
        self
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }
}

/// Spec of a group of commands
pub struct GroupSpec<C> {
    pub(crate) header: SpecHeader<C>,
    pub(crate) children: Vec<NodeSpec<C>>,
}

impl<C> GroupSpec<C> {
    pub fn new(name: impl Into<String>) -> Self {
        GroupSpec {
            header: SpecHeader::new(name),
            children: Vec::new(),
        }
    }

    /// Add a child command or group
    pub fn child(mut self, child: impl Into<NodeSpec<C>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Run this group when the parent group gets no subcommand
    pub fn as_default(mut self) -> Self {
        self.header.default = true;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.header.usage = Some(usage.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header.description = Some(description.into());
        self
    }

    /// Declare an option
    pub fn option(mut self, key: impl Into<String>, option: OptionSpec) -> Self {
        self.header.options = self.header.options.with(key, option);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.header.options = self.header.options.merge(&options);
        self
    }

    /// Attach a plugin
    pub fn plugin(self, plugin: Plugin<C>) -> Self {
        self.shared_plugin(Arc::new(plugin))
    }

    /// Attach a plugin that may also be attached elsewhere
    pub fn shared_plugin(mut self, plugin: Arc<Plugin<C>>) -> Self {
        self.header.plugins.push(plugin);
        self
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }
}

/// Spec of either kind of node
pub enum NodeSpec<C> {
    Command(CommandSpec<C>),
    Group(GroupSpec<C>),
}

impl<C> NodeSpec<C> {
    pub fn name(&self) -> &str {
        match self {
            NodeSpec::Command(spec) => spec.name(),
            NodeSpec::Group(spec) => spec.name(),
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            NodeSpec::Command(spec) => spec.header.default,
            NodeSpec::Group(spec) => spec.header.default,
        }
    }
}

impl<C> From<CommandSpec<C>> for NodeSpec<C> {
    fn from(spec: CommandSpec<C>) -> Self {
        NodeSpec::Command(spec)
    }
}

impl<C> From<GroupSpec<C>> for NodeSpec<C> {
    fn from(spec: GroupSpec<C>) -> Self {
        NodeSpec::Group(spec)
    }
}
