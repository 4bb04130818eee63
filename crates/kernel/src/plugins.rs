// crates/kernel/src/plugins.rs
//! Two-phase plugin protocol and the session's built-in plugins.
//!
//! `register` runs first for every plugin and is the validation stage:
//! filter patterns compile here, so a bad definition fails before any node
//! is visited. `init` runs after all plugins are registered and is where a
//! plugin decorates the chain.

use chain::{Mediator, Role};
use filters::{ChildFilter, Filter, FilterOptions, SampleFilter};

use crate::context::SessionContext;
use crate::error::TraverseError;
use crate::links::{
    AnchorLink, ClientFilterLink, FastwardLink, HibernateLink, NannyLink, SamplerLink,
};
use crate::options::SessionOptions;

/// Shared surfaces handed to every plugin's `init`.
pub struct PluginInit<'a> {
    /// The session's full configuration.
    pub options: &'a SessionOptions,
    /// The decision chain; plugins join it here.
    pub mediator: &'a mut Mediator<SessionContext>,
    /// Ledger, notification hub, and active state.
    pub context: &'a mut SessionContext,
}

/// A feature collaborator of the traversal kernel.
///
/// Implement this to add a custom link to the chain; the session's own
/// features (filtering, sampling, hibernation, resume) go through the same
/// protocol.
pub trait Plugin {
    /// The chain role this plugin claims.
    fn role(&self) -> Role;

    /// Validation stage, run before any `init`.
    fn register(&mut self, options: &SessionOptions) -> Result<(), TraverseError>;

    /// Decoration stage; call [`Mediator::decorate`] here.
    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError>;
}

/// Assembles the built-in plugin set for `options`.
///
/// Only configured features produce plugins; the anchor is always present.
pub(crate) fn built_ins(options: &SessionOptions) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();
    if options.hibernation.is_configured() {
        plugins.push(Box::new(HibernatePlugin::default()));
    }
    if options.sampling.is_active() {
        plugins.push(Box::new(SamplerPlugin::default()));
    }
    if options.node_filter.is_some() {
        plugins.push(Box::new(ClientFilterPlugin::default()));
    }
    if options.child_filter.is_some() {
        plugins.push(Box::new(NannyPlugin::default()));
    }
    plugins.push(Box::new(AnchorPlugin));
    plugins
}

#[derive(Default)]
struct HibernatePlugin {
    wake: Option<Box<dyn Filter>>,
    sleep: Option<Box<dyn Filter>>,
}

impl Plugin for HibernatePlugin {
    fn role(&self) -> Role {
        Role::Hibernate
    }

    fn register(&mut self, options: &SessionOptions) -> Result<(), TraverseError> {
        if let Some(def) = &options.hibernation.wake {
            self.wake = Some(filters::compile(def)?);
        }
        if let Some(def) = &options.hibernation.sleep {
            self.sleep = Some(filters::compile(def)?);
        }
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        init.mediator.decorate(Box::new(HibernateLink {
            wake: self.wake.take(),
            sleep: self.sleep.take(),
            inclusive_wake: init.options.hibernation.inclusive_wake,
            inclusive_sleep: init.options.hibernation.inclusive_sleep,
        }))?;
        Ok(())
    }
}

#[derive(Default)]
struct SamplerPlugin;

impl Plugin for SamplerPlugin {
    fn role(&self) -> Role {
        Role::Sampler
    }

    fn register(&mut self, _options: &SessionOptions) -> Result<(), TraverseError> {
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        let filter = SampleFilter::new(
            init.options.sampling,
            FilterOptions::new("sample-window"),
        );
        init.mediator.decorate(Box::new(SamplerLink { filter }))?;
        Ok(())
    }
}

#[derive(Default)]
struct ClientFilterPlugin {
    filter: Option<Box<dyn Filter>>,
    child: Option<ChildFilter>,
}

impl Plugin for ClientFilterPlugin {
    fn role(&self) -> Role {
        Role::ClientFilter
    }

    fn register(&mut self, options: &SessionOptions) -> Result<(), TraverseError> {
        if let Some(def) = &options.node_filter {
            self.filter = Some(filters::compile(def)?);
        }
        // The child pass rides along as the hybrid part of this link, so a
        // deferred nanny loses nothing.
        if let Some(def) = &options.child_filter {
            self.child = Some(filters::compile_child(def)?);
        }
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        init.mediator.decorate(Box::new(ClientFilterLink {
            filter: self.filter.take(),
            child: self.child.take(),
        }))?;
        Ok(())
    }
}

#[derive(Default)]
struct NannyPlugin {
    child: Option<ChildFilter>,
}

impl Plugin for NannyPlugin {
    fn role(&self) -> Role {
        Role::Nanny
    }

    fn register(&mut self, options: &SessionOptions) -> Result<(), TraverseError> {
        if let Some(def) = &options.child_filter {
            self.child = Some(filters::compile_child(def)?);
        }
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        let Some(child) = self.child.take() else {
            return Ok(());
        };
        init.mediator.decorate(Box::new(NannyLink { child }))?;
        Ok(())
    }
}

struct AnchorPlugin;

impl Plugin for AnchorPlugin {
    fn role(&self) -> Role {
        Role::Anchor
    }

    fn register(&mut self, _options: &SessionOptions) -> Result<(), TraverseError> {
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        init.mediator.decorate(Box::new(AnchorLink {
            subscription: init.options.subscription,
        }))?;
        Ok(())
    }
}

/// Resume collaborator: installs the sealed fast-forward link and mutes
/// every notification gate until the recorded position is reached.
pub(crate) struct FastwardPlugin {
    pub(crate) name: String,
    pub(crate) parent: String,
}

impl Plugin for FastwardPlugin {
    fn role(&self) -> Role {
        Role::Fastward
    }

    fn register(&mut self, _options: &SessionOptions) -> Result<(), TraverseError> {
        Ok(())
    }

    fn init(&mut self, init: &mut PluginInit<'_>) -> Result<(), TraverseError> {
        init.context.hub.mute_all();
        init.mediator.decorate_sealed(
            Box::new(FastwardLink {
                name: self.name.clone(),
                parent: self.parent.clone(),
                inclusive: init.options.hibernation.inclusive_wake,
            }),
            vec![Role::Fastward],
        )?;
        Ok(())
    }
}
