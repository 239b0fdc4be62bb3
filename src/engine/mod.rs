//! The binding engine: reflect a bound target into a grid of labelled controls.
//!
//! A render pass walks the target's annotated members (most-derived type first), builds one control
//! per leaf field and one trigger per action, expands composite fields into sub-forms, and threads a
//! single [`InsertionPosition`] through the active layout strategy.
//!
//! ## Notes
//!
//! - Rendering is not reentrant. Regenerating a form from inside one of its own callbacks fails with
//!   [`BindError::TargetBusy`] when the target is borrowed, and is otherwise the caller's problem.
//! - Configuration changes take effect on the next render pass; nothing is re-laid-out in place.
//! - A failed render leaves the container empty.

mod classify;
mod subform;
pub mod target;
mod walker;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use reflectgrid_core::{MemberDescriptor, MemberKind, NamingStrategy, Reflect, SharedTarget};

pub use classify::{Classification, apply_editable, classify};
use classify::ControlFactory;
use target::{ObjectIdentity, TargetHandle};
pub use walker::collect_members;

use crate::config::GridConfig;
use crate::errors::BindError;
use crate::layout::{InsertionPosition, LayoutStrategy};
use crate::propagation::{ChangeSubscriber, FormServices};
use crate::toolkit::{ControlKind, GridContainer, Node, Toolkit};

/// One live control produced by the last render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlBinding {
    pub member: MemberDescriptor,
    pub kind: ControlKind,
}

/// Reflects one bound target into a grid container.
pub struct ReflectorGrid {
    config: GridConfig,
    services: Arc<FormServices>,
    toolkit: Rc<dyn Toolkit>,
    container: Box<dyn GridContainer>,
    target: Option<TargetHandle>,
    bindings: Vec<ControlBinding>,
}

impl ReflectorGrid {
    /// Create an engine using the process-wide services and the default configuration.
    pub fn new(toolkit: Rc<dyn Toolkit>) -> Self {
        let container = toolkit.container();
        Self {
            config: GridConfig::default(),
            services: FormServices::global(),
            toolkit,
            container,
            target: None,
            bindings: Vec::new(),
        }
    }

    /// Use a specific services instance instead of the process-wide one.
    pub fn with_services(mut self, services: Arc<FormServices>) -> Self {
        self.services = services;
        self
    }

    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind `target` and render it.
    pub fn bind<T: Reflect>(&mut self, target: &Rc<RefCell<T>>) -> Result<(), BindError> {
        let shared: SharedTarget = target.clone();
        self.bind_dyn(Some(shared))
    }

    /// Bind a type-erased target and render it. `None` is rejected before anything is touched.
    pub fn bind_dyn(&mut self, target: Option<SharedTarget>) -> Result<(), BindError> {
        let target = target.ok_or(BindError::NullTarget)?;
        self.target = Some(TargetHandle::new(target));
        self.regenerate()
    }

    /// Discard every control and render the bound target again with the current configuration.
    pub fn regenerate(&mut self) -> Result<(), BindError> {
        let result = self.render(&mut Vec::new());
        if result.is_err() {
            self.container.clear();
            self.bindings.clear();
        }
        result
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn set_layout_strategy(&mut self, layout: LayoutStrategy) {
        self.config.layout = layout;
    }

    pub fn set_width_limit(&mut self, width: f64) {
        self.config.width_limit = width;
    }

    pub fn set_field_naming_strategy(&mut self, naming: NamingStrategy) {
        self.config.field_naming = naming;
    }

    pub fn set_method_naming_strategy(&mut self, naming: NamingStrategy) {
        self.config.method_naming = naming;
    }

    /// Register a process-wide subscriber on this engine's services. There is no unsubscribe.
    pub fn subscribe(&self, subscriber: impl ChangeSubscriber + 'static) {
        self.services.subscribe(subscriber);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn services(&self) -> &Arc<FormServices> {
        &self.services
    }

    pub fn container(&self) -> &dyn GridContainer {
        self.container.as_ref()
    }

    pub fn container_mut(&mut self) -> &mut dyn GridContainer {
        self.container.as_mut()
    }

    /// Controls produced by the last render pass, in placement order.
    pub fn bindings(&self) -> &[ControlBinding] {
        &self.bindings
    }

    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    #[tracing::instrument(level = "debug", skip_all, fields(target = tracing::field::Empty, nesting = stack.len()))]
    fn render(&mut self, stack: &mut Vec<ObjectIdentity>) -> Result<(), BindError> {
        let target = self.target.clone().ok_or(BindError::NullTarget)?;
        self.container.clear();
        self.bindings.clear();
        self.container
            .set_spacing(self.config.hgap, self.config.vgap, self.config.padding);

        let (type_name, identity, members) = target
            .with_target(|object| (object.type_name(), ObjectIdentity::of(object), collect_members(object)))?;
        tracing::Span::current().record("target", type_name);
        tracing::debug!(members = members.len(), layout = self.config.layout.name(), "render pass started");

        stack.push(identity);
        let result = self.render_members(&target, &members, stack);
        stack.pop();

        tracing::debug!(controls = self.bindings.len(), ok = result.is_ok(), "render pass finished");
        result
    }

    fn render_members(
        &mut self,
        target: &TargetHandle,
        members: &[MemberDescriptor],
        stack: &mut Vec<ObjectIdentity>,
    ) -> Result<(), BindError> {
        let layout = self.config.layout.layout();
        let mut position = InsertionPosition::default();
        for member in members {
            tracing::trace!(member = member.name, depth = member.depth, row = position.row(), "placing member");
            let (label, widget) = match &member.kind {
                MemberKind::Field { .. } if classify(member)? == Classification::Composite => {
                    tracing::debug!(field = member.name, "descending into sub-form");
                    position = self.place_subform(position, target, member, stack)?;
                    continue;
                }
                MemberKind::Field { .. } => self.factory().field_pair(target, member)?,
                MemberKind::Action(annotation) => self.factory().action_pair(target, member, annotation)?,
            };
            self.bindings.push(ControlBinding {
                member: *member,
                kind: widget.kind(),
            });
            position = layout.place_pair(position, label, Node::Control(widget), self.container.as_mut());
        }
        Ok(())
    }

    fn factory(&self) -> ControlFactory<'_> {
        ControlFactory {
            toolkit: self.toolkit.as_ref(),
            services: &self.services,
            config: &self.config,
        }
    }

    /// An engine for a composite field: same configuration, toolkit and services, fresh container.
    fn nested_engine(&self, target: TargetHandle) -> ReflectorGrid {
        ReflectorGrid {
            config: self.config.clone(),
            services: Arc::clone(&self.services),
            toolkit: Rc::clone(&self.toolkit),
            container: self.toolkit.container(),
            target: Some(target),
            bindings: Vec::new(),
        }
    }
}
