//! Change propagation: the write path from a control to its field, and the listeners it notifies.
//!
//! Every data-bound control funnels its changes through [`write_back`], which runs these steps in
//! order, synchronously:
//! 1. convert the control's raw value to the field's type through the converter registry
//! 2. write the field, on the ancestor that declares it
//! 3. call the bound target's own [`FieldObserver`](reflectgrid_core::FieldObserver), if it has one
//! 4. call every process-wide [`ChangeSubscriber`], in subscription order
//!
//! Step 3 finishes before step 4 starts. Nothing here re-renders the form.
//!
//! ## Notes
//!
//! - Conversion and reflective write failures are logged and end the write path; no listener fires.
//! - A missing converter is fatal and returned to whoever dispatched the event.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use reflectgrid_core::{MemberDescriptor, Reflect, ReflectError, Value, ancestor, ancestor_mut};

use crate::convert::TypeConverterRegistry;
use crate::engine::target::TargetHandle;
use crate::errors::{BindError, ConfigError};

// ============================================================================
// Subscribers
// ============================================================================

/// One completed field write, as seen by a subscriber.
pub struct FieldChange<'a> {
    pub field: &'a MemberDescriptor,
    pub old_value: &'a Value,
    pub new_value: &'a Value,
    /// The bound target that owns the field (or inherits it from an ancestor).
    pub object: &'a dyn Reflect,
}

/// A process-wide observer of field writes.
pub trait ChangeSubscriber: Send + Sync {
    fn on_value_changed(&self, change: &FieldChange<'_>);
}

impl<F> ChangeSubscriber for F
where
    F: Fn(&FieldChange<'_>) + Send + Sync,
{
    fn on_value_changed(&self, change: &FieldChange<'_>) {
        self(change)
    }
}

/// Ordered, append-only subscriber list.
#[derive(Default)]
pub struct SubscriberList {
    subscribers: RwLock<Vec<Arc<dyn ChangeSubscriber>>>,
}

impl SubscriberList {
    pub fn subscribe(&self, subscriber: Arc<dyn ChangeSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every subscriber in registration order.
    ///
    /// The list is snapshotted first, so a subscriber may subscribe others without deadlocking;
    /// those only hear about later changes.
    pub fn notify(&self, change: &FieldChange<'_>) {
        let snapshot: Vec<Arc<dyn ChangeSubscriber>> = self.subscribers.read().clone();
        for subscriber in snapshot {
            subscriber.on_value_changed(change);
        }
    }
}

impl fmt::Debug for SubscriberList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberList").field("len", &self.len()).finish()
    }
}

// ============================================================================
// Services
// ============================================================================

/// Process-wide state shared by every engine: the converter registry and the subscriber list.
///
/// [`FormServices::global`] is created on first use and lives until the process exits. Engines take
/// an `Arc<FormServices>` at construction, so tests can hand them an isolated instance.
#[derive(Debug, Default)]
pub struct FormServices {
    converters: TypeConverterRegistry,
    subscribers: SubscriberList,
}

impl FormServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services built around a specific registry.
    pub fn with_converters(converters: TypeConverterRegistry) -> Self {
        Self {
            converters,
            subscribers: SubscriberList::default(),
        }
    }

    /// The process-wide instance.
    pub fn global() -> Arc<FormServices> {
        static GLOBAL: OnceLock<Arc<FormServices>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(FormServices::new())))
    }

    pub fn converters(&self) -> &TypeConverterRegistry {
        &self.converters
    }

    pub fn subscribers(&self) -> &SubscriberList {
        &self.subscribers
    }

    /// Register a subscriber. There is no unsubscribe.
    pub fn subscribe(&self, subscriber: impl ChangeSubscriber + 'static) {
        self.subscribers.subscribe(Arc::new(subscriber));
    }
}

// ============================================================================
// Write path
// ============================================================================

/// Convert `raw` and write it into `member` of the target behind `target`, then notify listeners.
///
/// ## Parameters
/// - `target`: the bound target of the engine that rendered the control
/// - `member`: a field descriptor, stamped with the ancestry depth that declares it
///
/// ## Returns
/// - `Ok(())` on success and on every logged, swallowed failure.
#[tracing::instrument(level = "trace", skip_all, fields(field = member.name, depth = member.depth))]
pub fn write_back(
    services: &FormServices,
    target: &TargetHandle,
    member: &MemberDescriptor,
    raw: Value,
) -> Result<(), BindError> {
    let Some(key) = member.field_type().and_then(|field_type| field_type.type_key()) else {
        tracing::warn!(field = member.name, "member has no convertible type; write skipped");
        return Ok(());
    };

    let new_value = match services.converters().from_value(key, raw) {
        Ok(value) => value,
        Err(err) => {
            ConfigError::check_convert(&err)?;
            tracing::warn!(field = member.name, error = %err, "rejected control value");
            return Ok(());
        }
    };

    let written = target.with_target_mut(|object| -> Result<Value, ReflectError> {
        let owner = ancestor_mut(object, member.depth)?;
        let old_value = owner.field(member.name)?;
        owner.set_field(member.name, new_value.clone())?;
        if let Some(observer) = object.as_field_observer() {
            observer.on_field_value_changed(member);
        }
        Ok(old_value)
    })?;

    let old_value = match written {
        Ok(old_value) => old_value,
        Err(err) => {
            tracing::warn!(field = member.name, error = %err, "reflective write failed");
            return Ok(());
        }
    };

    tracing::trace!(field = member.name, old = %old_value, new = %new_value, "field written");

    target.with_target(|object| {
        services.subscribers().notify(&FieldChange {
            field: member,
            old_value: &old_value,
            new_value: &new_value,
            object,
        });
    })
}

/// Read a member's current value through the declaring ancestor.
pub fn read_member(target: &dyn Reflect, member: &MemberDescriptor) -> Result<Value, ReflectError> {
    ancestor(target, member.depth)?.field(member.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_fire_in_registration_order() {
        let services = FormServices::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&seen);
            services.subscribe(move |_: &FieldChange<'_>| sink.lock().push(tag));
        }
        assert_eq!(services.subscribers().len(), 3);

        struct Nothing;
        impl Reflect for Nothing {
            fn type_name(&self) -> &'static str {
                "Nothing"
            }
            fn declared_members(&self) -> Vec<MemberDescriptor> {
                Vec::new()
            }
            fn field(&self, name: &str) -> Result<Value, ReflectError> {
                Err(ReflectError::no_such_field("Nothing", name))
            }
            fn set_field(&mut self, name: &str, _: Value) -> Result<(), ReflectError> {
                Err(ReflectError::no_such_field("Nothing", name))
            }
        }

        let member = MemberDescriptor::field(
            "Nothing",
            "x",
            reflectgrid_core::FieldType::Bool,
            reflectgrid_core::FieldAnnotation::DEFAULT,
        );
        services.subscribers().notify(&FieldChange {
            field: &member,
            old_value: &Value::Bool(false),
            new_value: &Value::Bool(true),
            object: &Nothing,
        });
        assert_eq!(*seen.lock(), ["first", "second", "third"]);
    }

    #[test]
    fn global_services_are_a_singleton() {
        assert!(Arc::ptr_eq(&FormServices::global(), &FormServices::global()));
    }
}
