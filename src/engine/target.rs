//! Handles to the object an engine renders.
//!
//! A nested engine's target usually lives inside its parent's object, so it cannot be shared on its
//! own. A [`TargetHandle`] addresses it as a shared root plus a path of composite fields. Every access
//! borrows the root for the duration of one closure call and walks the path again; no borrow is held
//! between calls, so callbacks never overlap with a render pass.

use std::rc::Rc;

use reflectgrid_core::{
    Composite, CompositeMut, Reflect, ReflectError, SharedTarget, ancestor, ancestor_mut,
};

use crate::errors::BindError;

/// One composite hop: the field `field` declared at ancestry `depth` of the current object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    depth: usize,
    field: &'static str,
}

/// Identity of an object on the active render stack.
///
/// A struct and its first field can share an address, so the type name is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectIdentity {
    address: usize,
    type_name: &'static str,
}

impl ObjectIdentity {
    pub fn of(target: &dyn Reflect) -> Self {
        Self {
            address: target as *const dyn Reflect as *const () as usize,
            type_name: target.type_name(),
        }
    }
}

/// Where a nested composite lives.
pub(crate) enum NestedTarget {
    Handle(TargetHandle),
    Null,
}

/// Address of a bound target: a shared root plus a path of composite fields.
#[derive(Clone)]
pub struct TargetHandle {
    root: SharedTarget,
    path: Rc<[Step]>,
}

impl TargetHandle {
    pub fn new(root: SharedTarget) -> Self {
        Self {
            root,
            path: Rc::from(Vec::new()),
        }
    }

    /// Run `f` against the addressed object.
    pub fn with_target<R>(&self, f: impl FnOnce(&dyn Reflect) -> R) -> Result<R, BindError> {
        let guard = self.root.try_borrow().map_err(|_| BindError::TargetBusy)?;
        let mut current: &dyn Reflect = &*guard;
        for step in self.path.iter() {
            let owner = ancestor(current, step.depth)?;
            current = match owner.composite(step.field)? {
                Composite::Borrowed(next) => next,
                Composite::Shared(_) | Composite::Null => return Err(moved(owner, step)),
            };
        }
        Ok(f(current))
    }

    /// Run `f` against the addressed object, mutably.
    pub fn with_target_mut<R>(&self, f: impl FnOnce(&mut dyn Reflect) -> R) -> Result<R, BindError> {
        let mut guard = self.root.try_borrow_mut().map_err(|_| BindError::TargetBusy)?;
        let mut current: &mut dyn Reflect = &mut *guard;
        for step in self.path.iter() {
            let owner = ancestor_mut(current, step.depth)?;
            let type_name = owner.type_name();
            current = match owner.composite_mut(step.field)? {
                CompositeMut::Borrowed(next) => next,
                CompositeMut::Shared(_) | CompositeMut::Null => {
                    return Err(BindError::NullComposite {
                        type_name,
                        field: step.field,
                    });
                }
            };
        }
        Ok(f(current))
    }

    pub fn type_name(&self) -> Result<&'static str, BindError> {
        self.with_target(|target| target.type_name())
    }

    pub fn identity(&self) -> Result<ObjectIdentity, BindError> {
        self.with_target(ObjectIdentity::of)
    }

    /// Resolve the composite field `field` declared at `depth` into a handle of its own.
    ///
    /// Shared composites become new roots; owned ones extend this handle's path.
    pub(crate) fn nested(&self, depth: usize, field: &'static str) -> Result<NestedTarget, BindError> {
        let found = self.with_target(|target| -> Result<Option<Option<SharedTarget>>, ReflectError> {
            let owner = ancestor(target, depth)?;
            Ok(match owner.composite(field)? {
                Composite::Borrowed(_) => Some(None),
                Composite::Shared(shared) => Some(Some(shared)),
                Composite::Null => None,
            })
        })??;

        Ok(match found {
            None => NestedTarget::Null,
            Some(Some(shared)) => NestedTarget::Handle(TargetHandle::new(shared)),
            Some(None) => {
                let mut path = self.path.to_vec();
                path.push(Step { depth, field });
                NestedTarget::Handle(TargetHandle {
                    root: Rc::clone(&self.root),
                    path: Rc::from(path),
                })
            }
        })
    }
}

fn moved(owner: &dyn Reflect, step: &Step) -> BindError {
    BindError::NullComposite {
        type_name: owner.type_name(),
        field: step.field,
    }
}
