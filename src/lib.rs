#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
//! Reflectgrid: bind annotated Rust objects to editable grid forms.
//!
//! A type opts in with `#[derive(Reflect)]` and `#[grid(..)]` field attributes. A [`ReflectorGrid`]
//! walks the bound object's annotated members, builds one labelled control per member through a
//! [`Toolkit`](toolkit::Toolkit), places them with a [`LayoutStrategy`], and writes every edit back
//! into the object before notifying its observers.
//!
//! ## Panic Policy
//!
//! - **Production code**: errors are returned as [`BindError`] / [`ConfigError`]; `unwrap()` is denied.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Actions**: a panicking action is caught and logged; the form stays usable.
//!
//! ## Example
//! ```ignore
//! use std::{cell::RefCell, rc::Rc};
//! use reflectgrid::{Reflect, ReflectorGrid, toolkit::headless::HeadlessToolkit};
//!
//! #[derive(Reflect)]
//! struct Server {
//!     #[grid(tooltip = "TCP port", min = 1, max = 65535)]
//!     port: u16,
//! }
//!
//! let server = Rc::new(RefCell::new(Server { port: 8080 }));
//! let mut grid = ReflectorGrid::new(Rc::new(HeadlessToolkit));
//! grid.bind(&server)?;
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod demo;
pub mod engine;
pub mod errors;
pub mod layout;
pub mod numeric;
pub mod propagation;
pub mod toolkit;
pub mod version;

pub use config::GridConfig;
pub use convert::{TypeConverter, TypeConverterRegistry};
pub use engine::{ControlBinding, ReflectorGrid};
pub use errors::{BindError, ConfigError};
pub use layout::LayoutStrategy;
pub use propagation::{ChangeSubscriber, FieldChange, FormServices};

pub use reflectgrid_core::{
    ActionAnnotation, BigDecimal, ConvertError, EnumConstant, EnumInfo, FieldAnnotation, FieldKind, FieldObserver,
    FieldType, GridActions, GridEnum, GridField, MemberDescriptor, MemberKind, NamingStrategy, NumericKind, Reflect,
    ReflectError, SharedTarget, TypeKey, Value,
};
pub use reflectgrid_derive::{GridEnum, Reflect, grid_actions};
