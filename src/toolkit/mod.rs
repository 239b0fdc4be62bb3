//! Toolkit collaborator: the widget and container abstraction the engine renders into.
//!
//! The engine never names a concrete widget type. It asks a [`Toolkit`] for one of the five control
//! kinds, configures it through the [`Widget`] trait, installs its change callback through the
//! kind-specific view (`as_text_input`, `as_selection`, `as_stepper`, `as_trigger`), and hands it to
//! a [`GridContainer`] together with a [`Cell`].
//!
//! ## Notes
//!
//! - Callbacks run synchronously on whatever thread delivers the toolkit event.
//! - A callback returns `Err` only for fatal configuration errors; bad input is logged and swallowed
//!   inside the engine before it reaches the toolkit.
//! - [`headless`] is an in-memory implementation used by tests and the demo binary.

pub mod headless;

use std::any::Any;
use std::fmt;

use bigdecimal::BigDecimal;
use reflectgrid_core::EnumConstant;

use crate::errors::BindError;
use crate::layout::Cell;
use crate::numeric::NumberStepper;

pub type TextCallback = Box<dyn FnMut(&str) -> Result<(), BindError>>;
pub type SelectionCallback = Box<dyn FnMut(&Choice) -> Result<(), BindError>>;
pub type StepperCallback = Box<dyn FnMut(&BigDecimal) -> Result<(), BindError>>;
pub type TriggerCallback = Box<dyn FnMut() -> Result<(), BindError>>;

/// Concrete flavour of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    SingleLineText,
    MultiLineText,
    Selection,
    NumericStepper,
    Trigger,
    /// A toolkit-specific control the engine has no editability mechanism for.
    Custom(&'static str),
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::SingleLineText => "single-line text",
            ControlKind::MultiLineText => "multi-line text",
            ControlKind::Selection => "selection",
            ControlKind::NumericStepper => "numeric stepper",
            ControlKind::Trigger => "trigger",
            ControlKind::Custom(name) => *name,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ControlKind::SingleLineText | ControlKind::MultiLineText)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// A literal option string from the field annotation.
    Text(String),
    /// A constant of the field's enum type.
    Constant(EnumConstant),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Text(text) => f.write_str(text),
            Choice::Constant(constant) => f.write_str(constant.name),
        }
    }
}

/// A focusable control created by a toolkit.
pub trait Widget {
    fn kind(&self) -> ControlKind;

    fn set_tooltip(&mut self, tooltip: &str);

    fn set_max_width(&mut self, width: f64);

    fn set_disabled(&mut self, disabled: bool);

    fn set_focus_traversable(&mut self, focusable: bool);

    fn set_mouse_transparent(&mut self, transparent: bool);

    fn as_text_input(&mut self) -> Option<&mut dyn TextInput> {
        None
    }

    fn as_selection(&mut self) -> Option<&mut dyn Selection> {
        None
    }

    fn as_stepper(&mut self) -> Option<&mut dyn Stepper> {
        None
    }

    fn as_trigger(&mut self) -> Option<&mut dyn Trigger> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Single- or multi-line text control.
pub trait TextInput {
    /// Native read-only flag.
    fn set_editable(&mut self, editable: bool);

    fn on_text_changed(&mut self, callback: TextCallback);
}

/// Drop-down selection control.
pub trait Selection {
    /// Whether free text can be typed instead of picking a choice.
    fn set_editable(&mut self, editable: bool);

    fn on_selection_changed(&mut self, callback: SelectionCallback);
}

/// Bounded numeric stepper.
pub trait Stepper {
    fn set_editable(&mut self, editable: bool);

    fn on_value_changed(&mut self, callback: StepperCallback);
}

/// Clickable trigger.
pub trait Trigger {
    fn on_fire(&mut self, callback: TriggerCallback);
}

/// A text label placed in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub tooltip: Option<String>,
}

/// Anything a grid can hold.
pub enum Node {
    Label(Label),
    Control(Box<dyn Widget>),
    /// Full-width horizontal rule.
    Separator,
}

impl Node {
    pub fn label(text: impl Into<String>, tooltip: Option<&str>) -> Self {
        Node::Label(Label {
            text: text.into(),
            tooltip: tooltip.map(str::to_string),
        })
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Node::Control(_))
    }

    pub fn as_label(&self) -> Option<&Label> {
        match self {
            Node::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&dyn Widget> {
        match self {
            Node::Control(widget) => Some(widget.as_ref()),
            _ => None,
        }
    }

    pub fn as_widget_mut(&mut self) -> Option<&mut dyn Widget> {
        match self {
            Node::Control(widget) => Some(widget.as_mut()),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Label(label) => f.debug_tuple("Label").field(&label.text).finish(),
            Node::Control(widget) => f.debug_tuple("Control").field(&widget.kind()).finish(),
            Node::Separator => f.write_str("Separator"),
        }
    }
}

/// A grid that places children at row/column coordinates.
pub trait GridContainer {
    fn set_spacing(&mut self, hgap: f64, vgap: f64, padding: f64);

    fn add(&mut self, node: Node, cell: Cell);

    /// Remove every child.
    fn clear(&mut self);

    /// Remove and return every child, in insertion order.
    fn drain(&mut self) -> Vec<Node>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Factory for controls and containers.
pub trait Toolkit {
    fn single_line_text(&self, text: &str) -> Box<dyn Widget>;

    fn multi_line_text(&self, text: &str) -> Box<dyn Widget>;

    fn selection(&self, choices: Vec<Choice>, selected: Option<usize>) -> Box<dyn Widget>;

    fn stepper(&self, model: NumberStepper) -> Box<dyn Widget>;

    fn trigger(&self, caption: &str) -> Box<dyn Widget>;

    fn container(&self) -> Box<dyn GridContainer>;
}
