//! In-memory toolkit.
//!
//! Every widget records the configuration the engine applied to it and can be driven like a user
//! would: typing text, picking a choice, stepping a number, clicking a trigger. The grid renders to a
//! plain-text table, one line per placed node, ordered by row then column.
//!
//! ## Notes
//!
//! - Driving a control the user could not interact with (disabled, read-only, or mouse-transparent)
//!   is a no-op.
//! - Driving a control of the wrong kind is reported as [`ConfigError::WidgetMismatch`].

use std::any::Any;
use std::fmt::Write as _;

use bigdecimal::BigDecimal;

use super::{
    Choice, ControlKind, GridContainer, Node, Selection, SelectionCallback, Stepper, StepperCallback, TextCallback,
    TextInput, Toolkit, Trigger, TriggerCallback, Widget,
};
use crate::errors::{BindError, ConfigError};
use crate::layout::Cell;
use crate::numeric::NumberStepper;

// ============================================================================
// Toolkit
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessToolkit;

impl Toolkit for HeadlessToolkit {
    fn single_line_text(&self, text: &str) -> Box<dyn Widget> {
        Box::new(HeadlessControl::new(
            ControlKind::SingleLineText,
            ControlState::Text {
                text: text.to_string(),
                on_change: None,
            },
        ))
    }

    fn multi_line_text(&self, text: &str) -> Box<dyn Widget> {
        Box::new(HeadlessControl::new(
            ControlKind::MultiLineText,
            ControlState::Text {
                text: text.to_string(),
                on_change: None,
            },
        ))
    }

    fn selection(&self, choices: Vec<Choice>, selected: Option<usize>) -> Box<dyn Widget> {
        let selected = selected.filter(|index| *index < choices.len());
        Box::new(HeadlessControl::new(
            ControlKind::Selection,
            ControlState::Selection {
                choices,
                selected,
                on_change: None,
            },
        ))
    }

    fn stepper(&self, model: NumberStepper) -> Box<dyn Widget> {
        Box::new(HeadlessControl::new(
            ControlKind::NumericStepper,
            ControlState::Stepper { model, on_change: None },
        ))
    }

    fn trigger(&self, caption: &str) -> Box<dyn Widget> {
        Box::new(HeadlessControl::new(
            ControlKind::Trigger,
            ControlState::Trigger {
                caption: caption.to_string(),
                on_fire: None,
            },
        ))
    }

    fn container(&self) -> Box<dyn GridContainer> {
        Box::new(HeadlessGrid::default())
    }
}

// ============================================================================
// Controls
// ============================================================================

enum ControlState {
    Text {
        text: String,
        on_change: Option<TextCallback>,
    },
    Selection {
        choices: Vec<Choice>,
        selected: Option<usize>,
        on_change: Option<SelectionCallback>,
    },
    Stepper {
        model: NumberStepper,
        on_change: Option<StepperCallback>,
    },
    Trigger {
        caption: String,
        on_fire: Option<TriggerCallback>,
    },
}

/// A headless control of any kind.
pub struct HeadlessControl {
    kind: ControlKind,
    tooltip: Option<String>,
    max_width: Option<f64>,
    disabled: bool,
    focus_traversable: bool,
    mouse_transparent: bool,
    editable: bool,
    state: ControlState,
}

impl HeadlessControl {
    fn new(kind: ControlKind, state: ControlState) -> Self {
        Self {
            kind,
            tooltip: None,
            max_width: None,
            disabled: false,
            focus_traversable: true,
            mouse_transparent: false,
            editable: true,
            state,
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn max_width(&self) -> Option<f64> {
        self.max_width
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_focus_traversable(&self) -> bool {
        self.focus_traversable
    }

    pub fn is_mouse_transparent(&self) -> bool {
        self.mouse_transparent
    }

    /// Return true once the engine installed a callback.
    pub fn is_bound(&self) -> bool {
        match &self.state {
            ControlState::Text { on_change, .. } => on_change.is_some(),
            ControlState::Selection { on_change, .. } => on_change.is_some(),
            ControlState::Stepper { on_change, .. } => on_change.is_some(),
            ControlState::Trigger { on_fire, .. } => on_fire.is_some(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.state {
            ControlState::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.state {
            ControlState::Selection { choices, .. } => choices.as_slice(),
            _ => &[],
        }
    }

    pub fn selected(&self) -> Option<&Choice> {
        match &self.state {
            ControlState::Selection { choices, selected, .. } => selected.and_then(|index| choices.get(index)),
            _ => None,
        }
    }

    pub fn stepper_model(&self) -> Option<&NumberStepper> {
        match &self.state {
            ControlState::Stepper { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&BigDecimal> {
        self.stepper_model().map(NumberStepper::value)
    }

    pub fn caption(&self) -> Option<&str> {
        match &self.state {
            ControlState::Trigger { caption, .. } => Some(caption.as_str()),
            _ => None,
        }
    }

    fn interactive(&self) -> bool {
        !self.disabled && !self.mouse_transparent
    }

    fn mismatch(&self, expected: ControlKind) -> BindError {
        ConfigError::WidgetMismatch {
            expected,
            found: self.kind,
        }
        .into()
    }

    /// Replace the text as if the user typed it.
    pub fn enter_text(&mut self, input: &str) -> Result<(), BindError> {
        let accepts = self.interactive() && self.editable;
        let ControlState::Text { text, on_change } = &mut self.state else {
            return Err(self.mismatch(ControlKind::SingleLineText));
        };
        if !accepts {
            return Ok(());
        }
        *text = input.to_string();
        match on_change {
            Some(callback) => callback(input),
            None => Ok(()),
        }
    }

    /// Pick the choice at `index`.
    pub fn select(&mut self, index: usize) -> Result<(), BindError> {
        let accepts = self.interactive();
        let ControlState::Selection {
            choices,
            selected,
            on_change,
        } = &mut self.state
        else {
            return Err(self.mismatch(ControlKind::Selection));
        };
        if !accepts || index >= choices.len() {
            return Ok(());
        }
        *selected = Some(index);
        match (on_change, choices.get(index)) {
            (Some(callback), Some(choice)) => callback(choice),
            _ => Ok(()),
        }
    }

    /// Pick the choice displayed as `name`.
    pub fn select_named(&mut self, name: &str) -> Result<(), BindError> {
        let index = self.choices().iter().position(|choice| choice.to_string() == name);
        match index {
            Some(index) => self.select(index),
            None if self.kind == ControlKind::Selection => Ok(()),
            None => Err(self.mismatch(ControlKind::Selection)),
        }
    }

    /// Type a number into the stepper.
    pub fn set_value(&mut self, value: BigDecimal) -> Result<(), BindError> {
        self.step_with(|model| {
            model.set_value(value);
            Ok(())
        })
    }

    pub fn increment(&mut self, steps: u32) -> Result<(), BindError> {
        self.step_with(|model| model.increment(steps))
    }

    pub fn decrement(&mut self, steps: u32) -> Result<(), BindError> {
        self.step_with(|model| model.decrement(steps))
    }

    fn step_with(
        &mut self,
        apply: impl FnOnce(&mut NumberStepper) -> Result<(), ConfigError>,
    ) -> Result<(), BindError> {
        let accepts = self.interactive() && self.editable;
        let ControlState::Stepper { model, on_change } = &mut self.state else {
            return Err(self.mismatch(ControlKind::NumericStepper));
        };
        if !accepts {
            return Ok(());
        }
        apply(model)?;
        match on_change {
            Some(callback) => callback(model.value()),
            None => Ok(()),
        }
    }

    /// Click the trigger.
    pub fn fire(&mut self) -> Result<(), BindError> {
        let accepts = !self.disabled;
        let ControlState::Trigger { on_fire, .. } = &mut self.state else {
            return Err(self.mismatch(ControlKind::Trigger));
        };
        match on_fire {
            Some(callback) if accepts => callback(),
            _ => Ok(()),
        }
    }

    fn describe(&self) -> String {
        let mut out = match &self.state {
            ControlState::Text { text, .. } if self.kind == ControlKind::MultiLineText => {
                format!("textarea {text:?}")
            }
            ControlState::Text { text, .. } => format!("text {text:?}"),
            ControlState::Selection { choices, selected, .. } => {
                let entries: Vec<String> = choices
                    .iter()
                    .enumerate()
                    .map(|(index, choice)| {
                        if Some(index) == *selected {
                            format!("*{choice}")
                        } else {
                            choice.to_string()
                        }
                    })
                    .collect();
                format!("select [{}]", entries.join(", "))
            }
            ControlState::Stepper { model, .. } => format!("stepper {}", model.value()),
            ControlState::Trigger { caption, .. } => format!("button {caption:?}"),
        };
        if self.mouse_transparent {
            out.push_str(" read-only");
        }
        if self.disabled {
            out.push_str(" disabled");
        }
        if let Some(tooltip) = &self.tooltip {
            let _ = write!(out, " tip={tooltip:?}");
        }
        out
    }
}

impl Widget for HeadlessControl {
    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = Some(tooltip.to_string());
    }

    fn set_max_width(&mut self, width: f64) {
        self.max_width = Some(width);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn set_focus_traversable(&mut self, focusable: bool) {
        self.focus_traversable = focusable;
    }

    fn set_mouse_transparent(&mut self, transparent: bool) {
        self.mouse_transparent = transparent;
    }

    fn as_text_input(&mut self) -> Option<&mut dyn TextInput> {
        matches!(self.state, ControlState::Text { .. }).then_some(self as &mut dyn TextInput)
    }

    fn as_selection(&mut self) -> Option<&mut dyn Selection> {
        matches!(self.state, ControlState::Selection { .. }).then_some(self as &mut dyn Selection)
    }

    fn as_stepper(&mut self) -> Option<&mut dyn Stepper> {
        matches!(self.state, ControlState::Stepper { .. }).then_some(self as &mut dyn Stepper)
    }

    fn as_trigger(&mut self) -> Option<&mut dyn Trigger> {
        matches!(self.state, ControlState::Trigger { .. }).then_some(self as &mut dyn Trigger)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TextInput for HeadlessControl {
    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn on_text_changed(&mut self, callback: TextCallback) {
        if let ControlState::Text { on_change, .. } = &mut self.state {
            *on_change = Some(callback);
        }
    }
}

impl Selection for HeadlessControl {
    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn on_selection_changed(&mut self, callback: SelectionCallback) {
        if let ControlState::Selection { on_change, .. } = &mut self.state {
            *on_change = Some(callback);
        }
    }
}

impl Stepper for HeadlessControl {
    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn on_value_changed(&mut self, callback: StepperCallback) {
        if let ControlState::Stepper { on_change, .. } = &mut self.state {
            *on_change = Some(callback);
        }
    }
}

impl Trigger for HeadlessControl {
    fn on_fire(&mut self, callback: TriggerCallback) {
        if let ControlState::Trigger { on_fire, .. } = &mut self.state {
            *on_fire = Some(callback);
        }
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Grid container that keeps its children in insertion order.
#[derive(Debug, Default)]
pub struct HeadlessGrid {
    children: Vec<(Node, Cell)>,
    spacing: (f64, f64, f64),
}

impl HeadlessGrid {
    pub fn downcast(container: &dyn GridContainer) -> Option<&HeadlessGrid> {
        container.as_any().downcast_ref()
    }

    pub fn downcast_mut(container: &mut dyn GridContainer) -> Option<&mut HeadlessGrid> {
        container.as_any_mut().downcast_mut()
    }

    /// `(hgap, vgap, padding)` as configured by the engine.
    pub fn spacing(&self) -> (f64, f64, f64) {
        self.spacing
    }

    pub fn children(&self) -> impl Iterator<Item = (&Node, Cell)> + '_ {
        self.children.iter().map(|(node, cell)| (node, *cell))
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.children.iter().map(|(_, cell)| *cell)
    }

    /// Every headless control, in insertion order.
    pub fn controls(&self) -> impl Iterator<Item = &HeadlessControl> + '_ {
        self.children
            .iter()
            .filter_map(|(node, _)| node.as_widget())
            .filter_map(|widget| widget.as_any().downcast_ref::<HeadlessControl>())
    }

    /// Label texts, in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|(node, _)| node.as_label())
            .map(|label| label.text.as_str())
            .collect()
    }

    /// Number of rows in use.
    pub fn row_count(&self) -> usize {
        self.cells().map(|cell| cell.row + 1).max().unwrap_or(0)
    }

    /// Short kind names of every node, in insertion order.
    pub fn structure(&self) -> Vec<&'static str> {
        self.children
            .iter()
            .map(|(node, _)| match node {
                Node::Label(_) => "label",
                Node::Separator => "separator",
                Node::Control(widget) => match widget.kind() {
                    ControlKind::SingleLineText => "text",
                    ControlKind::MultiLineText => "textarea",
                    ControlKind::Selection => "select",
                    ControlKind::NumericStepper => "stepper",
                    ControlKind::Trigger => "button",
                    ControlKind::Custom(name) => name,
                },
            })
            .collect()
    }

    /// The control placed right after the first label reading `label`.
    pub fn control(&self, label: &str) -> Option<&HeadlessControl> {
        let index = self.control_index(label)?;
        self.children[index]
            .0
            .as_widget()
            .and_then(|widget| widget.as_any().downcast_ref())
    }

    pub fn control_mut(&mut self, label: &str) -> Option<&mut HeadlessControl> {
        let index = self.control_index(label)?;
        self.children[index]
            .0
            .as_widget_mut()
            .and_then(|widget| widget.as_any_mut().downcast_mut())
    }

    fn control_index(&self, label: &str) -> Option<usize> {
        let at = self
            .children
            .iter()
            .position(|(node, _)| node.as_label().is_some_and(|l| l.text == label))?;
        let next = at + 1;
        self.children
            .get(next)
            .is_some_and(|(node, _)| node.is_control())
            .then_some(next)
    }

    /// Render one line per node, ordered by row then column.
    pub fn render_text(&self) -> String {
        let mut ordered: Vec<&(Node, Cell)> = self.children.iter().collect();
        ordered.sort_by_key(|(_, cell)| (cell.row, cell.column));

        let mut out = String::new();
        for (node, cell) in ordered {
            let position = if cell.column_span > 1 {
                format!("{:02}:{}+{}", cell.row, cell.column, cell.column_span)
            } else {
                format!("{:02}:{}", cell.row, cell.column)
            };
            let description = match node {
                Node::Label(label) => match &label.tooltip {
                    Some(tooltip) => format!("label {:?} tip={tooltip:?}", label.text),
                    None => format!("label {:?}", label.text),
                },
                Node::Separator => "separator".to_string(),
                Node::Control(widget) => match widget.as_any().downcast_ref::<HeadlessControl>() {
                    Some(control) => control.describe(),
                    None => widget.kind().to_string(),
                },
            };
            let _ = writeln!(out, "{position} {description}");
        }
        out
    }
}

impl GridContainer for HeadlessGrid {
    fn set_spacing(&mut self, hgap: f64, vgap: f64, padding: f64) {
        self.spacing = (hgap, vgap, padding);
    }

    fn add(&mut self, node: Node, cell: Cell) {
        self.children.push((node, cell));
    }

    fn clear(&mut self) {
        self.children.clear();
    }

    fn drain(&mut self) -> Vec<Node> {
        self.children.drain(..).map(|(node, _)| node).collect()
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn headless(widget: &mut Box<dyn Widget>) -> &mut HeadlessControl {
        widget.as_any_mut().downcast_mut().unwrap()
    }

    #[test]
    fn text_input_fires_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut widget = HeadlessToolkit.single_line_text("old");
        let sink = Rc::clone(&seen);
        widget
            .as_text_input()
            .unwrap()
            .on_text_changed(Box::new(move |text: &str| {
                sink.borrow_mut().push(text.to_string());
                Ok(())
            }));

        let control = headless(&mut widget);
        control.enter_text("new").unwrap();
        assert_eq!(control.text(), Some("new"));
        assert_eq!(*seen.borrow(), ["new"]);
    }

    #[test]
    fn read_only_controls_ignore_input() {
        let mut widget = HeadlessToolkit.single_line_text("fixed");
        widget.as_text_input().unwrap().set_editable(false);
        let control = headless(&mut widget);
        control.enter_text("changed").unwrap();
        assert_eq!(control.text(), Some("fixed"));
    }

    #[test]
    fn driving_the_wrong_kind_is_a_mismatch() {
        let mut widget = HeadlessToolkit.trigger("Go");
        let err = headless(&mut widget).enter_text("x").unwrap_err();
        assert_eq!(
            err,
            BindError::Config(ConfigError::WidgetMismatch {
                expected: ControlKind::SingleLineText,
                found: ControlKind::Trigger,
            })
        );
    }

    #[test]
    fn views_match_the_control_kind() {
        let mut stepper = HeadlessToolkit.stepper(NumberStepper::new(
            BigDecimal::from(0),
            BigDecimal::from(0),
            BigDecimal::from(5),
        ));
        assert!(stepper.as_stepper().is_some());
        assert!(stepper.as_text_input().is_none());
        assert!(stepper.as_selection().is_none());
    }

    #[test]
    fn grid_renders_in_row_order() {
        let mut grid = HeadlessGrid::default();
        grid.add(Node::Separator, Cell { row: 1, column: 0, column_span: 2 });
        grid.add(Node::label("Name", Some("who")), Cell::at(0, 0));
        grid.add(Node::Control(HeadlessToolkit.single_line_text("Loki")), Cell::at(0, 1));

        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.structure(), ["separator", "label", "text"]);
        assert_eq!(grid.control("Name").and_then(HeadlessControl::text), Some("Loki"));
        insta::assert_snapshot!(grid.render_text(), @r#"
        00:0 label "Name" tip="who"
        00:1 text "Loki"
        01:0+2 separator
        "#);
    }
}
