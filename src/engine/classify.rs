//! Member classification and control construction.
//!
//! Field classification follows a strict precedence:
//! 1. a non-empty `options` list: a selection of those strings
//! 2. a numeric type: a bounded decimal stepper
//! 3. an enum type: a selection of the enum's constants
//! 4. a text-like scalar: a single- or multi-line text control, per the annotation's field kind
//! 5. anything else is a composite and becomes a sub-form (see [`super::subform`])
//!
//! Every field control then goes through the editability gate, gets the annotation tooltip and the
//! configured width limit, and has its write-back callback installed.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use reflectgrid_core::{
    ActionAnnotation, EnumInfo, FieldAnnotation, FieldKind, FieldType, MemberDescriptor, MemberKind, NumericKind,
    ReflectError, TypeKey, Value, ancestor_mut,
};

use super::target::TargetHandle;
use crate::config::GridConfig;
use crate::errors::{BindError, ConfigError};
use crate::numeric::{NumberStepper, default_bounds, parse_decimal};
use crate::propagation::{FormServices, read_member, write_back};
use crate::toolkit::{Choice, ControlKind, Node, Toolkit, Widget};

/// What a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Selection of the annotation's literal options.
    Options,
    Numeric(NumericKind),
    Enum(EnumInfo),
    /// Text control of the given kind.
    Text(ControlKind),
    Composite,
}

/// Classify a field descriptor.
///
/// ## Errors
/// - [`ConfigError::UnknownFieldKind`] when a text-like field asks for a kind the engine does not know.
pub fn classify(member: &MemberDescriptor) -> Result<Classification, ConfigError> {
    let MemberKind::Field { field_type, annotation } = &member.kind else {
        return Ok(Classification::Composite);
    };
    if !annotation.options.is_empty() {
        return Ok(Classification::Options);
    }
    Ok(match field_type {
        FieldType::Numeric(kind) => Classification::Numeric(*kind),
        FieldType::Enum(info) => Classification::Enum(*info),
        FieldType::Bool | FieldType::Char | FieldType::Text => match annotation.field_kind {
            FieldKind::SingleLine => Classification::Text(ControlKind::SingleLineText),
            FieldKind::MultiLine => Classification::Text(ControlKind::MultiLineText),
            FieldKind::Named(kind) => {
                return Err(ConfigError::UnknownFieldKind {
                    type_name: member.declaring_type,
                    field: member.name,
                    kind,
                });
            }
        },
        FieldType::Composite { .. } => Classification::Composite,
    })
}

/// Make a data-bound control read-only when its field is not editable.
///
/// Text controls use their native read-only flag, selections are never free-text editable, and
/// steppers use their own flag. A non-editable control also ignores the mouse and keyboard focus.
pub fn apply_editable(widget: &mut dyn Widget, editable: bool) -> Result<(), ConfigError> {
    let kind = widget.kind();
    match kind {
        kind if kind.is_text() => text_view(widget, kind)?.set_editable(editable),
        ControlKind::Selection => selection_view(widget)?.set_editable(false),
        ControlKind::NumericStepper => stepper_view(widget)?.set_editable(editable),
        _ => return Err(ConfigError::UneditableControl { kind }),
    }
    widget.set_mouse_transparent(!editable);
    widget.set_focus_traversable(editable);
    Ok(())
}

/// Builds label/control pairs for one engine.
pub(crate) struct ControlFactory<'a> {
    pub toolkit: &'a dyn Toolkit,
    pub services: &'a Arc<FormServices>,
    pub config: &'a GridConfig,
}

impl ControlFactory<'_> {
    /// Label text of a field.
    pub fn field_label(&self, member: &MemberDescriptor) -> String {
        let override_name = match &member.kind {
            MemberKind::Field { annotation, .. } => annotation.display_name,
            MemberKind::Action(_) => None,
        };
        override_name.map_or_else(|| self.config.field_naming.display_name(member.name), str::to_string)
    }

    /// Build the label and bound control of a leaf field.
    pub fn field_pair(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
    ) -> Result<(Node, Box<dyn Widget>), BindError> {
        let MemberKind::Field { field_type, annotation } = &member.kind else {
            return Err(ReflectError::no_such_field(member.declaring_type, member.name).into());
        };
        if let FieldType::Enum(info) = field_type {
            self.services.converters().register_enum(*info);
        }

        let current = target.with_target(|object| read_member(object, member))?;
        let current = current.unwrap_or_else(|err| {
            tracing::warn!(field = member.name, error = %err, "could not read field; rendering it empty");
            Value::Null
        });

        let mut widget = match classify(member)? {
            Classification::Options => self.options_control(target, member, annotation, &current)?,
            Classification::Numeric(kind) => self.stepper_control(target, member, kind, annotation, &current)?,
            Classification::Enum(info) => self.enum_control(target, member, info, &current)?,
            Classification::Text(kind) => self.text_control(target, member, kind, &current)?,
            Classification::Composite => {
                return Err(ReflectError::no_such_field(member.declaring_type, member.name).into());
            }
        };

        apply_editable(widget.as_mut(), annotation.editable)?;
        self.decorate(widget.as_mut(), member);

        let label = Node::label(self.field_label(member), member.tooltip());
        Ok((label, widget))
    }

    /// Build the label and trigger of an action.
    pub fn action_pair(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
        annotation: &ActionAnnotation,
    ) -> Result<(Node, Box<dyn Widget>), BindError> {
        let label_text = self.config.method_naming.display_name(member.name);
        let caption = if annotation.name.is_empty() {
            label_text.as_str()
        } else {
            annotation.name
        };

        let mut widget = self.toolkit.trigger(caption);
        expect_kind(widget.as_ref(), ControlKind::Trigger)?;
        widget.set_disabled(!annotation.enabled);
        self.decorate(widget.as_mut(), member);

        let target = target.clone();
        let member = *member;
        trigger_view(widget.as_mut())?.on_fire(Box::new(move || {
            invoke_action(&target, &member);
            Ok(())
        }));

        Ok((Node::label(label_text, member.tooltip()), widget))
    }

    fn decorate(&self, widget: &mut dyn Widget, member: &MemberDescriptor) {
        if let Some(tooltip) = member.tooltip() {
            widget.set_tooltip(tooltip);
        }
        widget.set_max_width(self.config.width_limit);
    }

    fn to_text(&self, member: &MemberDescriptor, value: &Value) -> Result<String, BindError> {
        let key = type_key(member);
        match key.map(|key| self.services.converters().to_string(key, value)) {
            Some(Ok(text)) => Ok(text),
            Some(Err(err)) => {
                ConfigError::check_convert(&err)?;
                tracing::warn!(field = member.name, error = %err, "could not format field value");
                Ok(String::new())
            }
            None => Ok(value.to_string()),
        }
    }

    fn options_control(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
        annotation: &FieldAnnotation,
        current: &Value,
    ) -> Result<Box<dyn Widget>, BindError> {
        let current_text = self.to_text(member, current)?;
        let choices: Vec<Choice> = annotation
            .options
            .iter()
            .map(|option| Choice::Text((*option).to_string()))
            .collect();
        let selected = annotation.options.iter().position(|option| *option == current_text);

        let mut widget = self.toolkit.selection(choices, selected);
        expect_kind(widget.as_ref(), ControlKind::Selection)?;
        let path = self.write_path(target, member);
        selection_view(widget.as_mut())?
            .on_selection_changed(Box::new(move |choice: &Choice| path.send(choice_value(choice))));
        Ok(widget)
    }

    fn stepper_control(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
        kind: NumericKind,
        annotation: &FieldAnnotation,
        current: &Value,
    ) -> Result<Box<dyn Widget>, BindError> {
        let (default_min, default_max) = default_bounds(kind);
        let min = parse_bound(member, "min", annotation.min)?.unwrap_or(default_min);
        let max = parse_bound(member, "max", annotation.max)?.unwrap_or(default_max);
        let step = parse_bound(member, "step", annotation.step)?.unwrap_or_else(|| BigDecimal::from(1));
        if min > max {
            return Err(invalid_bound(member, "max", format!("{max} is below min {min}")).into());
        }
        if step <= BigDecimal::from(0) {
            return Err(invalid_bound(member, "step", format!("{step} is not positive")).into());
        }

        let seed = current.to_decimal().unwrap_or_else(|| BigDecimal::from(0));
        let model = NumberStepper::new(seed, min, max)
            .with_step(step)
            .with_wrap(annotation.wrap);

        let mut widget = self.toolkit.stepper(model);
        expect_kind(widget.as_ref(), ControlKind::NumericStepper)?;
        let path = self.write_path(target, member);
        stepper_view(widget.as_mut())?
            .on_value_changed(Box::new(move |value: &BigDecimal| path.send(Value::Decimal(value.clone()))));
        Ok(widget)
    }

    fn enum_control(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
        info: EnumInfo,
        current: &Value,
    ) -> Result<Box<dyn Widget>, BindError> {
        let choices: Vec<Choice> = info.iter().map(Choice::Constant).collect();
        let selected = match current {
            Value::Enum(constant) if constant.type_id == info.type_id => Some(constant.index),
            _ => None,
        };

        let mut widget = self.toolkit.selection(choices, selected);
        expect_kind(widget.as_ref(), ControlKind::Selection)?;
        let path = self.write_path(target, member);
        selection_view(widget.as_mut())?
            .on_selection_changed(Box::new(move |choice: &Choice| path.send(choice_value(choice))));
        Ok(widget)
    }

    fn text_control(
        &self,
        target: &TargetHandle,
        member: &MemberDescriptor,
        kind: ControlKind,
        current: &Value,
    ) -> Result<Box<dyn Widget>, BindError> {
        let text = self.to_text(member, current)?;
        let mut widget = match kind {
            ControlKind::MultiLineText => self.toolkit.multi_line_text(&text),
            _ => self.toolkit.single_line_text(&text),
        };
        expect_kind(widget.as_ref(), kind)?;
        let path = self.write_path(target, member);
        text_view(widget.as_mut(), kind)?
            .on_text_changed(Box::new(move |text: &str| path.send(Value::Text(text.to_string()))));
        Ok(widget)
    }

    fn write_path(&self, target: &TargetHandle, member: &MemberDescriptor) -> WritePath {
        WritePath {
            services: Arc::clone(self.services),
            target: target.clone(),
            member: *member,
        }
    }
}

/// Everything a data-bound control's callback needs to write its field.
struct WritePath {
    services: Arc<FormServices>,
    target: TargetHandle,
    member: MemberDescriptor,
}

impl WritePath {
    fn send(&self, raw: Value) -> Result<(), BindError> {
        write_back(&self.services, &self.target, &self.member, raw)
    }
}

/// Invoke an action, logging every failure instead of propagating it.
fn invoke_action(target: &TargetHandle, member: &MemberDescriptor) {
    let outcome = target.with_target_mut(|object| {
        panic::catch_unwind(AssertUnwindSafe(|| {
            ancestor_mut(object, member.depth).and_then(|owner| owner.invoke(member.name))
        }))
    });
    match outcome {
        Ok(Ok(Ok(()))) => tracing::debug!(action = member.name, "action invoked"),
        Ok(Ok(Err(err))) => tracing::error!(action = member.name, error = %err, "action failed"),
        Ok(Err(payload)) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|message| (*message).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(action = member.name, %message, "action panicked");
        }
        Err(err) => tracing::error!(action = member.name, error = %err, "could not reach action target"),
    }
}

fn type_key(member: &MemberDescriptor) -> Option<TypeKey> {
    member.field_type().and_then(FieldType::type_key)
}

fn choice_value(choice: &Choice) -> Value {
    match choice {
        Choice::Text(text) => Value::Text(text.clone()),
        Choice::Constant(constant) => Value::Enum(*constant),
    }
}

fn expect_kind(widget: &dyn Widget, expected: ControlKind) -> Result<(), ConfigError> {
    let found = widget.kind();
    if found == expected {
        Ok(())
    } else {
        Err(ConfigError::WidgetMismatch { expected, found })
    }
}

fn selection_view(widget: &mut dyn Widget) -> Result<&mut dyn crate::toolkit::Selection, ConfigError> {
    let found = widget.kind();
    widget.as_selection().ok_or(ConfigError::WidgetMismatch {
        expected: ControlKind::Selection,
        found,
    })
}

fn text_view(
    widget: &mut dyn Widget,
    expected: ControlKind,
) -> Result<&mut dyn crate::toolkit::TextInput, ConfigError> {
    let found = widget.kind();
    widget.as_text_input().ok_or(ConfigError::WidgetMismatch { expected, found })
}

fn stepper_view(widget: &mut dyn Widget) -> Result<&mut dyn crate::toolkit::Stepper, ConfigError> {
    let found = widget.kind();
    widget.as_stepper().ok_or(ConfigError::WidgetMismatch {
        expected: ControlKind::NumericStepper,
        found,
    })
}

fn trigger_view(widget: &mut dyn Widget) -> Result<&mut dyn crate::toolkit::Trigger, ConfigError> {
    let found = widget.kind();
    widget.as_trigger().ok_or(ConfigError::WidgetMismatch {
        expected: ControlKind::Trigger,
        found,
    })
}

fn parse_bound(
    member: &MemberDescriptor,
    bound: &'static str,
    text: Option<&'static str>,
) -> Result<Option<BigDecimal>, ConfigError> {
    text.map(|text| parse_decimal(text).map_err(|err| invalid_bound(member, bound, err.to_string())))
        .transpose()
}

fn invalid_bound(member: &MemberDescriptor, bound: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidBound {
        type_name: member.declaring_type,
        field: member.name,
        bound,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;
    use crate::toolkit::headless::HeadlessToolkit;

    fn field(field_type: FieldType, annotation: FieldAnnotation) -> MemberDescriptor {
        MemberDescriptor::field("Sample", "value", field_type, annotation)
    }

    #[test]
    fn options_take_precedence_over_type() {
        let member = field(
            FieldType::Numeric(NumericKind::I32),
            FieldAnnotation {
                options: &["1", "2"],
                ..FieldAnnotation::DEFAULT
            },
        );
        assert_eq!(classify(&member), Ok(Classification::Options));
    }

    #[test]
    fn numeric_enum_and_text_classification() {
        enum Shade {}
        let info = EnumInfo {
            type_id: TypeId::of::<Shade>(),
            type_name: "Shade",
            constants: &["Light", "Dark"],
        };
        assert_eq!(
            classify(&field(FieldType::Numeric(NumericKind::F64), FieldAnnotation::DEFAULT)),
            Ok(Classification::Numeric(NumericKind::F64))
        );
        assert_eq!(
            classify(&field(FieldType::Enum(info), FieldAnnotation::DEFAULT)),
            Ok(Classification::Enum(info))
        );
        let multi = FieldAnnotation {
            field_kind: FieldKind::MultiLine,
            ..FieldAnnotation::DEFAULT
        };
        assert_eq!(
            classify(&field(FieldType::Text, multi)),
            Ok(Classification::Text(ControlKind::MultiLineText))
        );
        assert_eq!(
            classify(&field(FieldType::Composite { type_name: "Address" }, FieldAnnotation::DEFAULT)),
            Ok(Classification::Composite)
        );
    }

    #[test]
    fn unknown_field_kind_is_fatal_for_text() {
        let member = field(
            FieldType::Bool,
            FieldAnnotation {
                field_kind: FieldKind::Named("rich_text"),
                ..FieldAnnotation::DEFAULT
            },
        );
        assert_eq!(
            classify(&member),
            Err(ConfigError::UnknownFieldKind {
                type_name: "Sample",
                field: "value",
                kind: "rich_text",
            })
        );
    }

    #[test]
    fn editability_gate_per_control_kind() {
        let toolkit = HeadlessToolkit;

        let mut text = toolkit.single_line_text("x");
        apply_editable(text.as_mut(), false).unwrap();
        let text = text.as_any().downcast_ref::<crate::toolkit::headless::HeadlessControl>().unwrap();
        assert!(!text.is_editable());
        assert!(text.is_mouse_transparent());
        assert!(!text.is_focus_traversable());

        let mut selection = toolkit.selection(vec![Choice::Text("a".into())], Some(0));
        apply_editable(selection.as_mut(), true).unwrap();
        let selection = selection
            .as_any()
            .downcast_ref::<crate::toolkit::headless::HeadlessControl>()
            .unwrap();
        assert!(!selection.is_editable());
        assert!(selection.is_focus_traversable());

        let mut trigger = toolkit.trigger("Go");
        assert_eq!(
            apply_editable(trigger.as_mut(), true),
            Err(ConfigError::UneditableControl {
                kind: ControlKind::Trigger
            })
        );
    }

    /// A toolkit control the engine has no view for.
    struct Knob;

    impl Widget for Knob {
        fn kind(&self) -> ControlKind {
            ControlKind::Custom("knob")
        }

        fn set_tooltip(&mut self, _tooltip: &str) {}

        fn set_max_width(&mut self, _width: f64) {}

        fn set_disabled(&mut self, _disabled: bool) {}

        fn set_focus_traversable(&mut self, _focusable: bool) {}

        fn set_mouse_transparent(&mut self, _transparent: bool) {}

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn view_mismatch_names_the_widget_actual_kind() {
        let knob = ControlKind::Custom("knob");
        assert_eq!(
            text_view(&mut Knob, ControlKind::MultiLineText).err(),
            Some(ConfigError::WidgetMismatch {
                expected: ControlKind::MultiLineText,
                found: knob,
            })
        );
        assert_eq!(
            stepper_view(&mut Knob).err(),
            Some(ConfigError::WidgetMismatch {
                expected: ControlKind::NumericStepper,
                found: knob,
            })
        );
        assert_eq!(
            trigger_view(&mut Knob).err(),
            Some(ConfigError::WidgetMismatch {
                expected: ControlKind::Trigger,
                found: knob,
            })
        );
        assert_eq!(
            apply_editable(&mut Knob, true),
            Err(ConfigError::UneditableControl { kind: knob })
        );
    }
}
