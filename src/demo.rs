//! A bundled sample object for the demo binary.
//!
//! `JobConfig` exercises every kind of member the engine renders: plain text and numbers, a fixed
//! option list, a multi-line text field, an enum, a nested composite, a read-only field, two actions
//! (one disabled) and an inherited field from its parent type.

use std::cell::RefCell;
use std::rc::Rc;

use reflectgrid_core::{FieldObserver, MemberDescriptor};
use reflectgrid_derive::{GridEnum, Reflect, grid_actions};

/// How a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, GridEnum)]
pub enum RunMode {
    Full,
    Partial,
    DryRun,
}

/// The common base of every named item.
#[derive(Debug, Reflect)]
pub struct NamedItem {
    #[grid]
    pub name: String,
}

/// Where a job sends its output.
#[derive(Debug, Reflect)]
pub struct Endpoint {
    #[grid(min = 0, max = 65535)]
    pub port_to_send_to: i32,
    #[grid]
    pub ip_address: String,
    #[grid(kind = "multi_line")]
    pub message: String,
}

#[derive(Debug, Reflect)]
#[grid(observer, actions)]
pub struct JobConfig {
    #[grid(parent)]
    pub base: NamedItem,
    #[grid]
    pub function_name: String,
    #[grid]
    pub number: i32,
    #[grid(options("you", "are", "nice"))]
    pub choice_for_you: String,
    #[grid(kind = "multi_line")]
    pub text_area: String,
    #[grid(tooltip = "Defines the runtime of this application")]
    pub option: RunMode,
    #[grid]
    pub data: Endpoint,
    #[grid(editable = false)]
    pub uneditable_for_you: String,
    /// Number of field writes this object has observed.
    pub changes: usize,
    pub presses: usize,
}

impl JobConfig {
    pub fn new() -> Self {
        Self {
            base: NamedItem {
                name: "ExampleName".to_string(),
            },
            function_name: "testFunction".to_string(),
            number: 20,
            choice_for_you: "you".to_string(),
            text_area: String::new(),
            option: RunMode::Full,
            data: Endpoint {
                port_to_send_to: 8090,
                ip_address: "127.0.0.1".to_string(),
                message: "hello\n".to_string(),
            },
            uneditable_for_you: "blocked".to_string(),
            changes: 0,
            presses: 0,
        }
    }

    /// A fresh instance, shared the way the engine binds it.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[grid_actions]
impl JobConfig {
    #[action(name = "Press Me!")]
    fn test_function(&mut self) {
        self.presses += 1;
        tracing::info!(presses = self.presses, "button pressed");
    }

    #[action(
        name = "Disabled!",
        enabled = false,
        tooltip = "This is an explanation of what happens when you press the button"
    )]
    fn disabled_function(&self) {
        tracing::info!("disabled button pressed");
    }
}

impl FieldObserver for JobConfig {
    fn on_field_value_changed(&mut self, field: &MemberDescriptor) {
        self.changes += 1;
        tracing::info!(field = field.name, "was updated");
    }
}
