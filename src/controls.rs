//! Knob bindings: one dial per declared control, one shared change handler.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// Default step for knobs declared through a [`KnobModel`].
pub const KNOB_STEP: f64 = 0.01;

/// Default dial size in pixels.
pub const DIAL_WIDTH: u32 = 70;
pub const DIAL_HEIGHT: u32 = 80;

/// A control declared by the UI. Bounds are fixed for the knob's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnobModel {
    pub id: String,
    pub min_value: f64,
    pub max_value: f64,
}

/// Settings handed to the dial widget when it is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub width: u32,
    pub height: u32,
}

/// The dial widget library.
pub trait DialHost {
    /// Render a dial on the UI element named `id`.
    fn mount_dial(&mut self, id: &str, dial: &DialConfig) -> Result<(), ControlError>;

    /// Move a dial's displayed value. Must not be reported back as a change.
    fn set_dial_value(&mut self, id: &str, value: f64) -> Result<(), ControlError>;
}

/// Receives `(control id, new value)` for every user change.
pub type ChangeHandler = Rc<dyn Fn(&str, f64)>;

struct Binding {
    control_id: String,
    dial: DialConfig,
    handler: ChangeHandler,
}

/// Dispatch table from control id to its change handler.
///
/// The id is stored next to the handler at registration, so one generic
/// handler can serve any number of dials and still learn which one moved.
pub struct ControlBindingRegistry<H> {
    host: H,
    width: u32,
    height: u32,
    knob_step: f64,
    bindings: HashMap<String, Binding>,
}

impl<H: DialHost> ControlBindingRegistry<H> {
    pub fn new(host: H) -> Self {
        Self::with_dial_size(host, DIAL_WIDTH, DIAL_HEIGHT)
    }

    pub fn with_dial_size(host: H, width: u32, height: u32) -> Self {
        ControlBindingRegistry {
            host,
            width,
            height,
            knob_step: KNOB_STEP,
            bindings: HashMap::new(),
        }
    }

    /// Use `step` for dials created by [`init_from_model`](Self::init_from_model).
    pub fn with_knob_step(mut self, step: f64) -> Self {
        self.knob_step = step;
        self
    }

    /// Mount a dial on element `id` and bind `on_change` to it.
    ///
    /// Registering an id twice re-mounts the dial and replaces its handler.
    pub fn create_control(
        &mut self,
        id: &str,
        min: f64,
        max: f64,
        step: f64,
        on_change: ChangeHandler,
    ) -> Result<(), ControlError> {
        let dial = DialConfig {
            min,
            max,
            step,
            width: self.width,
            height: self.height,
        };
        self.host.mount_dial(id, &dial)?;

        let binding = Binding {
            control_id: id.to_string(),
            dial,
            handler: on_change,
        };
        if self.bindings.insert(id.to_string(), binding).is_some() {
            debug!("control '{id}' re-bound");
        } else {
            debug!("control '{id}' bound [{min}, {max}] step {step}");
        }
        Ok(())
    }

    /// [`create_control`](Self::create_control) with the registry's knob step.
    pub fn init_from_model(
        &mut self,
        model: &KnobModel,
        on_change: ChangeHandler,
    ) -> Result<(), ControlError> {
        self.create_control(
            &model.id,
            model.min_value,
            model.max_value,
            self.knob_step,
            on_change,
        )
    }

    /// Report a user interaction on dial `id`. Called by the widget layer.
    pub fn dispatch_change(&self, id: &str, value: f64) -> Result<(), ControlError> {
        let binding = self
            .bindings
            .get(id)
            .ok_or_else(|| ControlError::UnknownControl { id: id.to_string() })?;
        (binding.handler)(&binding.control_id, value);
        Ok(())
    }

    /// Set a dial's displayed value from outside. The change handler is
    /// not invoked.
    pub fn set_value(&mut self, id: &str, value: f64) -> Result<(), ControlError> {
        if !self.bindings.contains_key(id) {
            return Err(ControlError::UnknownControl { id: id.to_string() });
        }
        self.host.set_dial_value(id, value)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    pub fn dial(&self, id: &str) -> Option<&DialConfig> {
        self.bindings.get(id).map(|b| &b.dial)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
