//! Instrument: routes UI events to the note controller, the knob registry
//! and the parameter patcher, and sends knob updates back to the UI.
//!
//! Events and messages travel as `{ "type": "...", "payload": ... }`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::InstrumentConfig;
use crate::controls::{ChangeHandler, ControlBindingRegistry, DialConfig, DialHost, KnobModel};
use crate::dsp::PolySynth;
use crate::engine::{SharedEngine, SynthEngine};
use crate::error::{ControlError, InstrumentError};
use crate::lifecycle::NoteLifecycleController;
use crate::note::Note;
use crate::patcher::ParameterPatcher;
use crate::scheduler::{Scheduler, VirtualClock};

/// Events produced by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum UiEvent {
    PlayNote(Note),
    SetWaveform { waveform: String },
    InitKnob(KnobModel),
    /// Move a dial from outside, e.g. when the UI model changes.
    SetKnob { id: String, value: f64 },
}

/// Messages sent back to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum UiMessage {
    /// A user moved a knob; the value is floored.
    KnobUpdated { id: String, value: i64 },
    /// Render a dial on element `id`.
    MountDial { id: String, dial: DialConfig },
    /// Show `value` on dial `id` without reporting a change.
    SetDialValue { id: String, value: f64 },
}

/// Outgoing channel to the UI framework.
pub trait UiPort {
    fn send(&self, message: UiMessage);
}

/// Collects outgoing messages until the host drains them.
///
/// Doubles as the dial host: mounting and moving dials become messages for
/// the page to carry out, so a missing element is the page's concern.
#[derive(Debug, Clone, Default)]
pub struct MessageQueue {
    inner: Rc<RefCell<Vec<UiMessage>>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<UiMessage> {
        std::mem::take(&mut *self.inner.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl UiPort for MessageQueue {
    fn send(&self, message: UiMessage) {
        self.inner.borrow_mut().push(message);
    }
}

impl DialHost for MessageQueue {
    fn mount_dial(&mut self, id: &str, dial: &DialConfig) -> Result<(), ControlError> {
        self.send(UiMessage::MountDial {
            id: id.to_string(),
            dial: *dial,
        });
        Ok(())
    }

    fn set_dial_value(&mut self, id: &str, value: f64) -> Result<(), ControlError> {
        self.send(UiMessage::SetDialValue {
            id: id.to_string(),
            value,
        });
        Ok(())
    }
}

/// Ties the note clock and the knob registry to a shared engine.
pub struct Instrument<E, S, H> {
    config: InstrumentConfig,
    engine: SharedEngine<E>,
    notes: NoteLifecycleController<E, S>,
    controls: ControlBindingRegistry<H>,
    patcher: Rc<ParameterPatcher<E>>,
    port: Rc<dyn UiPort>,
}

impl<E, S, H> Instrument<E, S, H>
where
    E: SynthEngine + 'static,
    S: Scheduler,
    H: DialHost,
{
    pub fn new(
        config: InstrumentConfig,
        engine: SharedEngine<E>,
        scheduler: S,
        host: H,
        port: Rc<dyn UiPort>,
    ) -> Self {
        let controls =
            ControlBindingRegistry::with_dial_size(host, config.dial_width, config.dial_height)
                .with_knob_step(config.knob_step);
        Instrument {
            notes: NoteLifecycleController::new(Rc::clone(&engine), scheduler),
            patcher: Rc::new(ParameterPatcher::new(Rc::clone(&engine))),
            engine,
            controls,
            config,
            port,
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Result<(), InstrumentError> {
        match event {
            UiEvent::PlayNote(note) => {
                self.notes.play_note(note, self.config.note_duration());
            }
            UiEvent::SetWaveform { waveform } => {
                debug!("waveform -> {waveform}");
                self.engine
                    .borrow_mut()
                    .set("oscillator.type", Value::String(waveform))?;
            }
            UiEvent::InitKnob(model) => {
                let handler = self.knob_handler();
                self.controls.init_from_model(&model, handler)?;
            }
            UiEvent::SetKnob { id, value } => {
                self.controls.set_value(&id, value)?;
            }
        }
        Ok(())
    }

    /// Decode a JSON event and handle it.
    pub fn handle_json(&mut self, json: &str) -> Result<(), InstrumentError> {
        let event: UiEvent = serde_json::from_str(json)?;
        self.handle_event(event)
    }

    /// Handle an event, logging and dropping any failure. The UI expects
    /// no error replies; a bad event just has no effect.
    pub fn dispatch(&mut self, event: UiEvent) {
        if let Err(e) = self.handle_event(event) {
            warn!("ignored UI event: {e}");
        }
    }

    /// A user moved dial `id`.
    pub fn dial_changed(&self, id: &str, value: f64) -> Result<(), InstrumentError> {
        self.controls.dispatch_change(id, value)?;
        Ok(())
    }

    pub fn engine(&self) -> &SharedEngine<E> {
        &self.engine
    }

    pub fn controls(&self) -> &ControlBindingRegistry<H> {
        &self.controls
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    /// The handler shared by every knob: patch the bound parameter, if
    /// any, then echo the floored value to the UI.
    fn knob_handler(&self) -> ChangeHandler {
        let port = Rc::clone(&self.port);
        let patcher = Rc::clone(&self.patcher);
        let bindings = self.config.bindings.clone();
        Rc::new(move |id: &str, value: f64| {
            if let Some(binding) = bindings.get(id) {
                if let Err(e) = patcher.update_group_field(&binding.group, &binding.field, value) {
                    warn!("knob '{id}' could not update {}.{}: {e}", binding.group, binding.field);
                }
            }
            port.send(UiMessage::KnobUpdated {
                id: id.to_string(),
                value: value.floor() as i64,
            });
        })
    }
}

impl<H: DialHost> Instrument<PolySynth, VirtualClock, H> {
    /// Render one block, first moving the note clock forward by the
    /// block's length so releases land on block boundaries.
    pub fn render(&mut self, out: &mut [f32]) {
        let sample_rate = self.engine.borrow().sample_rate();
        match Duration::try_from_secs_f64(out.len() as f64 / sample_rate) {
            Ok(elapsed) => self.notes.scheduler().advance(elapsed),
            Err(e) => warn!("note clock held at sample rate {sample_rate}: {e}"),
        }
        self.engine.borrow_mut().render(out);
    }
}
