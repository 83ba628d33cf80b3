//! Parameter patching: single-field updates against whole-group setters.

use log::debug;
use serde_json::Value;

use crate::engine::{SharedEngine, SynthEngine};
use crate::error::ParamError;

pub const ENVELOPE: &str = "envelope";

/// Applies one field change to a parameter group.
///
/// The engine only accepts whole groups, so every update reads the group's
/// current value, overwrites one field and writes the full group back.
/// Nothing is cached between calls.
pub struct ParameterPatcher<E> {
    engine: SharedEngine<E>,
}

impl<E: SynthEngine> ParameterPatcher<E> {
    pub fn new(engine: SharedEngine<E>) -> Self {
        ParameterPatcher { engine }
    }

    /// Set `group.field = value`, leaving sibling fields untouched.
    /// The value is not range-checked.
    pub fn update_group_field(&self, group: &str, field: &str, value: f64) -> Result<(), ParamError> {
        let mut engine = self.engine.borrow_mut();
        let mut snapshot = engine.get(group).ok_or_else(|| ParamError::UnknownPath {
            path: group.to_string(),
        })?;
        let fields = snapshot.as_object_mut().ok_or_else(|| ParamError::NotAGroup {
            group: group.to_string(),
        })?;
        fields.insert(field.to_string(), Value::from(value));

        debug!("patch {group}.{field} = {value}");
        engine.set(group, snapshot)
    }

    /// Envelope attack time in seconds.
    pub fn set_attack(&self, value: f64) -> Result<(), ParamError> {
        self.update_group_field(ENVELOPE, "attack", value)
    }

    /// Envelope release time in seconds.
    pub fn set_release(&self, value: f64) -> Result<(), ParamError> {
        self.update_group_field(ENVELOPE, "release", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::shared;
    use crate::fake::RecordingEngine;
    use serde_json::json;

    #[test]
    fn merge_keeps_sibling_fields() {
        let engine = shared(RecordingEngine::with_params(json!({ "group": { "a": 1, "b": 2 } })));
        let patcher = ParameterPatcher::new(engine.clone());

        patcher.update_group_field("group", "a", 5.0).unwrap();
        assert_eq!(engine.borrow().params["group"], json!({ "a": 5.0, "b": 2 }));
    }

    #[test]
    fn same_patch_twice_is_idempotent() {
        let engine = shared(RecordingEngine::new());
        let patcher = ParameterPatcher::new(engine.clone());

        patcher.update_group_field("envelope", "release", 0.3).unwrap();
        let once = engine.borrow().params.clone();
        patcher.update_group_field("envelope", "release", 0.3).unwrap();
        assert_eq!(engine.borrow().params, once);
    }

    #[test]
    fn attack_and_release_shortcuts() {
        let engine = shared(RecordingEngine::new());
        let patcher = ParameterPatcher::new(engine.clone());

        patcher.set_attack(0.25).unwrap();
        patcher.set_release(2.5).unwrap();

        let engine = engine.borrow();
        let params = &engine.params;
        assert_eq!(
            params["envelope"],
            json!({ "attack": 0.25, "decay": 0.1, "sustain": 0.3, "release": 2.5 })
        );
        assert_eq!(params["oscillator"]["type"], json!("custom"));
    }

    #[test]
    fn field_may_be_new_to_the_group() {
        let engine = shared(RecordingEngine::with_params(json!({ "filter": {} })));
        let patcher = ParameterPatcher::new(engine.clone());

        patcher.update_group_field("filter", "q", 4.0).unwrap();
        assert_eq!(engine.borrow().params["filter"], json!({ "q": 4.0 }));
    }

    #[test]
    fn out_of_range_values_are_forwarded() {
        let engine = shared(RecordingEngine::new());
        let patcher = ParameterPatcher::new(engine.clone());

        patcher.set_attack(-3.0).unwrap();
        assert_eq!(engine.borrow().params["envelope"]["attack"], json!(-3.0));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let engine = shared(RecordingEngine::new());
        let patcher = ParameterPatcher::new(engine);
        assert_eq!(
            patcher.update_group_field("filter", "q", 1.0),
            Err(ParamError::UnknownPath { path: "filter".to_string() })
        );
    }

    #[test]
    fn leaf_is_not_a_group() {
        let engine = shared(RecordingEngine::new());
        let patcher = ParameterPatcher::new(engine.clone());
        assert_eq!(
            patcher.update_group_field("oscillator.type", "x", 1.0),
            Err(ParamError::NotAGroup { group: "oscillator.type".to_string() })
        );
        assert_eq!(engine.borrow().params["oscillator"]["type"], json!("custom"));
    }
}
