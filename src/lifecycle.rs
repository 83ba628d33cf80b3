//! Note lifecycle: attack now, release after a fixed duration.

use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::engine::{SharedEngine, SynthEngine};
use crate::note::Note;
use crate::scheduler::{Scheduler, TaskHandle};

/// Turns a play request into an attack and one deferred release.
///
/// Holds no per-note state: every call owns its own timer, so overlapping
/// notes simply produce overlapping attack/release pairs. A new note never
/// cuts off an earlier one.
pub struct NoteLifecycleController<E, S> {
    engine: SharedEngine<E>,
    scheduler: S,
}

impl<E, S> NoteLifecycleController<E, S>
where
    E: SynthEngine + 'static,
    S: Scheduler,
{
    pub fn new(engine: SharedEngine<E>, scheduler: S) -> Self {
        NoteLifecycleController { engine, scheduler }
    }

    /// Attack `note` immediately and schedule the release of the same
    /// frequency set after `duration`.
    ///
    /// The returned handle can cancel the release; nothing in this crate
    /// does so.
    pub fn play_note(&self, note: Note, duration: Duration) -> TaskHandle {
        let velocity = note.velocity();
        let frequencies = note.into_frequencies();

        debug!("attack {frequencies:?} velocity={velocity} for {duration:?}");
        self.engine
            .borrow_mut()
            .trigger_attack(&frequencies, velocity);

        let engine = Rc::clone(&self.engine);
        self.scheduler.schedule(
            duration,
            Box::new(move || {
                debug!("release {frequencies:?}");
                engine.borrow_mut().trigger_release(&frequencies);
            }),
        )
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
