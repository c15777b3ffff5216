use crate::{geometry::Point, guidance::DemoToken};

pub const MAX_EVENTS_PER_DISPATCH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionEvent {
    DemonstrationStarted { token: DemoToken },
    DemonstrationFinished { token: DemoToken },
    DemonstrationCancelled { token: DemoToken },
    GestureStarted { chunk_index: usize },
    InvalidStart { chunk_index: usize },
    OffPath { chunk_index: usize, point: Point },
    Progress {
        chunk_index: usize,
        completed: usize,
        total: usize,
    },
    ChunkEvaluated {
        chunk_index: usize,
        completion_rate: f32,
    },
    ChunkAdvanced {
        completed_chunk: usize,
        next_chunk: usize,
    },
    ChunkRetry {
        chunk_index: usize,
        completion_rate: f32,
    },
    LetterComplete { letter_index: usize },
}

impl SessionEvent {
    pub fn label(&self) -> &'static str {
        match self {
            SessionEvent::DemonstrationStarted { .. } => "demo_start",
            SessionEvent::DemonstrationFinished { .. } => "demo_finish",
            SessionEvent::DemonstrationCancelled { .. } => "demo_cancel",
            SessionEvent::GestureStarted { .. } => "gesture_start",
            SessionEvent::InvalidStart { .. } => "invalid_start",
            SessionEvent::OffPath { .. } => "off_path",
            SessionEvent::Progress { .. } => "progress",
            SessionEvent::ChunkEvaluated { .. } => "evaluated",
            SessionEvent::ChunkAdvanced { .. } => "advance",
            SessionEvent::ChunkRetry { .. } => "retry",
            SessionEvent::LetterComplete { .. } => "letter_complete",
        }
    }
}

/// Events produced by one input, in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionOutput {
    pub events: heapless::Vec<SessionEvent, MAX_EVENTS_PER_DISPATCH>,
}

impl SessionOutput {
    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn dispatch<L: TracingListener + ?Sized>(&self, listener: &mut L) {
        for event in &self.events {
            match *event {
                SessionEvent::DemonstrationStarted { token } => {
                    listener.on_demonstration_started(token)
                }
                SessionEvent::DemonstrationFinished { token } => {
                    listener.on_demonstration_finished(token)
                }
                SessionEvent::DemonstrationCancelled { token } => {
                    listener.on_demonstration_cancelled(token)
                }
                SessionEvent::GestureStarted { chunk_index } => {
                    listener.on_gesture_started(chunk_index)
                }
                SessionEvent::InvalidStart { chunk_index } => listener.on_invalid_start(chunk_index),
                SessionEvent::OffPath { chunk_index, point } => {
                    listener.on_off_path(chunk_index, point)
                }
                SessionEvent::Progress {
                    chunk_index,
                    completed,
                    total,
                } => listener.on_progress(chunk_index, completed, total),
                SessionEvent::ChunkEvaluated {
                    chunk_index,
                    completion_rate,
                } => listener.on_chunk_evaluated(chunk_index, completion_rate),
                SessionEvent::ChunkAdvanced { next_chunk, .. } => {
                    listener.on_chunk_advance(next_chunk)
                }
                SessionEvent::ChunkRetry {
                    chunk_index,
                    completion_rate,
                } => listener.on_chunk_retry(chunk_index, completion_rate),
                SessionEvent::LetterComplete { letter_index } => {
                    listener.on_letter_complete(letter_index)
                }
            }
        }
    }
}

/// Callback view of [`SessionEvent`]s for shells that drive audio and
/// animation from handlers. Every method defaults to doing nothing.
pub trait TracingListener {
    fn on_demonstration_started(&mut self, _token: DemoToken) {}
    fn on_demonstration_finished(&mut self, _token: DemoToken) {}
    fn on_demonstration_cancelled(&mut self, _token: DemoToken) {}
    fn on_gesture_started(&mut self, _chunk_index: usize) {}
    fn on_invalid_start(&mut self, _chunk_index: usize) {}
    fn on_off_path(&mut self, _chunk_index: usize, _point: Point) {}
    fn on_progress(&mut self, _chunk_index: usize, _completed: usize, _total: usize) {}
    fn on_chunk_evaluated(&mut self, _chunk_index: usize, _completion_rate: f32) {}
    fn on_chunk_advance(&mut self, _new_chunk_index: usize) {}
    fn on_chunk_retry(&mut self, _chunk_index: usize, _completion_rate: f32) {}
    fn on_letter_complete(&mut self, _letter_index: usize) {}
}

#[derive(Debug, Default)]
pub(super) struct DispatchContext {
    events: heapless::Vec<SessionEvent, MAX_EVENTS_PER_DISPATCH>,
}

impl DispatchContext {
    pub(super) fn emit(&mut self, event: SessionEvent) {
        if self.events.push(event).is_err() {
            log::warn!("session: event batch full, dropped {}", event.label());
        }
    }

    pub(super) fn finish(self) -> SessionOutput {
        SessionOutput {
            events: self.events,
        }
    }
}
