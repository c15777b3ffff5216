use statig::prelude::*;

use super::events::{DispatchContext, SessionEvent};
use super::state::{ChunkPhase, PreparedLetter, SessionState};
use crate::{
    config::TracerConfig,
    geometry::Point,
    gesture::{GestureSignal, TrackerSettings},
    guidance::{DemoProgress, GuidanceDriver},
    segment::segment_with,
};

#[derive(Clone, Copy, Debug)]
pub(super) enum SessionInput {
    Start { now_ms: u64 },
    PointerDown { now_ms: u64, point: Point },
    PointerMove { now_ms: u64, point: Point },
    PointerUp { now_ms: u64 },
    Tick { now_ms: u64 },
    SkipDemonstration { now_ms: u64 },
}

pub(super) struct ChunkMachine {
    pub(super) config: TracerConfig,
    pub(super) letter: Option<PreparedLetter>,
    pub(super) state: SessionState,
    pub(super) guidance: GuidanceDriver,
    pub(super) phase: ChunkPhase,
    last_activity_ms: u64,
}

impl ChunkMachine {
    pub(super) fn new(
        config: TracerConfig,
        letter: Option<PreparedLetter>,
        letter_index: usize,
        guidance: GuidanceDriver,
    ) -> Self {
        Self {
            config,
            letter,
            state: SessionState::new(letter_index, TrackerSettings::from_config(&config)),
            guidance,
            phase: ChunkPhase::Idle,
            last_activity_ms: 0,
        }
    }

    pub(super) fn active_path(&self) -> Option<&[Point]> {
        let letter = self.letter.as_ref()?;
        letter
            .chunks
            .get(self.state.chunk_index)
            .map(|chunk| chunk.as_slice())
    }

    /// Fresh segments for the current chunk, then the demonstration if enabled.
    fn enter_chunk(&mut self, now_ms: u64, context: &mut DispatchContext) -> Outcome<State> {
        self.end_demonstration(context);
        let chunk_index = self.state.chunk_index;
        let Some(path) = self.active_path().map(|path| path.to_vec()) else {
            self.phase = ChunkPhase::Idle;
            return Transition(State::idle());
        };

        self.state
            .tracker
            .replace_segments(segment_with(&path, &self.config.segments));
        self.state.attempts = 0;
        self.last_activity_ms = now_ms;
        log::debug!(
            "session: enter chunk={} segments={}",
            chunk_index,
            self.state.tracker.segments().len()
        );

        if self.guidance.enabled() {
            let token = self.guidance.start(now_ms, chunk_index, &path);
            context.emit(SessionEvent::DemonstrationStarted { token });
            self.phase = ChunkPhase::Demonstrating;
            Transition(State::demonstrating())
        } else {
            self.phase = ChunkPhase::AwaitingInput;
            Transition(State::awaiting_input())
        }
    }

    fn begin_gesture(
        &mut self,
        now_ms: u64,
        point: Point,
        context: &mut DispatchContext,
    ) -> Outcome<State> {
        self.last_activity_ms = now_ms;
        let chunk_index = self.state.chunk_index;
        match self.state.tracker.begin(point) {
            GestureSignal::Started => {
                context.emit(SessionEvent::GestureStarted { chunk_index });
                self.phase = ChunkPhase::Tracking;
                Transition(State::tracking())
            }
            _ => {
                context.emit(SessionEvent::InvalidStart { chunk_index });
                self.phase = ChunkPhase::AwaitingInput;
                Transition(State::awaiting_input())
            }
        }
    }

    fn track(&mut self, now_ms: u64, point: Point, context: &mut DispatchContext) -> Outcome<State> {
        let chunk_index = self.state.chunk_index;
        match self.state.tracker.update(point) {
            GestureSignal::Tracked { newly_completed } => {
                self.last_activity_ms = now_ms;
                if newly_completed > 0 {
                    context.emit(SessionEvent::Progress {
                        chunk_index,
                        completed: self.state.tracker.completed_count(),
                        total: self.state.tracker.segments().len(),
                    });
                }
                Handled
            }
            GestureSignal::OffPath => {
                self.last_activity_ms = now_ms;
                context.emit(SessionEvent::OffPath { chunk_index, point });
                self.phase = ChunkPhase::AwaitingInput;
                Transition(State::awaiting_input())
            }
            _ => Handled,
        }
    }

    fn evaluate(&mut self, now_ms: u64, context: &mut DispatchContext) -> Outcome<State> {
        self.last_activity_ms = now_ms;
        let chunk_index = self.state.chunk_index;
        let Some(completion_rate) = self.state.tracker.end() else {
            self.phase = ChunkPhase::AwaitingInput;
            return Transition(State::awaiting_input());
        };
        context.emit(SessionEvent::ChunkEvaluated {
            chunk_index,
            completion_rate,
        });

        if completion_rate < self.config.tracking.success_threshold {
            self.state.attempts = self.state.attempts.saturating_add(1);
            self.state.tracker.reset_progress();
            log::debug!(
                "session: retry chunk={} rate={:.1} attempts={}",
                chunk_index,
                completion_rate,
                self.state.attempts
            );
            context.emit(SessionEvent::ChunkRetry {
                chunk_index,
                completion_rate,
            });
            self.phase = ChunkPhase::AwaitingInput;
            return Transition(State::awaiting_input());
        }

        self.state.completed_chunks.insert(chunk_index);
        self.state.chunk_index = chunk_index + 1;
        log::info!(
            "session: chunk {} done rate={:.1}",
            chunk_index,
            completion_rate
        );
        context.emit(SessionEvent::ChunkAdvanced {
            completed_chunk: chunk_index,
            next_chunk: self.state.chunk_index,
        });

        let chunk_count = self
            .letter
            .as_ref()
            .map(PreparedLetter::chunk_count)
            .unwrap_or(0);
        if self.state.chunk_index >= chunk_count {
            self.guidance.cancel();
            self.state.tracker.replace_segments(Vec::new());
            let letter_index = self.state.letter_index;
            log::info!("session: letter {} complete", letter_index);
            context.emit(SessionEvent::LetterComplete { letter_index });
            self.phase = ChunkPhase::LetterComplete;
            return Transition(State::letter_complete());
        }
        self.enter_chunk(now_ms, context)
    }

    fn inactivity_elapsed(&self, now_ms: u64) -> bool {
        let limit = self.config.guidance.inactivity_ms;
        self.guidance.enabled()
            && limit > 0
            && now_ms.saturating_sub(self.last_activity_ms) >= limit
    }

    fn end_demonstration(&mut self, context: &mut DispatchContext) {
        if self.guidance.is_running() {
            if let Some(token) = self.guidance.cancel() {
                context.emit(SessionEvent::DemonstrationCancelled { token });
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl ChunkMachine {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &SessionInput) -> Outcome<State> {
        match event {
            SessionInput::Start { now_ms } if self.letter.is_some() => {
                self.enter_chunk(*now_ms, context)
            }
            _ => Handled,
        }
    }

    #[state]
    fn demonstrating(
        &mut self,
        context: &mut DispatchContext,
        event: &SessionInput,
    ) -> Outcome<State> {
        match event {
            SessionInput::Tick { now_ms } => match self.guidance.advance(*now_ms) {
                DemoProgress::Finished(token) => {
                    context.emit(SessionEvent::DemonstrationFinished { token });
                    self.last_activity_ms = *now_ms;
                    self.phase = ChunkPhase::AwaitingInput;
                    Transition(State::awaiting_input())
                }
                DemoProgress::Running { .. } => Handled,
                DemoProgress::Idle => {
                    // Nothing left to show; do not hold input back.
                    self.last_activity_ms = *now_ms;
                    self.phase = ChunkPhase::AwaitingInput;
                    Transition(State::awaiting_input())
                }
            },
            SessionInput::SkipDemonstration { now_ms } => {
                self.end_demonstration(context);
                self.last_activity_ms = *now_ms;
                self.phase = ChunkPhase::AwaitingInput;
                Transition(State::awaiting_input())
            }
            SessionInput::PointerDown { now_ms, point } if self.config.guidance.interruptible => {
                self.end_demonstration(context);
                self.begin_gesture(*now_ms, *point, context)
            }
            _ => Handled,
        }
    }

    #[state]
    fn awaiting_input(
        &mut self,
        context: &mut DispatchContext,
        event: &SessionInput,
    ) -> Outcome<State> {
        match event {
            SessionInput::PointerDown { now_ms, point } => {
                self.begin_gesture(*now_ms, *point, context)
            }
            SessionInput::Tick { now_ms } if self.inactivity_elapsed(*now_ms) => {
                let Some(path) = self.active_path().map(|path| path.to_vec()) else {
                    return Handled;
                };
                let token = self
                    .guidance
                    .start(*now_ms, self.state.chunk_index, &path);
                context.emit(SessionEvent::DemonstrationStarted { token });
                self.phase = ChunkPhase::Demonstrating;
                Transition(State::demonstrating())
            }
            _ => Handled,
        }
    }

    #[state]
    fn tracking(&mut self, context: &mut DispatchContext, event: &SessionInput) -> Outcome<State> {
        match event {
            SessionInput::PointerMove { now_ms, point } => self.track(*now_ms, *point, context),
            SessionInput::PointerUp { now_ms } => self.evaluate(*now_ms, context),
            // A second press without a release restarts the gesture.
            SessionInput::PointerDown { now_ms, point } => {
                self.begin_gesture(*now_ms, *point, context)
            }
            _ => Handled,
        }
    }

    #[state]
    fn letter_complete(
        &mut self,
        context: &mut DispatchContext,
        event: &SessionInput,
    ) -> Outcome<State> {
        let _ = (context, event);
        Handled
    }
}
