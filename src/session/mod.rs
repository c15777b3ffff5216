//! Chunk-by-chunk tracing session: demonstration, gesture tracking,
//! evaluation, advance or retry.

mod events;
mod machine;
mod state;
#[cfg(test)]
mod tests;

use statig::blocking::IntoStateMachineExt as _;

pub use events::{SessionEvent, SessionOutput, TracingListener, MAX_EVENTS_PER_DISPATCH};
pub use state::{ChunkPhase, PreparedLetter, SessionSnapshot, SessionState};

use crate::{
    config::TracerConfig,
    error::LetterError,
    geometry::{offset_path, Point},
    gesture::SegmentState,
    guidance::{DemoToken, GuidanceDriver, GuidanceFrame},
    letter::LetterDefinition,
    segment::Segment,
};
use events::DispatchContext;
use machine::{ChunkMachine, SessionInput};

pub struct TracingSession {
    config: TracerConfig,
    letters_loaded: usize,
    machine: statig::blocking::StateMachine<ChunkMachine>,
}

impl Default for TracingSession {
    fn default() -> Self {
        Self::new(TracerConfig::default())
    }
}

impl TracingSession {
    pub fn new(config: TracerConfig) -> Self {
        let guidance = GuidanceDriver::new(config.guidance);
        Self {
            config,
            letters_loaded: 0,
            machine: ChunkMachine::new(config, None, 0, guidance).state_machine(),
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Replaces the active letter and restarts at chunk 0. A letter that
    /// cannot be traced is rejected and the current session is left alone.
    pub fn load_letter(
        &mut self,
        now_ms: u64,
        letter: LetterDefinition,
    ) -> Result<SessionOutput, LetterError> {
        let prepared = PreparedLetter::prepare(&letter, &self.config)?;
        log::info!(
            "session: load letter `{}` chunks={}",
            prepared.name,
            prepared.chunk_count()
        );

        // Carry the guidance generation over so tokens from the previous
        // letter stay stale.
        let mut guidance = self.machine.inner().guidance.clone();
        let was_running = guidance.is_running();
        let cancelled = guidance.cancel().filter(|_| was_running);

        let letter_index = self.letters_loaded;
        self.letters_loaded += 1;
        self.machine =
            ChunkMachine::new(self.config, Some(prepared), letter_index, guidance).state_machine();

        let mut context = DispatchContext::default();
        if let Some(token) = cancelled {
            context.emit(SessionEvent::DemonstrationCancelled { token });
        }
        self.machine
            .handle_with_context(&SessionInput::Start { now_ms }, &mut context);
        Ok(context.finish())
    }

    pub fn pointer_down(&mut self, now_ms: u64, point: Point) -> SessionOutput {
        self.dispatch(SessionInput::PointerDown { now_ms, point })
    }

    pub fn pointer_move(&mut self, now_ms: u64, point: Point) -> SessionOutput {
        self.dispatch(SessionInput::PointerMove { now_ms, point })
    }

    pub fn pointer_up(&mut self, now_ms: u64) -> SessionOutput {
        self.dispatch(SessionInput::PointerUp { now_ms })
    }

    /// Advances the demonstration clock and the inactivity timer.
    pub fn tick(&mut self, now_ms: u64) -> SessionOutput {
        self.dispatch(SessionInput::Tick { now_ms })
    }

    pub fn skip_demonstration(&mut self, now_ms: u64) -> SessionOutput {
        self.dispatch(SessionInput::SkipDemonstration { now_ms })
    }

    fn dispatch(&mut self, input: SessionInput) -> SessionOutput {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&input, &mut context);
        context.finish()
    }

    pub fn phase(&self) -> ChunkPhase {
        self.machine.inner().phase
    }

    pub fn state(&self) -> &SessionState {
        &self.machine.inner().state
    }

    pub fn letter(&self) -> Option<&PreparedLetter> {
        self.machine.inner().letter.as_ref()
    }

    pub fn active_segments(&self) -> &[Segment] {
        self.state().tracker().segments()
    }

    pub fn segment_state(&self, index: usize) -> Option<SegmentState> {
        self.state().tracker().segment_state(index)
    }

    /// Placed points of the chunk being traced.
    pub fn active_chunk(&self) -> Option<&[Point]> {
        match self.phase() {
            ChunkPhase::Idle | ChunkPhase::LetterComplete => None,
            _ => self.machine.inner().active_path(),
        }
    }

    /// Guide rails `offset` units either side of the active chunk, outer first.
    pub fn boundary_rails(&self, offset: f32) -> Option<(Vec<Point>, Vec<Point>)> {
        let path = self.active_chunk()?;
        Some((offset_path(path, offset), offset_path(path, -offset)))
    }

    pub fn guidance_frame(&self) -> Option<GuidanceFrame<'_>> {
        self.machine.inner().guidance.frame()
    }

    pub fn is_current(&self, token: DemoToken) -> bool {
        self.machine.inner().guidance.is_current(token)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let machine = self.machine.inner();
        let state = &machine.state;
        SessionSnapshot {
            phase: machine.phase,
            letter_index: state.letter_index(),
            chunk_index: state.chunk_index(),
            chunk_count: machine
                .letter
                .as_ref()
                .map(PreparedLetter::chunk_count)
                .unwrap_or(0),
            completed_chunks: state.completed_chunks().iter().copied().collect(),
            completed_segments: state.tracker().completed_count(),
            total_segments: state.tracker().segments().len(),
        }
    }
}
