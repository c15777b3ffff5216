use std::collections::BTreeSet;

use crate::{
    config::TracerConfig,
    error::LetterError,
    geometry::Point,
    gesture::{GestureTracker, TrackerSettings},
    letter::{LetterDefinition, Placement},
    segment::segment_with,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkPhase {
    /// No letter loaded.
    #[default]
    Idle,
    Demonstrating,
    AwaitingInput,
    Tracking,
    LetterComplete,
}

/// A letter checked against the active settings with every chunk already
/// placed in render space.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedLetter {
    pub name: String,
    pub placement: Placement,
    pub chunks: Vec<Vec<Point>>,
}

impl PreparedLetter {
    /// Rejects letters with no chunks, bad bounds, or a chunk that would
    /// produce no segments once placed.
    pub fn prepare(letter: &LetterDefinition, config: &TracerConfig) -> Result<Self, LetterError> {
        let bounds = letter.check_shape().inspect_err(|err| {
            log::warn!("letter rejected: {err}");
        })?;
        let placement = Placement::from_config(bounds, &config.placement);

        let mut chunks = Vec::with_capacity(letter.chunks.len());
        for (idx, chunk) in letter.chunks.iter().enumerate() {
            let placed = placement.transform_chunk(chunk);
            if segment_with(&placed, &config.segments).is_empty() {
                let err = LetterError::DegenerateChunk {
                    name: letter.name.clone(),
                    chunk: idx,
                    points: chunk.len(),
                };
                log::warn!("letter rejected: {err}");
                return Err(err);
            }
            chunks.push(placed);
        }

        Ok(Self {
            name: letter.name.clone(),
            placement,
            chunks,
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Progress of one tracing session.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub(super) letter_index: usize,
    pub(super) chunk_index: usize,
    pub(super) completed_chunks: BTreeSet<usize>,
    pub(super) attempts: u32,
    pub(super) tracker: GestureTracker,
}

impl SessionState {
    pub(super) fn new(letter_index: usize, settings: TrackerSettings) -> Self {
        Self {
            letter_index,
            chunk_index: 0,
            completed_chunks: BTreeSet::new(),
            attempts: 0,
            tracker: GestureTracker::empty(settings),
        }
    }

    pub fn letter_index(&self) -> usize {
        self.letter_index
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn completed_chunks(&self) -> &BTreeSet<usize> {
        &self.completed_chunks
    }

    /// Evaluated attempts on the current chunk that fell short.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn hits_per_segment(&self) -> &[u32] {
        self.tracker.hits()
    }

    pub fn drawn_points(&self) -> &[Point] {
        self.tracker.drawn_points()
    }

    pub fn is_drawing(&self) -> bool {
        self.tracker.is_drawing()
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: ChunkPhase,
    pub letter_index: usize,
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub completed_chunks: Vec<usize>,
    pub completed_segments: usize,
    pub total_segments: usize,
}
