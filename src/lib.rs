//! Letter tracing tutor core: letters are split into chunks, each chunk into
//! short hit-testable segments, and a session walks the learner through the
//! chunks one gesture at a time.
//!
//! The crate is input-agnostic. Shells feed pointer samples and clock ticks
//! into [`TracingSession`] and render from the events it returns.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod guidance;
pub mod letter;
pub mod segment;
pub mod session;

pub use config::{HitRegion, TracerConfig};
pub use error::{ConfigError, LetterError};
pub use geometry::Point;
pub use gesture::{GestureSignal, GestureTracker, SegmentState, TrackerSettings};
pub use guidance::{DemoToken, GuidanceFrame};
pub use letter::{Chunk, LetterBank, LetterDefinition};
pub use segment::Segment;
pub use session::{ChunkPhase, SessionEvent, SessionOutput, TracingListener, TracingSession};
