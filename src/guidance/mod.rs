//! Demonstration of a chunk before the learner may trace it: a dot trail
//! revealed one dot per interval with a hand on the newest dot, then an
//! arrowhead at the chunk end.

use core::f32::consts::FRAC_PI_6;

use crate::{
    config::GuidanceConfig,
    geometry::{angle_between, distance, normalize, step_count, Point},
};


/// Identifies one demonstration. Every start or cancel bumps the generation,
/// so tokens held by a shell go stale once the chunk moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DemoToken {
    pub chunk_index: usize,
    pub generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoProgress {
    Idle,
    Running { revealed: usize },
    Finished(DemoToken),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuidanceFrame<'a> {
    pub token: DemoToken,
    pub dots: &'a [Point],
    pub hand: Option<Point>,
    pub arrow: Option<ArrowHead>,
}

/// Dots every `spacing` units along each point pair, restarting at the first
/// point of every pair.
pub fn dot_trail(path: &[Point], spacing: f32) -> Vec<Point> {
    let mut dots = Vec::new();
    if !(spacing > 0.0) {
        return dots;
    }
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let len = distance(from, to);
        let direction = normalize(to - from);
        for step in 0..step_count(len, spacing) {
            dots.push(from.offset(direction, step as f32 * spacing));
        }
    }
    dots
}

/// Arrowhead at `tip` pointing away from `from`, wings 30° off the shaft.
pub fn arrow_head(from: Point, tip: Point, size: f32) -> ArrowHead {
    let angle = angle_between(from, tip);
    let wing = |theta: f32| Point::new(tip.x - theta.cos() * size, tip.y - theta.sin() * size);
    ArrowHead {
        tip,
        left: wing(angle - FRAC_PI_6),
        right: wing(angle + FRAC_PI_6),
    }
}

#[derive(Clone, Debug)]
struct Demonstration {
    token: DemoToken,
    dots: Vec<Point>,
    arrow: Option<ArrowHead>,
    started_ms: u64,
    revealed: usize,
    finished: bool,
}

#[derive(Clone, Debug)]
pub struct GuidanceDriver {
    config: GuidanceConfig,
    generation: u32,
    active: Option<Demonstration>,
}

impl GuidanceDriver {
    pub fn new(config: GuidanceConfig) -> Self {
        Self {
            config,
            generation: 0,
            active: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Starts demonstrating `path`, superseding any running demonstration.
    pub fn start(&mut self, now_ms: u64, chunk_index: usize, path: &[Point]) -> DemoToken {
        self.generation = self.generation.wrapping_add(1);
        let token = DemoToken {
            chunk_index,
            generation: self.generation,
        };
        let dots = dot_trail(path, self.config.dot_spacing);
        let arrow = match path {
            [.., from, tip] => Some(arrow_head(*from, *tip, self.config.arrow_size)),
            _ => None,
        };
        log::debug!(
            "guidance: start chunk={} gen={} dots={}",
            chunk_index,
            token.generation,
            dots.len()
        );
        self.active = Some(Demonstration {
            token,
            dots,
            arrow,
            started_ms: now_ms,
            revealed: 0,
            finished: false,
        });
        token
    }

    pub fn cancel(&mut self) -> Option<DemoToken> {
        let demo = self.active.take()?;
        self.generation = self.generation.wrapping_add(1);
        if !demo.finished {
            log::debug!(
                "guidance: cancel chunk={} gen={}",
                demo.token.chunk_index,
                demo.token.generation
            );
        }
        Some(demo.token)
    }

    pub fn advance(&mut self, now_ms: u64) -> DemoProgress {
        let interval = self.config.dot_interval_ms.max(1);
        let Some(demo) = self.active.as_mut() else {
            return DemoProgress::Idle;
        };
        if demo.finished {
            return DemoProgress::Idle;
        }

        let elapsed = now_ms.saturating_sub(demo.started_ms);
        let steps = usize::try_from(elapsed / interval).unwrap_or(usize::MAX);
        demo.revealed = steps.saturating_add(1).min(demo.dots.len());
        if steps >= demo.dots.len() {
            demo.finished = true;
            return DemoProgress::Finished(demo.token);
        }
        DemoProgress::Running {
            revealed: demo.revealed,
        }
    }

    pub fn is_current(&self, token: DemoToken) -> bool {
        self.active
            .as_ref()
            .map(|demo| demo.token == token)
            .unwrap_or(false)
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map(|demo| !demo.finished)
            .unwrap_or(false)
    }

    pub fn frame(&self) -> Option<GuidanceFrame<'_>> {
        let demo = self.active.as_ref()?;
        let dots = &demo.dots[..demo.revealed];
        Some(GuidanceFrame {
            token: demo.token,
            dots,
            hand: if demo.finished {
                None
            } else {
                dots.last().copied()
            },
            arrow: if demo.finished { demo.arrow } else { None },
        })
    }

    /// Time from start until the arrow is shown.
    pub fn duration_ms(&self, path: &[Point]) -> u64 {
        let dots = dot_trail(path, self.config.dot_spacing).len() as u64;
        dots.saturating_mul(self.config.dot_interval_ms.max(1))
    }
}
