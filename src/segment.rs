use crate::{
    config::{HitRegion, SegmentConfig},
    geometry::{angle_between, distance, normalize, step_count, OrientedRect, Point, Rect},
};

/// Fixed-length slice of a placed chunk plus its hit-test region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    /// Unrotated box centered on the slice midpoint: `length` wide, `width` tall.
    pub bounds: Rect,
    pub angle: f32,
    /// Distance along the chunk at which this slice starts.
    pub path_offset: f32,
    pub completed: bool,
}

impl Segment {
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    pub fn span(&self) -> f32 {
        distance(self.start, self.end)
    }

    pub fn oriented_bounds(&self) -> OrientedRect {
        OrientedRect {
            center: self.bounds.center(),
            half_length: self.bounds.width() * 0.5,
            half_width: self.bounds.height() * 0.5,
            angle: self.angle,
        }
    }

    /// Whether `point` lies inside the region grown by `tolerance` on every side.
    pub fn hit_test(&self, point: Point, tolerance: f32, region: HitRegion) -> bool {
        match region {
            HitRegion::AxisAligned => self.bounds.expanded(tolerance).contains(point),
            HitRegion::Oriented => self.oriented_bounds().contains(point, tolerance),
        }
    }
}

/// Cuts `chunk` into consecutive slices of `length` along each point pair.
/// Chunks with fewer than two points, or no length at all, give no segments.
pub fn segment_chunk(chunk: &[Point], length: f32, width: f32) -> Vec<Segment> {
    let mut segments = Vec::new();
    if chunk.len() < 2 || !(length > 0.0) {
        log::warn!(
            "segmenter: degenerate chunk points={} length={}",
            chunk.len(),
            length
        );
        return segments;
    }

    let mut walked = 0.0f32;
    for pair in chunk.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let pair_len = distance(from, to);
        if pair_len <= f32::EPSILON {
            continue;
        }
        let direction = normalize(to - from);
        let angle = angle_between(from, to);

        for step in 0..step_count(pair_len, length) {
            let cursor = step as f32 * length;
            let next = (cursor + length).min(pair_len);
            let start = from.offset(direction, cursor);
            let end = from.offset(direction, next);
            segments.push(Segment {
                start,
                end,
                bounds: Rect::centered(start.midpoint(end), length, width),
                angle,
                path_offset: walked + cursor,
                completed: false,
            });
        }
        walked += pair_len;
    }

    if segments.is_empty() {
        log::warn!(
            "segmenter: chunk of {} coincident points has no length",
            chunk.len()
        );
    }
    segments
}

pub fn segment_with(chunk: &[Point], config: &SegmentConfig) -> Vec<Segment> {
    segment_chunk(chunk, config.length, config.width)
}
