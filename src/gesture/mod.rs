use crate::{
    config::{HitRegion, TracerConfig},
    geometry::Point,
    segment::Segment,
};


#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerSettings {
    pub tolerance: f32,
    pub min_hits_per_segment: u32,
    pub hit_region: HitRegion,
}

impl TrackerSettings {
    pub fn from_config(config: &TracerConfig) -> Self {
        Self {
            tolerance: config.tracking.tolerance,
            min_hits_per_segment: config.tracking.min_hits_per_segment.max(1),
            hit_region: config.segments.hit_region,
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from_config(&TracerConfig::default())
    }
}

/// Outcome of feeding one pointer sample to the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureSignal {
    Started,
    /// Pointer went down outside the first segment; progress was cleared.
    InvalidStart,
    Tracked {
        newly_completed: u16,
    },
    /// Sample fell outside every segment; progress was cleared.
    OffPath,
    /// No gesture in progress.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentState {
    Pending,
    Active,
    Completed,
}

/// Hit counting for the segments of the active chunk.
#[derive(Clone, Debug)]
pub struct GestureTracker {
    settings: TrackerSettings,
    segments: Vec<Segment>,
    hits: Vec<u32>,
    drawn_points: Vec<Point>,
    drawing: bool,
}

impl GestureTracker {
    pub fn new(settings: TrackerSettings, segments: Vec<Segment>) -> Self {
        let hits = vec![0; segments.len()];
        Self {
            settings,
            segments,
            hits,
            drawn_points: Vec::new(),
            drawing: false,
        }
    }

    pub fn empty(settings: TrackerSettings) -> Self {
        Self::new(settings, Vec::new())
    }

    /// Installs a fresh segment set, dropping all progress on the old one.
    pub fn replace_segments(&mut self, segments: Vec<Segment>) {
        self.hits = vec![0; segments.len()];
        self.segments = segments;
        self.drawn_points.clear();
        self.drawing = false;
    }

    pub fn begin(&mut self, point: Point) -> GestureSignal {
        let valid = self
            .segments
            .first()
            .map(|first| {
                first.hit_test(point, self.settings.tolerance, self.settings.hit_region)
            })
            .unwrap_or(false);
        if !valid {
            log::debug!("tracker: invalid start x={} y={}", point.x, point.y);
            self.reset_progress();
            return GestureSignal::InvalidStart;
        }

        self.drawn_points.clear();
        self.drawn_points.push(point);
        self.drawing = true;
        GestureSignal::Started
    }

    pub fn update(&mut self, point: Point) -> GestureSignal {
        if !self.drawing {
            return GestureSignal::Ignored;
        }

        let mut inside_any = false;
        let mut newly_completed = 0u16;
        for (segment, hits) in self.segments.iter_mut().zip(self.hits.iter_mut()) {
            if !segment.hit_test(point, self.settings.tolerance, self.settings.hit_region) {
                continue;
            }
            inside_any = true;
            if segment.completed {
                continue;
            }
            *hits = hits.saturating_add(1);
            if *hits >= self.settings.min_hits_per_segment {
                segment.completed = true;
                newly_completed = newly_completed.saturating_add(1);
            }
        }

        if !inside_any {
            log::debug!("tracker: off path x={} y={}", point.x, point.y);
            self.reset_progress();
            return GestureSignal::OffPath;
        }

        self.drawn_points.push(point);
        GestureSignal::Tracked { newly_completed }
    }

    /// Closes the gesture and returns the completion rate, or `None` when no
    /// gesture was in progress.
    pub fn end(&mut self) -> Option<f32> {
        if !self.drawing {
            return None;
        }
        self.drawing = false;
        Some(self.completion_rate())
    }

    /// Completed segments as a percentage of all segments. An empty set is
    /// vacuously complete.
    pub fn completion_rate(&self) -> f32 {
        if self.segments.is_empty() {
            return 100.0;
        }
        self.completed_count() as f32 * 100.0 / self.segments.len() as f32
    }

    /// Clears hits, completed flags and the drawn trail; keeps the segments.
    pub fn reset_progress(&mut self) {
        for segment in &mut self.segments {
            segment.completed = false;
        }
        self.hits.iter_mut().for_each(|hits| *hits = 0);
        self.drawn_points.clear();
        self.drawing = false;
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn hits(&self) -> &[u32] {
        &self.hits
    }

    pub fn drawn_points(&self) -> &[Point] {
        &self.drawn_points
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn completed_count(&self) -> usize {
        self.segments.iter().filter(|s| s.completed).count()
    }

    pub fn segment_state(&self, index: usize) -> Option<SegmentState> {
        let segment = self.segments.get(index)?;
        let state = if segment.completed {
            SegmentState::Completed
        } else if self.hits[index] > 0 {
            SegmentState::Active
        } else {
            SegmentState::Pending
        };
        Some(state)
    }
}
