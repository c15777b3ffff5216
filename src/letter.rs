use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{config::PlacementConfig, error::LetterError, geometry::Point};

/// One stroke of a letter, in design coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chunk {
    pub points: Vec<Point>,
}

impl Chunk {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LetterDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "paths")]
    pub chunks: Vec<Chunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
}

impl LetterDefinition {
    pub fn new(name: impl Into<String>, chunks: Vec<Chunk>) -> Self {
        Self {
            name: name.into(),
            chunks,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Declared bounding box, or the box around every chunk point.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds.or_else(|| {
            BoundingBox::of_points(self.chunks.iter().flat_map(|chunk| chunk.points.iter()))
        })
    }

    /// Structural checks that do not depend on segmentation settings.
    pub fn check_shape(&self) -> Result<BoundingBox, LetterError> {
        if self.chunks.is_empty() {
            return Err(LetterError::NoChunks {
                name: self.name.clone(),
            });
        }
        match self.bounds() {
            Some(bounds) if bounds.is_valid() => Ok(bounds),
            _ => Err(LetterError::InvalidBounds {
                name: self.name.clone(),
            }),
        }
    }
}

/// Maps design coordinates into render space: `p * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Placement {
    /// Scales by `scale` and centers `bounds` on the canvas.
    pub fn centered(bounds: BoundingBox, canvas_width: f32, canvas_height: f32, scale: f32) -> Self {
        let center = bounds.center();
        Self {
            scale,
            offset_x: canvas_width * 0.5 - center.x * scale,
            offset_y: canvas_height * 0.5 - center.y * scale,
        }
    }

    pub fn from_config(bounds: BoundingBox, config: &PlacementConfig) -> Self {
        Self::centered(
            bounds,
            config.canvas_width,
            config.canvas_height,
            config.scale,
        )
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }

    pub fn transform_chunk(&self, chunk: &Chunk) -> Vec<Point> {
        chunk.points.iter().map(|&p| self.apply(p)).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LetterBank {
    pub letters: Vec<LetterDefinition>,
}

impl LetterBank {
    pub fn from_json_str(raw: &str) -> Result<Self, LetterError> {
        let bank: LetterBank = serde_json::from_str(raw)?;
        if bank.letters.is_empty() {
            return Err(LetterError::EmptyBank);
        }
        for letter in &bank.letters {
            letter.check_shape()?;
        }
        Ok(bank)
    }

    pub fn load(path: &Path) -> Result<Self, LetterError> {
        let raw = fs::read_to_string(path).map_err(|source| LetterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LetterDefinition> {
        self.letters.get(index)
    }

    pub fn by_name(&self, name: &str) -> Result<&LetterDefinition, LetterError> {
        self.letters
            .iter()
            .find(|letter| letter.name == name)
            .ok_or_else(|| LetterError::UnknownLetter(name.to_string()))
    }
}
