use core::f32::consts::PI;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, direction: Point, distance: f32) -> Point {
        Point {
            x: self.x + direction.x * distance,
            y: self.y + direction.y * distance,
        }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl core::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl core::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

pub fn distance(a: Point, b: Point) -> f32 {
    (b - a).magnitude()
}

/// Screen-space heading from `a` to `b`. +y points down, so angles grow
/// clockwise. The result lies in (-π, π].
pub fn angle_between(a: Point, b: Point) -> f32 {
    let angle = (b.y - a.y).atan2(b.x - a.x);
    if angle <= -PI {
        PI
    } else {
        angle
    }
}

/// Unit vector in the direction of `vector`, or the zero vector when it has
/// no length.
pub fn normalize(vector: Point) -> Point {
    let len = vector.magnitude();
    if len <= f32::EPSILON {
        return Point::ZERO;
    }
    Point {
        x: vector.x / len,
        y: vector.y / len,
    }
}

/// `vector` rotated by +90° (clockwise on screen).
pub fn perpendicular(vector: Point) -> Point {
    Point {
        x: -vector.y,
        y: vector.x,
    }
}

/// Axis-aligned rectangle stored by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Self {
            min_x: center.x - half_w,
            min_y: center.y - half_h,
            max_x: center.x + half_w,
            max_y: center.y + half_h,
        }
    }

    pub fn expanded(self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point {
            x: (self.min_x + self.max_x) * 0.5,
            y: (self.min_y + self.max_y) * 0.5,
        }
    }
}

/// Rectangle rotated by `angle` around `center`; `half_length` runs along the
/// heading, `half_width` across it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    pub center: Point,
    pub half_length: f32,
    pub half_width: f32,
    pub angle: f32,
}

impl OrientedRect {
    pub fn contains(&self, point: Point, margin: f32) -> bool {
        let (sin, cos) = self.angle.sin_cos();
        let rel = point - self.center;
        let along = rel.x * cos + rel.y * sin;
        let across = -rel.x * sin + rel.y * cos;
        along.abs() <= self.half_length + margin && across.abs() <= self.half_width + margin
    }
}

/// Offsets every point of `path` sideways by `offset` units, using the
/// direction between its neighbours. Negative offsets go to the other side.
pub fn offset_path(path: &[Point], offset: f32) -> Vec<Point> {
    let mut out = Vec::with_capacity(path.len());
    for (idx, &current) in path.iter().enumerate() {
        let previous = if idx == 0 { current } else { path[idx - 1] };
        let next = path.get(idx + 1).copied().unwrap_or(current);
        let normal = normalize(perpendicular(next - previous));
        out.push(current.offset(normal, offset));
    }
    out
}

/// Number of `step`-long slices needed to cover `len`; a remainder under
/// 1e-4 of a step is float noise and does not start a slice.
pub fn step_count(len: f32, step: f32) -> usize {
    if !(len > 0.0 && step > 0.0) {
        return 0;
    }
    ((len / step) - 1e-4).ceil().max(1.0) as usize
}

pub fn path_length(path: &[Point]) -> f32 {
    path.windows(2).map(|pair| distance(pair[0], pair[1])).sum()
}
