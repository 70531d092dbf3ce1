use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

pub fn point(x: f32, y: f32) -> Point {
    Point { x, y }
}

impl Point {
    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        point(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        point(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in window coordinates (origin at top-left)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        point(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Position of `p` relative to this rectangle's origin
    pub fn relative(&self, p: Point) -> Point {
        p - self.origin()
    }
}

/// Viewport transform: renderer = diagram * zoom + pan
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Transform {
    pub fn new(pan_x: f32, pan_y: f32, zoom: f32) -> Self {
        Self { pan_x, pan_y, zoom }
    }

    /// Map a container-relative renderer point into diagram space
    pub fn to_diagram(&self, p: Point) -> Point {
        point((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    /// Map a diagram point into container-relative renderer space
    pub fn to_renderer(&self, p: Point) -> Point {
        point(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_through_diagram_space() {
        let t = Transform::new(40.0, -12.0, 2.0);
        let renderer = point(140.0, 88.0);
        let diagram = t.to_diagram(renderer);
        assert_eq!(diagram, point(50.0, 50.0));
        assert_eq!(t.to_renderer(diagram), renderer);
    }

    #[test]
    fn rect_relative_subtracts_origin() {
        let r = Rect::new(10.0, 20.0, 800.0, 600.0);
        assert_eq!(r.relative(point(15.0, 25.0)), point(5.0, 5.0));
        assert!(r.contains(point(810.0, 620.0)));
        assert!(!r.contains(point(811.0, 620.0)));
    }
}
