use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{LOOP_CONTROL_HEIGHT, LOOP_CONTROL_SPREAD};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Visual displacement applied to both ends of a straight edge.
///
/// `dy` points up, so it is subtracted from screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Lowered edges mirror the offset vector.
    pub fn effective(self, lowered: bool) -> Offset {
        if lowered {
            Offset {
                dx: -self.dx,
                dy: -self.dy,
            }
        } else {
            self
        }
    }

    pub fn apply(self, point: Point) -> Point {
        Point {
            x: point.x + self.dx,
            y: point.y - self.dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgePath {
    Line { start: Point, end: Point },
    Loop { anchor: Point },
}

impl EdgePath {
    pub fn line(start: Point, end: Point, offset: Offset) -> Self {
        EdgePath::Line {
            start: offset.apply(start),
            end: offset.apply(end),
        }
    }

    pub fn self_loop(anchor: Point) -> Self {
        EdgePath::Loop { anchor }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, EdgePath::Loop { .. })
    }

    /// Control points of the cubic curve drawn above a self-loop's node.
    pub fn loop_controls(anchor: Point) -> (Point, Point) {
        (
            Point::new(
                anchor.x - LOOP_CONTROL_SPREAD,
                anchor.y - LOOP_CONTROL_HEIGHT,
            ),
            Point::new(
                anchor.x + LOOP_CONTROL_SPREAD,
                anchor.y - LOOP_CONTROL_HEIGHT,
            ),
        )
    }
}

impl fmt::Display for EdgePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EdgePath::Line { start, end } => {
                write!(f, "M {},{} L {},{}", start.x, start.y, end.x, end.y)
            }
            EdgePath::Loop { anchor } => {
                let (c1, c2) = EdgePath::loop_controls(anchor);
                write!(
                    f,
                    "M {x},{y} C {:.3},{:.3} {:.3},{:.3} {x},{y} M {x},{y}",
                    c1.x,
                    c1.y,
                    c2.x,
                    c2.y,
                    x = anchor.x,
                    y = anchor.y
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelOrientation {
    #[default]
    Upright,
    Flipped,
}

impl LabelOrientation {
    /// Text drawn along a path running right-to-left would appear upside
    /// down, so such segments get a flipped label.
    pub fn for_segment(start: Point, end: Point) -> Self {
        if end.x < start.x {
            LabelOrientation::Flipped
        } else {
            LabelOrientation::Upright
        }
    }

    pub fn rotation(self) -> u16 {
        match self {
            LabelOrientation::Upright => 0,
            LabelOrientation::Flipped => 180,
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            LabelOrientation::Upright => text.to_string(),
            LabelOrientation::Flipped => text.chars().rev().collect(),
        }
    }
}

pub fn format_weight(weight: f64) -> String {
    format!("{weight}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_path_applies_offset_with_upward_dy() {
        let path = EdgePath::line(
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Offset::new(5.0, 3.0),
        );
        assert_eq!(path.to_string(), "M 5,-3 L 105,47");
    }

    #[test]
    fn lowered_offset_is_mirrored() {
        let offset = Offset::new(4.0, -2.0);
        assert_eq!(offset.effective(false), offset);
        assert_eq!(offset.effective(true), Offset::new(-4.0, 2.0));
    }

    #[test]
    fn loop_path_uses_fixed_controls() {
        let path = EdgePath::self_loop(Point::new(10.0, 200.0));
        assert!(path.is_loop());
        let line = EdgePath::line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Offset::ZERO);
        assert!(!line.is_loop());
        assert_eq!(
            path.to_string(),
            "M 10,200 C -60.000,125.000 80.000,125.000 10,200 M 10,200"
        );
    }

    #[test]
    fn orientation_flips_only_for_leftward_segments() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(
            LabelOrientation::for_segment(origin, Point::new(-1.0, 0.0)),
            LabelOrientation::Flipped
        );
        assert_eq!(
            LabelOrientation::for_segment(origin, Point::new(0.0, 40.0)),
            LabelOrientation::Upright,
            "vertical segments keep the label upright"
        );
        assert_eq!(LabelOrientation::Flipped.rotation(), 180);
        assert_eq!(LabelOrientation::Flipped.apply("123"), "321");
    }

    #[test]
    fn weights_print_like_plain_decimals() {
        assert_eq!(format_weight(42.0), "42");
        assert_eq!(format_weight(2.5), "2.5");
        assert_eq!(format_weight(-7.0), "-7");
    }
}
