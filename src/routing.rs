//! Edge geometry: boundary port selection and path computation.
//!
//! Ports and paths are pure functions of the two endpoint rectangles, so a
//! caller recomputes them whenever either node moves instead of patching
//! stale geometry.

use crate::model::{Point, Rect, RouteStyle};

/// Eight compass attachment points on a node boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

pub const COMPASS_POINTS: [Compass; 8] = [
    Compass::North,
    Compass::NorthEast,
    Compass::East,
    Compass::SouthEast,
    Compass::South,
    Compass::SouthWest,
    Compass::West,
    Compass::NorthWest,
];

impl Compass {
    pub fn position_on(&self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Compass::North => Point::new(cx, rect.y),
            Compass::NorthEast => Point::new(rect.right(), rect.y),
            Compass::East => Point::new(rect.right(), cy),
            Compass::SouthEast => Point::new(rect.right(), rect.bottom()),
            Compass::South => Point::new(cx, rect.bottom()),
            Compass::SouthWest => Point::new(rect.x, rect.bottom()),
            Compass::West => Point::new(rect.x, cy),
            Compass::NorthWest => Point::new(rect.x, rect.y),
        }
    }
}

/// All eight boundary ports of a rectangle.
pub fn boundary_ports(rect: &Rect) -> [(Compass, Point); 8] {
    COMPASS_POINTS.map(|side| (side, side.position_on(rect)))
}

/// The boundary port closest to `toward` (i.e. facing it).
pub fn nearest_port(rect: &Rect, toward: Point) -> (Compass, Point) {
    let mut best = (Compass::North, Compass::North.position_on(rect));
    let mut best_dist = f32::MAX;
    for (side, point) in boundary_ports(rect) {
        let dist = point.distance_to(toward);
        if dist < best_dist {
            best_dist = dist;
            best = (side, point);
        }
    }
    best
}

/// Geometric path of a routed edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgePath {
    Polyline(Vec<Point>),
    Cubic {
        start: Point,
        c1: Point,
        c2: Point,
        end: Point,
    },
}

impl EdgePath {
    pub fn start(&self) -> Point {
        match self {
            EdgePath::Polyline(points) => points[0],
            EdgePath::Cubic { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            EdgePath::Polyline(points) => points[points.len() - 1],
            EdgePath::Cubic { end, .. } => *end,
        }
    }
}

/// Route an edge between two node rectangles.
///
/// Each endpoint attaches at the boundary port nearest the other node's
/// center. Orthogonal routes make a single 90° turn, going
/// horizontal-first when the horizontal delta dominates.
pub fn route_edge(source: &Rect, target: &Rect, style: RouteStyle) -> EdgePath {
    let (_, start) = nearest_port(source, target.center());
    let (_, end) = nearest_port(target, source.center());
    match style {
        RouteStyle::Straight => EdgePath::Polyline(vec![start, end]),
        RouteStyle::Orthogonal => {
            let dx = end.x - start.x;
            let dy = end.y - start.y;
            let bend = if dx.abs() >= dy.abs() {
                Point::new(end.x, start.y)
            } else {
                Point::new(start.x, end.y)
            };
            // Collinear endpoints need no bend point.
            if (bend.x - start.x).abs() < f32::EPSILON && (bend.y - start.y).abs() < f32::EPSILON
                || (bend.x - end.x).abs() < f32::EPSILON && (bend.y - end.y).abs() < f32::EPSILON
            {
                EdgePath::Polyline(vec![start, end])
            } else {
                EdgePath::Polyline(vec![start, bend, end])
            }
        }
        RouteStyle::Curved => {
            let span = end.x - start.x;
            EdgePath::Cubic {
                start,
                c1: Point::new(start.x + span / 3.0, start.y),
                c2: Point::new(start.x + span * 2.0 / 3.0, end.y),
                end,
            }
        }
    }
}
