use std::f64::consts::{PI, TAU};

use plotters::element::{Circle, DynElement, EmptyElement, IntoDynElement, Polygon};
use plotters::prelude::DrawingBackend;
use plotters::style::ShapeStyle;

// ---------------------------------------------------------------------------
// Marker shapes for the scatter figure
// ---------------------------------------------------------------------------

/// The fixed, ordered marker palette. Thirteen shapes, assigned by row
/// order and cycled when a figure carries more points than shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Octagon,
    TriangleRight,
    Diamond,
    TriangleUp,
    HexagonFlat,
    Star,
    ThinDiamond,
    Hexagon,
    TriangleDown,
    Square,
    TriangleLeft,
    Circle,
    Pentagon,
}

pub const MARKER_SHAPES: [MarkerShape; 13] = [
    MarkerShape::Octagon,
    MarkerShape::TriangleRight,
    MarkerShape::Diamond,
    MarkerShape::TriangleUp,
    MarkerShape::HexagonFlat,
    MarkerShape::Star,
    MarkerShape::ThinDiamond,
    MarkerShape::Hexagon,
    MarkerShape::TriangleDown,
    MarkerShape::Square,
    MarkerShape::TriangleLeft,
    MarkerShape::Circle,
    MarkerShape::Pentagon,
];

/// Marker for the i-th plotted row, wrapping past the palette end.
pub fn marker_for_row(row: usize) -> MarkerShape {
    MARKER_SHAPES[row % MARKER_SHAPES.len()]
}

/// Build a drawable marker centred on `at`, with pixel offsets for the
/// shape outline so the element works in any guest coordinate system.
pub fn marker<'a, DB, Coord>(
    shape: MarkerShape,
    at: Coord,
    size: i32,
    style: ShapeStyle,
) -> DynElement<'a, DB, Coord>
where
    DB: DrawingBackend + 'a,
    Coord: Clone + 'a,
{
    let r = size as f64;
    match shape {
        MarkerShape::Circle => (EmptyElement::at(at) + Circle::new((0, 0), size, style)).into_dyn(),
        MarkerShape::Square => polygon(at, regular_polygon(4, r * 1.1, PI / 4.0), style),
        MarkerShape::Diamond => polygon(at, regular_polygon(4, r * 1.2, 0.0), style),
        MarkerShape::ThinDiamond => polygon(at, thin_diamond(r), style),
        MarkerShape::TriangleUp => polygon(at, regular_polygon(3, r * 1.2, 0.0), style),
        MarkerShape::TriangleDown => polygon(at, regular_polygon(3, r * 1.2, PI), style),
        MarkerShape::TriangleRight => polygon(at, regular_polygon(3, r * 1.2, PI / 2.0), style),
        MarkerShape::TriangleLeft => polygon(at, regular_polygon(3, r * 1.2, -PI / 2.0), style),
        MarkerShape::Pentagon => polygon(at, regular_polygon(5, r * 1.15, 0.0), style),
        MarkerShape::Hexagon => polygon(at, regular_polygon(6, r * 1.1, 0.0), style),
        MarkerShape::HexagonFlat => polygon(at, regular_polygon(6, r * 1.1, PI / 6.0), style),
        MarkerShape::Octagon => polygon(at, regular_polygon(8, r * 1.1, PI / 8.0), style),
        MarkerShape::Star => polygon(at, star(5, r * 1.35, r * 0.55), style),
    }
}

fn polygon<'a, DB, Coord>(
    at: Coord,
    points: Vec<(i32, i32)>,
    style: ShapeStyle,
) -> DynElement<'a, DB, Coord>
where
    DB: DrawingBackend + 'a,
    Coord: Clone + 'a,
{
    (EmptyElement::at(at) + Polygon::new(points, style)).into_dyn()
}

/// Vertices of a regular polygon, first vertex pointing up before
/// `rotation` is applied. Pixel coordinates grow downwards.
fn regular_polygon(sides: usize, radius: f64, rotation: f64) -> Vec<(i32, i32)> {
    (0..sides)
        .map(|i| {
            let theta = rotation + i as f64 * TAU / sides as f64;
            (
                (radius * theta.sin()).round() as i32,
                (-radius * theta.cos()).round() as i32,
            )
        })
        .collect()
}

fn star(points: usize, outer: f64, inner: f64) -> Vec<(i32, i32)> {
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let theta = i as f64 * PI / points as f64;
            (
                (radius * theta.sin()).round() as i32,
                (-radius * theta.cos()).round() as i32,
            )
        })
        .collect()
}

fn thin_diamond(r: f64) -> Vec<(i32, i32)> {
    let half = (r * 0.6).round() as i32;
    let tall = (r * 1.2).round() as i32;
    vec![(0, -tall), (half, 0), (0, tall), (-half, 0)]
}

// ---------------------------------------------------------------------------
