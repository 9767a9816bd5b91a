use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sketch::geometry::{point_in_circle, point_on_segment};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SketchError {
    #[error("segment start and end are both at ({x}, {y})")]
    ZeroLengthSegment { x: f32, y: f32 },
    #[error("stroke width must be finite and positive, got {0}")]
    InvalidWidth(f32),
    #[error("unknown pencil color '{0}'")]
    UnknownColor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Component-wise `self - other`.
    pub fn delta_from(self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const PALETTE: &[(&str, Color)] = &[
    ("red", Color::RED),
    ("blue", Color::rgba(0, 0, 255, 255)),
    ("green", Color::rgba(0, 128, 0, 255)),
    ("black", Color::BLACK),
    ("gold", Color::GOLD),
    ("white", Color::WHITE),
    ("orange", Color::rgba(255, 165, 0, 255)),
    ("purple", Color::rgba(128, 0, 128, 255)),
];

impl Color {
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GOLD: Color = Color::rgba(255, 215, 0, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses a pencil palette name (`"red"`, `"gold"`, ...) or a `#rrggbb` hex value.
    pub fn parse(name: &str) -> Result<Self, SketchError> {
        let trimmed = name.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| SketchError::UnknownColor(name.to_string()));
        }
        PALETTE
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(trimmed))
            .map(|(_, color)| *color)
            .ok_or_else(|| SketchError::UnknownColor(name.to_string()))
    }

    pub fn palette() -> impl Iterator<Item = (&'static str, Color)> {
        PALETTE.iter().copied()
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::rgba(
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
        255,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 3.0,
            color: Color::RED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// One committed stroke. Fields are private so every segment passes
/// through [`Segment::new`]; only the store's drag updates move endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Point,
    end: Point,
    style: StrokeStyle,
    handle_radius: Option<f32>,
}

impl Segment {
    pub fn new(start: Point, end: Point, style: StrokeStyle) -> Result<Self, SketchError> {
        if start == end {
            return Err(SketchError::ZeroLengthSegment {
                x: start.x,
                y: start.y,
            });
        }
        if !(style.width.is_finite() && style.width > 0.0) {
            return Err(SketchError::InvalidWidth(style.width));
        }
        Ok(Self {
            start,
            end,
            style,
            handle_radius: None,
        })
    }

    pub fn with_handle_radius(mut self, radius: f32) -> Self {
        self.handle_radius = (radius.is_finite() && radius > 0.0).then_some(radius);
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Point {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn color(&self) -> Color {
        self.style.color
    }

    pub fn width(&self) -> f32 {
        self.style.width
    }

    pub fn handle_radius(&self) -> Option<f32> {
        self.handle_radius
    }

    pub fn is_zero_length(&self) -> bool {
        self.start == self.end
    }
}

/// Live ordered stroke collection; insertion order is paint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeStore {
    segments: Vec<Segment>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, segment: Segment) -> Result<usize, SketchError> {
        if segment.is_zero_length() {
            return Err(SketchError::ZeroLengthSegment {
                x: segment.start.x,
                y: segment.start.y,
            });
        }
        self.segments.push(segment);
        Ok(self.segments.len() - 1)
    }

    pub fn replace_all(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    pub fn all(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Places both endpoints at `original + delta`, in place.
    pub fn translate_segment(
        &mut self,
        index: usize,
        original_start: Point,
        original_end: Point,
        delta: (f32, f32),
    ) -> bool {
        let Some(segment) = self.segments.get_mut(index) else {
            return false;
        };
        segment.start = original_start.offset(delta.0, delta.1);
        segment.end = original_end.offset(delta.0, delta.1);
        true
    }

    pub fn move_endpoint(&mut self, index: usize, endpoint: Endpoint, position: Point) -> bool {
        let Some(segment) = self.segments.get_mut(index) else {
            return false;
        };
        match endpoint {
            Endpoint::Start => segment.start = position,
            Endpoint::End => segment.end = position,
        }
        true
    }

    pub fn hit_segment(&self, point: Point, tolerance: f32) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| point_on_segment(point, segment.start, segment.end, tolerance))
    }

    pub fn hits_under(&self, point: Point, tolerance: f32) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(_, segment)| {
                point_on_segment(point, segment.start, segment.end, tolerance)
            })
            .map(|(index, _)| index)
    }

    pub fn hit_endpoint_handle(&self, point: Point) -> Option<(usize, Endpoint)> {
        self.segments.iter().enumerate().find_map(|(index, segment)| {
            let radius = segment.handle_radius?;
            [Endpoint::Start, Endpoint::End]
                .into_iter()
                .find(|endpoint| point_in_circle(point, segment.endpoint(*endpoint), radius))
                .map(|endpoint| (index, endpoint))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: (f32, f32), end: (f32, f32)) -> Segment {
        Segment::new(
            Point::new(start.0, start.1),
            Point::new(end.0, end.1),
            StrokeStyle::default(),
        )
        .expect("valid segment")
    }

    #[test]
    fn zero_length_segment_is_rejected_at_construction() {
        let result = Segment::new(
            Point::new(4.0, 4.0),
            Point::new(4.0, 4.0),
            StrokeStyle::default(),
        );
        assert_eq!(
            result,
            Err(SketchError::ZeroLengthSegment { x: 4.0, y: 4.0 })
        );
    }

    #[test]
    fn non_positive_width_is_rejected() {
        let style = StrokeStyle {
            width: 0.0,
            color: Color::RED,
        };
        assert!(matches!(
            Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0), style),
            Err(SketchError::InvalidWidth(_))
        ));
    }

    #[test]
    fn palette_names_and_hex_parse() {
        assert_eq!(Color::parse("red"), Ok(Color::RED));
        assert_eq!(Color::parse("Gold"), Ok(Color::GOLD));
        assert_eq!(Color::parse("#0a0b0c"), Ok(Color::rgba(10, 11, 12, 255)));
        assert!(Color::parse("chartreuse").is_err());
        assert!(Color::parse("#12").is_err());
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut store = StrokeStore::new();
        let first = segment((0.0, 0.0), (10.0, 0.0));
        let second = segment((0.0, 5.0), (10.0, 5.0));
        assert_eq!(store.append(first), Ok(0));
        assert_eq!(store.append(second), Ok(1));
        assert_eq!(store.all(), &[first, second]);
    }

    #[test]
    fn translate_segment_is_relative_to_original_endpoints() {
        let mut store = StrokeStore::new();
        let original = segment((10.0, 10.0), (50.0, 10.0));
        store.append(original).expect("append");

        assert!(store.translate_segment(0, original.start(), original.end(), (3.0, 1.0)));
        assert!(store.translate_segment(0, original.start(), original.end(), (5.0, -2.0)));

        let moved = store.get(0).expect("segment");
        assert_eq!(moved.start(), Point::new(15.0, 8.0));
        assert_eq!(moved.end(), Point::new(55.0, 8.0));
    }

    #[test]
    fn drag_updates_ignore_missing_index() {
        let mut store = StrokeStore::new();
        assert!(!store.move_endpoint(3, Endpoint::End, Point::new(1.0, 1.0)));
        assert!(!store.translate_segment(0, Point::default(), Point::default(), (1.0, 1.0)));
    }

    #[test]
    fn first_segment_in_paint_order_wins_hit_test() {
        let mut store = StrokeStore::new();
        store.append(segment((0.0, 0.0), (20.0, 0.0))).expect("append");
        store.append(segment((0.0, 0.0), (40.0, 0.0))).expect("append");
        assert_eq!(store.hit_segment(Point::new(10.0, 0.0), 0.1), Some(0));
        assert_eq!(store.hits_under(Point::new(10.0, 0.0), 0.1).count(), 2);
    }

    #[test]
    fn endpoint_handle_hit_prefers_start_then_end() {
        let mut store = StrokeStore::new();
        store
            .append(segment((0.0, 0.0), (30.0, 0.0)).with_handle_radius(5.0))
            .expect("append");
        assert_eq!(
            store.hit_endpoint_handle(Point::new(1.0, 1.0)),
            Some((0, Endpoint::Start))
        );
        assert_eq!(
            store.hit_endpoint_handle(Point::new(28.0, 2.0)),
            Some((0, Endpoint::End))
        );
        assert_eq!(store.hit_endpoint_handle(Point::new(15.0, 0.0)), None);
    }

    #[test]
    fn segments_without_handles_are_not_handle_hits() {
        let mut store = StrokeStore::new();
        store.append(segment((0.0, 0.0), (30.0, 0.0))).expect("append");
        assert_eq!(store.hit_endpoint_handle(Point::new(0.0, 0.0)), None);
    }
}
