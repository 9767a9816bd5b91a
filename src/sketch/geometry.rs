use crate::sketch::model::Point;

pub const DEFAULT_HIT_TOLERANCE: f32 = 0.1;

pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Distance-sum test: `|p - start| + |p - end|` must be within `tolerance`
/// of `|end - start|`. Zero-length segments never match.
pub fn point_on_segment(point: Point, start: Point, end: Point, tolerance: f32) -> bool {
    let length = distance(start, end);
    if length == 0.0 {
        return false;
    }
    let sum = distance(point, start) + distance(point, end);
    (sum - length).abs() < tolerance
}

pub fn point_in_circle(point: Point, center: Point, radius: f32) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Expands a segment into a wall strip `half_width` to each side.
///
/// Corners are ordered `start - n*hw`, `start + n*hw`, `end + n*hw`,
/// `end - n*hw` with `n` the left-hand unit normal. Returns `None` for a
/// zero-length segment, whose normal is undefined.
pub fn segment_to_wall_quad(start: Point, end: Point, half_width: f32) -> Option<[Point; 4]> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    let nx = -dy / length * half_width;
    let ny = dx / length * half_width;
    Some([
        start.offset(-nx, -ny),
        start.offset(nx, ny),
        end.offset(nx, ny),
        end.offset(-nx, -ny),
    ])
}
