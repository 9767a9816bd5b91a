//! Maps the stroke store onto extruded wall geometry.
//!
//! The builder is a pure function of the strokes, the viewport, and the
//! projection parameters. Callers discard the previous output and call it
//! again after every mutation; primitives carry no identity across rebuilds
//! beyond the index of the segment they came from.

use nalgebra::Point3;

use crate::sketch::geometry::segment_to_wall_quad;
use crate::sketch::model::{Color, Point, StrokeStore};
use crate::sketch::settings::SketchSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallStyle {
    #[default]
    Solid,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Drawing units to projection units.
    pub scale: f32,
    /// Multiplier applied on top of `scale` to the pencil width.
    pub width_factor: f32,
    pub wall_height: f32,
    pub style: WallStyle,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            scale: 0.01,
            width_factor: 5.0,
            wall_height: 2.0,
            style: WallStyle::Solid,
        }
    }
}

impl ProjectionParams {
    pub fn from_settings(settings: &SketchSettings) -> Self {
        Self {
            scale: settings.projection_scale,
            width_factor: settings.width_factor,
            wall_height: settings.wall_height,
            style: if settings.wall_outline {
                WallStyle::Outline
            } else {
                WallStyle::Solid
            },
        }
    }
}

/// One extruded wall. `footprint` is in projection space (y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPrimitive {
    pub source: usize,
    pub footprint: [Point; 4],
    pub base: f32,
    pub height: f32,
    pub color: Color,
    pub style: WallStyle,
}

/// Drawing-surface point to projection space. The y axis flips so that
/// "up" on the canvas stays "up" (away from the viewer) in the plan.
pub fn to_projection_space(point: Point, center: Point, scale: f32) -> Point {
    Point::new((point.x - center.x) * scale, (center.y - point.y) * scale)
}

pub fn build_projection(
    store: &StrokeStore,
    viewport: Viewport,
    params: ProjectionParams,
) -> Vec<WallPrimitive> {
    let center = viewport.center();
    store
        .all()
        .iter()
        .enumerate()
        .filter_map(|(source, segment)| {
            let start = to_projection_space(segment.start(), center, params.scale);
            let end = to_projection_space(segment.end(), center, params.scale);
            let half_width = segment.width() * params.scale * params.width_factor / 2.0;
            let footprint = segment_to_wall_quad(start, end, half_width)?;
            Some(WallPrimitive {
                source,
                footprint,
                base: 0.0,
                height: params.wall_height,
                color: segment.color(),
                style: params.style,
            })
        })
        .collect()
}

impl WallPrimitive {
    /// Plan point at elevation `h` in world space (y up, plan y along -z).
    pub fn world_point(point: Point, elevation: f32) -> Point3<f32> {
        Point3::new(point.x, elevation, -point.y)
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let top = self.base + self.height;
        let [a, b, c, d] = self.footprint;
        [
            Self::world_point(a, self.base),
            Self::world_point(b, self.base),
            Self::world_point(c, self.base),
            Self::world_point(d, self.base),
            Self::world_point(a, top),
            Self::world_point(b, top),
            Self::world_point(c, top),
            Self::world_point(d, top),
        ]
    }

    /// The six quads of the extruded box: bottom, top, then the four sides.
    pub fn faces(&self) -> [[Point3<f32>; 4]; 6] {
        let [b0, b1, b2, b3, t0, t1, t2, t3] = self.corners();
        [
            [b0, b1, b2, b3],
            [t0, t1, t2, t3],
            [b0, b1, t1, t0],
            [b1, b2, t2, t1],
            [b2, b3, t3, t2],
            [b3, b0, t0, t3],
        ]
    }

    /// The twelve edges of the extruded box, for outline rendering.
    pub fn edges(&self) -> [[Point3<f32>; 2]; 12] {
        let [b0, b1, b2, b3, t0, t1, t2, t3] = self.corners();
        [
            [b0, b1],
            [b1, b2],
            [b2, b3],
            [b3, b0],
            [t0, t1],
            [t1, t2],
            [t2, t3],
            [t3, t0],
            [b0, t0],
            [b1, t1],
            [b2, t2],
            [b3, t3],
        ]
    }
}
