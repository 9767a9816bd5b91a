use serde::{Deserialize, Serialize};

use crate::sketch::geometry::DEFAULT_HIT_TOLERANCE;
use crate::sketch::model::Color;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SketchSettings {
    #[serde(default = "default_pencil_color")]
    pub pencil_color: Color,
    #[serde(default = "default_pencil_width")]
    pub pencil_width: f32,
    #[serde(default = "default_min_width")]
    pub min_width: f32,
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    /// Radius of the draggable endpoint handles.
    #[serde(default = "default_handle_radius")]
    pub handle_radius: f32,
    #[serde(default = "default_true")]
    pub show_handles: bool,
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f32,
    #[serde(default = "default_highlight_color")]
    pub highlight_color: Color,
    #[serde(default = "default_clear_color")]
    pub clear_color: Color,
    /// Maximum undo snapshots kept; `0` keeps all of them.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_projection_scale")]
    pub projection_scale: f32,
    #[serde(default = "default_width_factor")]
    pub width_factor: f32,
    #[serde(default = "default_wall_height")]
    pub wall_height: f32,
    #[serde(default)]
    pub wall_outline: bool,
    #[serde(default = "default_camera_fov_degrees")]
    pub camera_fov_degrees: f32,
    #[serde(default = "default_camera_near")]
    pub camera_near: f32,
    #[serde(default = "default_camera_far")]
    pub camera_far: f32,
    #[serde(default = "default_camera_position")]
    pub camera_position: [f32; 3],
    #[serde(default = "default_orbit_damping")]
    pub orbit_damping: f32,
}

fn default_pencil_color() -> Color {
    Color::RED
}

fn default_pencil_width() -> f32 {
    3.0
}

fn default_min_width() -> f32 {
    1.0
}

fn default_max_width() -> f32 {
    20.0
}

fn default_handle_radius() -> f32 {
    5.0
}

fn default_true() -> bool {
    true
}

fn default_hit_tolerance() -> f32 {
    DEFAULT_HIT_TOLERANCE
}

fn default_highlight_color() -> Color {
    Color::GOLD
}

fn default_clear_color() -> Color {
    Color::WHITE
}

fn default_history_limit() -> usize {
    100
}

fn default_projection_scale() -> f32 {
    0.01
}

fn default_width_factor() -> f32 {
    5.0
}

fn default_wall_height() -> f32 {
    2.0
}

fn default_camera_fov_degrees() -> f32 {
    75.0
}

fn default_camera_near() -> f32 {
    0.1
}

fn default_camera_far() -> f32 {
    1000.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 2.0, 8.0]
}

fn default_orbit_damping() -> f32 {
    0.05
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            pencil_color: default_pencil_color(),
            pencil_width: default_pencil_width(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            handle_radius: default_handle_radius(),
            show_handles: true,
            hit_tolerance: default_hit_tolerance(),
            highlight_color: default_highlight_color(),
            clear_color: default_clear_color(),
            history_limit: default_history_limit(),
            projection_scale: default_projection_scale(),
            width_factor: default_width_factor(),
            wall_height: default_wall_height(),
            wall_outline: false,
            camera_fov_degrees: default_camera_fov_degrees(),
            camera_near: default_camera_near(),
            camera_far: default_camera_far(),
            camera_position: default_camera_position(),
            orbit_damping: default_orbit_damping(),
        }
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl SketchSettings {
    /// Repairs values a hand-edited settings file can break.
    pub fn sanitize(&mut self) {
        self.min_width = positive_or(self.min_width, default_min_width());
        self.max_width = positive_or(self.max_width, default_max_width());
        if self.max_width < self.min_width {
            std::mem::swap(&mut self.min_width, &mut self.max_width);
        }
        self.pencil_width = positive_or(self.pencil_width, default_pencil_width())
            .clamp(self.min_width, self.max_width);
        self.handle_radius = positive_or(self.handle_radius, default_handle_radius());
        self.hit_tolerance = positive_or(self.hit_tolerance, default_hit_tolerance());
        self.projection_scale = positive_or(self.projection_scale, default_projection_scale());
        self.width_factor = positive_or(self.width_factor, default_width_factor());
        self.wall_height = positive_or(self.wall_height, default_wall_height());
        self.camera_fov_degrees = positive_or(self.camera_fov_degrees, default_camera_fov_degrees())
            .min(170.0);
        self.camera_near = positive_or(self.camera_near, default_camera_near());
        self.camera_far = positive_or(self.camera_far, default_camera_far());
        if self.camera_far <= self.camera_near {
            self.camera_far = self.camera_near * 10_000.0;
        }
        if !self.camera_position.iter().all(|v| v.is_finite())
            || self.camera_position == [0.0, 0.0, 0.0]
        {
            self.camera_position = default_camera_position();
        }
        if !(self.orbit_damping.is_finite() && (0.0..1.0).contains(&self.orbit_damping)) {
            self.orbit_damping = default_orbit_damping();
        }
    }
}
