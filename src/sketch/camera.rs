use nalgebra::{Isometry3, Perspective3, Point3, Vector3};

use crate::sketch::projection::Viewport;
use crate::sketch::settings::SketchSettings;

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;
const ROTATE_SPEED: f32 = 2.0 * std::f32::consts::PI;
const ZOOM_STEP: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Distance along the view direction; larger is farther away.
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl OrbitCamera {
    pub fn from_settings(settings: &SketchSettings, viewport: Viewport) -> Self {
        let [x, y, z] = settings.camera_position;
        Self {
            position: Point3::new(x, y, z),
            target: Point3::origin(),
            fov_y: settings.camera_fov_degrees.to_radians(),
            near: settings.camera_near,
            far: settings.camera_far,
            aspect: viewport.aspect(),
        }
    }

    pub fn set_aspect(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    fn view(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.position, &self.target, &Vector3::y())
    }

    /// World point to viewport pixels; `None` when behind the near plane or
    /// past the far plane.
    pub fn project(&self, world: &Point3<f32>, viewport: Viewport) -> Option<ScreenPoint> {
        let eye = self.view().transform_point(world);
        let depth = -eye.z;
        if depth < self.near || depth > self.far {
            return None;
        }
        let ndc = Perspective3::new(self.aspect, self.fov_y, self.near, self.far)
            .project_point(&eye);
        Some(ScreenPoint {
            x: (ndc.x + 1.0) / 2.0 * viewport.width,
            y: (1.0 - ndc.y) / 2.0 * viewport.height,
            depth,
        })
    }
}

/// Damped orbit around the camera target: drag rotates, wheel zooms.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    damping: f32,
    min_distance: f32,
    max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
    last_pointer: Option<(f32, f32)>,
}

impl OrbitControls {
    pub fn new(damping: f32, far: f32) -> Self {
        Self {
            damping,
            min_distance: 0.5,
            max_distance: far * 0.5,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 1.0,
            last_pointer: None,
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.last_pointer = Some((x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, viewport: Viewport) {
        let Some((last_x, last_y)) = self.last_pointer else {
            return;
        };
        if viewport.is_empty() {
            return;
        }
        self.pending_azimuth -= ROTATE_SPEED * (x - last_x) / viewport.height;
        self.pending_polar -= ROTATE_SPEED * (y - last_y) / viewport.height;
        self.last_pointer = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.last_pointer = None;
    }

    /// Positive `steps` zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom *= ZOOM_STEP.powf(steps);
    }

    pub fn is_settled(&self) -> bool {
        self.pending_azimuth.abs() < 1e-5
            && self.pending_polar.abs() < 1e-5
            && (self.pending_zoom - 1.0).abs() < 1e-5
    }

    /// Applies pending motion to `camera` once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let offset = camera.position - camera.target;
        let radius = offset.norm();
        if radius == 0.0 {
            return;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let step = if self.damping > 0.0 { self.damping } else { 1.0 };
        azimuth += self.pending_azimuth * step;
        polar = (polar + self.pending_polar * step).clamp(MIN_POLAR, MAX_POLAR);
        let zoom = 1.0 + (self.pending_zoom - 1.0) * step;
        let radius = (radius * zoom).clamp(self.min_distance, self.max_distance);

        camera.position = camera.target
            + Vector3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );

        if self.damping > 0.0 {
            self.pending_azimuth *= 1.0 - self.damping;
            self.pending_polar *= 1.0 - self.damping;
            self.pending_zoom = 1.0 + (self.pending_zoom - 1.0) * (1.0 - self.damping);
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_zoom = 1.0;
        }
    }
}
