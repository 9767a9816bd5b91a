use thiserror::Error;

use crate::sketch::camera::{OrbitCamera, OrbitControls};
use crate::sketch::projection::{Viewport, WallPrimitive};
use crate::sketch::render_loop::{RenderLoop, RenderLoopHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    View2D,
    View3D,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::View2D => Self::View3D,
            Self::View3D => Self::View2D,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::View2D => "2D",
            Self::View3D => "3D",
        }
    }
}

/// Which handler set receives pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRoute {
    Editing,
    Orbit,
}

const INPUT_ROUTES: [(ViewMode, InputRoute); 2] = [
    (ViewMode::View2D, InputRoute::Editing),
    (ViewMode::View3D, InputRoute::Orbit),
];

pub fn input_route(view: ViewMode) -> InputRoute {
    INPUT_ROUTES
        .iter()
        .find(|(mode, _)| *mode == view)
        .map(|(_, route)| *route)
        .unwrap_or(InputRoute::Editing)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("3D rendering backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Resources that only exist while the 3D view is shown. Dropping the scene
/// cancels its render loop.
#[derive(Debug)]
pub struct Scene3d {
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
    primitives: Vec<WallPrimitive>,
    render_loop: RenderLoop,
    loop_handle: RenderLoopHandle,
    rebuilds: u64,
}

impl Scene3d {
    pub fn new(
        camera: OrbitCamera,
        controls: OrbitControls,
        primitives: Vec<WallPrimitive>,
    ) -> Self {
        let (render_loop, loop_handle) = RenderLoop::start();
        Self {
            camera,
            controls,
            primitives,
            render_loop,
            loop_handle,
            rebuilds: 0,
        }
    }

    pub fn primitives(&self) -> &[WallPrimitive] {
        &self.primitives
    }

    /// Swaps in a freshly built primitive list; nothing is patched in place.
    pub fn replace_primitives(&mut self, primitives: Vec<WallPrimitive>) {
        self.primitives = primitives;
        self.rebuilds += 1;
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn loop_handle(&self) -> &RenderLoopHandle {
        &self.loop_handle
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_loop.frames()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.set_aspect(viewport);
    }

    /// Advances one frame; `false` once the loop has been cancelled.
    pub fn advance_frame(&mut self) -> bool {
        if !self.render_loop.next_frame() {
            return false;
        }
        self.controls.update(&mut self.camera);
        true
    }
}

impl Drop for Scene3d {
    fn drop(&mut self) {
        self.loop_handle.cancel();
    }
}
