use crate::sketch::camera::{OrbitCamera, OrbitControls};
use crate::sketch::history::SketchHistory;
use crate::sketch::input::{
    map_key_event_to_command, EditTarget, EditingSurface, KeyCommand, KeyEvent, PointerEvent,
    PointerOutcome,
};
use crate::sketch::model::{Color, SketchError, StrokeStore};
use crate::sketch::panels::{ToolPanels, ToolState};
use crate::sketch::projection::{
    build_projection, ProjectionParams, Viewport, WallPrimitive, WallStyle,
};
use crate::sketch::render::{redraw_canvas, DrawCommand, Overlay};
use crate::sketch::settings::SketchSettings;
use crate::sketch::view::{input_route, InputRoute, Scene3d, ViewError, ViewMode};

/// Output capability implemented by the rendering adapter.
pub trait FrameSink {
    fn render_frame_2d(&mut self, commands: &[DrawCommand]);

    fn render_frame_3d(&mut self, primitives: &[WallPrimitive], camera: &OrbitCamera);

    /// Called before entering the 3D view. An error keeps the session in 2D.
    fn acquire_3d(&mut self, _viewport: Viewport) -> Result<(), ViewError> {
        Ok(())
    }

    /// Called after the 3D scene and its render loop are gone.
    fn release_3d(&mut self) {}
}

/// Input capability: everything the surrounding UI can send to a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Mouse wheel in notches; positive zooms in.
    Wheel(f32),
    SelectColor(Color),
    SelectWidth(f32),
    Undo,
    Redo,
    ToggleView,
    ToggleOptions,
    TogglePencil,
    ToggleWallOutline,
    Resize(Viewport),
    Key(KeyEvent),
}

/// One drawing document: strokes, history, tool selection, and view state.
#[derive(Debug)]
pub struct DrawingSession {
    settings: SketchSettings,
    store: StrokeStore,
    history: SketchHistory,
    tool: ToolState,
    panels: ToolPanels,
    editor: EditingSurface,
    view: ViewMode,
    scene: Option<Scene3d>,
    viewport: Viewport,
    options_before_3d: bool,
}

impl DrawingSession {
    pub fn new(mut settings: SketchSettings, viewport: Viewport) -> Self {
        settings.sanitize();
        Self {
            store: StrokeStore::new(),
            history: SketchHistory::with_limit(settings.history_limit),
            tool: ToolState::from_settings(&settings),
            panels: ToolPanels::new(settings.wall_outline),
            editor: EditingSurface::default(),
            view: ViewMode::View2D,
            scene: None,
            viewport,
            options_before_3d: true,
            settings,
        }
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn history(&self) -> &SketchHistory {
        &self.history
    }

    pub fn tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn panels(&self) -> &ToolPanels {
        &self.panels
    }

    pub fn settings(&self) -> &SketchSettings {
        &self.settings
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> Option<&Scene3d> {
        self.scene.as_ref()
    }

    pub fn projection_params(&self) -> ProjectionParams {
        let mut params = ProjectionParams::from_settings(&self.settings);
        params.style = if self.panels.wall_outline {
            WallStyle::Outline
        } else {
            WallStyle::Solid
        };
        params
    }

    /// Full 2D frame for the current strokes with no overlay.
    pub fn redraw_commands(&self) -> Vec<DrawCommand> {
        redraw_canvas(&self.store, self.viewport, Overlay::None, &self.settings)
    }

    pub fn build_projection(&self) -> Vec<WallPrimitive> {
        build_projection(&self.store, self.viewport, self.projection_params())
    }

    pub fn dispatch(
        &mut self,
        event: SessionEvent,
        sink: &mut dyn FrameSink,
    ) -> Result<(), ViewError> {
        match event {
            SessionEvent::PointerDown(pointer) => self.pointer_down(pointer, sink),
            SessionEvent::PointerMove(pointer) => self.pointer_move(pointer, sink),
            SessionEvent::PointerUp(pointer) => self.pointer_up(pointer, sink),
            SessionEvent::Wheel(steps) => self.wheel(steps),
            SessionEvent::SelectColor(color) => self.set_tool_color(color),
            SessionEvent::SelectWidth(width) => {
                if let Err(err) = self.set_tool_width(width) {
                    tracing::warn!(%err, "ignoring pencil width");
                }
            }
            SessionEvent::Undo => {
                self.undo(sink);
            }
            SessionEvent::Redo => {
                self.redo(sink);
            }
            SessionEvent::ToggleView => {
                self.toggle_view(sink)?;
            }
            SessionEvent::ToggleOptions => self.toggle_options(),
            SessionEvent::TogglePencil => self.panels.toggle_pencil(),
            SessionEvent::ToggleWallOutline => self.toggle_wall_outline(sink),
            SessionEvent::Resize(viewport) => self.resize(viewport, sink),
            SessionEvent::Key(key) => return self.handle_key(key, sink),
        }
        Ok(())
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        sink: &mut dyn FrameSink,
    ) -> Result<(), ViewError> {
        match map_key_event_to_command(key) {
            Some(KeyCommand::Undo) => {
                self.undo(sink);
            }
            Some(KeyCommand::Redo) => {
                self.redo(sink);
            }
            Some(KeyCommand::ToggleView) => {
                self.toggle_view(sink)?;
            }
            Some(KeyCommand::ToggleOptions) => self.toggle_options(),
            None => {}
        }
        Ok(())
    }

    fn edit_target(&mut self) -> (&mut EditingSurface, EditTarget<'_>) {
        (
            &mut self.editor,
            EditTarget {
                store: &mut self.store,
                history: &mut self.history,
                tool: self.tool.style(),
                settings: &self.settings,
            },
        )
    }

    pub fn pointer_down(&mut self, event: PointerEvent, sink: &mut dyn FrameSink) {
        match input_route(self.view) {
            InputRoute::Editing => {
                let (editor, target) = self.edit_target();
                let outcome = editor.pointer_down(event, target);
                self.apply_pointer_outcome(outcome, sink);
            }
            InputRoute::Orbit => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.controls.pointer_down(event.position.x, event.position.y);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, event: PointerEvent, sink: &mut dyn FrameSink) {
        match input_route(self.view) {
            InputRoute::Editing => {
                let (editor, target) = self.edit_target();
                let outcome = editor.pointer_move(event, target);
                self.apply_pointer_outcome(outcome, sink);
            }
            InputRoute::Orbit => {
                let viewport = self.viewport;
                if let Some(scene) = self.scene.as_mut() {
                    scene
                        .controls
                        .pointer_move(event.position.x, event.position.y, viewport);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent, sink: &mut dyn FrameSink) {
        match input_route(self.view) {
            InputRoute::Editing => {
                let (editor, target) = self.edit_target();
                let outcome = editor.pointer_up(event, target);
                self.apply_pointer_outcome(outcome, sink);
            }
            InputRoute::Orbit => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.controls.pointer_up();
                }
            }
        }
    }

    pub fn wheel(&mut self, steps: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.controls.zoom(steps);
        }
    }

    fn apply_pointer_outcome(&mut self, outcome: PointerOutcome, sink: &mut dyn FrameSink) {
        match outcome {
            PointerOutcome::None => {}
            PointerOutcome::Redraw(overlay) => {
                let commands = redraw_canvas(&self.store, self.viewport, overlay, &self.settings);
                sink.render_frame_2d(&commands);
            }
            PointerOutcome::Committed { .. } | PointerOutcome::Moved { .. } => self.refresh(sink),
        }
    }

    /// Reflects a stroke-store mutation in whichever view is active.
    fn refresh(&mut self, sink: &mut dyn FrameSink) {
        match self.view {
            ViewMode::View2D => sink.render_frame_2d(&self.redraw_commands()),
            ViewMode::View3D => {
                let primitives = self.build_projection();
                if let Some(scene) = self.scene.as_mut() {
                    scene.replace_primitives(primitives);
                }
            }
        }
    }

    /// Settles any in-progress pointer interaction so history never sees
    /// a half-finished drag.
    fn settle_editor(&mut self, sink: &mut dyn FrameSink) {
        let outcome = self.editor.finish(&mut self.store);
        self.apply_pointer_outcome(outcome, sink);
    }

    pub fn undo(&mut self, sink: &mut dyn FrameSink) -> bool {
        self.settle_editor(sink);
        if !self.history.undo(&mut self.store) {
            return false;
        }
        tracing::debug!(segments = self.store.len(), "undo applied");
        self.refresh(sink);
        true
    }

    pub fn redo(&mut self, sink: &mut dyn FrameSink) -> bool {
        self.settle_editor(sink);
        if !self.history.redo(&mut self.store) {
            return false;
        }
        tracing::debug!(segments = self.store.len(), "redo applied");
        self.refresh(sink);
        true
    }

    pub fn set_tool_color(&mut self, color: Color) {
        self.tool.set_color(color);
    }

    pub fn set_tool_color_name(&mut self, name: &str) -> Result<(), SketchError> {
        let color = Color::parse(name)?;
        self.tool.set_color(color);
        Ok(())
    }

    pub fn set_tool_width(&mut self, width: f32) -> Result<f32, SketchError> {
        self.tool.set_width(width)
    }

    /// In 3D the toggle also becomes the state restored on return to 2D.
    pub fn toggle_options(&mut self) {
        self.panels.toggle_options();
        if self.view == ViewMode::View3D {
            self.options_before_3d = self.panels.options_open;
        }
    }

    pub fn toggle_pencil(&mut self) {
        self.panels.toggle_pencil();
    }

    pub fn toggle_wall_outline(&mut self, sink: &mut dyn FrameSink) {
        let outline = self.panels.toggle_wall_outline();
        tracing::debug!(outline, "wall outline toggled");
        if self.view == ViewMode::View3D {
            self.refresh(sink);
        }
    }

    pub fn resize(&mut self, viewport: Viewport, sink: &mut dyn FrameSink) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(viewport);
        }
        self.refresh(sink);
    }

    pub fn toggle_view(&mut self, sink: &mut dyn FrameSink) -> Result<ViewMode, ViewError> {
        match self.view {
            ViewMode::View2D => self.enter_3d(sink)?,
            ViewMode::View3D => self.leave_3d(sink),
        }
        tracing::info!(
            view = self.view.label(),
            segments = self.store.len(),
            "view toggled"
        );
        Ok(self.view)
    }

    fn enter_3d(&mut self, sink: &mut dyn FrameSink) -> Result<(), ViewError> {
        if let Err(err) = sink.acquire_3d(self.viewport) {
            tracing::error!(%err, "3D view unavailable; staying in 2D");
            return Err(err);
        }
        self.settle_editor(sink);
        self.options_before_3d = self.panels.options_open;
        self.panels.set_options_open(false);

        let camera = OrbitCamera::from_settings(&self.settings, self.viewport);
        let controls = OrbitControls::new(self.settings.orbit_damping, self.settings.camera_far);
        let primitives = self.build_projection();
        // Invariant: at most one live scene, so at most one render loop.
        if let Some(previous) = self.scene.replace(Scene3d::new(camera, controls, primitives)) {
            previous.loop_handle().cancel();
        }
        self.view = ViewMode::View3D;
        Ok(())
    }

    fn leave_3d(&mut self, sink: &mut dyn FrameSink) {
        if let Some(scene) = self.scene.take() {
            scene.loop_handle().cancel();
        }
        sink.release_3d();
        self.view = ViewMode::View2D;
        self.panels.set_options_open(self.options_before_3d);
        sink.render_frame_2d(&self.redraw_commands());
    }

    /// Renders one 3D frame if the render loop is live. Call once per
    /// display refresh; returns whether a frame was produced.
    pub fn animation_frame(&mut self, sink: &mut dyn FrameSink) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        if !scene.advance_frame() {
            return false;
        }
        sink.render_frame_3d(scene.primitives(), &scene.camera);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::model::Point;
    use crate::sketch::render::line_count;

    #[derive(Default)]
    struct RecordingSink {
        frames_2d: Vec<Vec<DrawCommand>>,
        frames_3d: usize,
        acquired: usize,
        released: usize,
        fail_acquire: bool,
    }

    impl FrameSink for RecordingSink {
        fn render_frame_2d(&mut self, commands: &[DrawCommand]) {
            self.frames_2d.push(commands.to_vec());
        }

        fn render_frame_3d(&mut self, _primitives: &[WallPrimitive], _camera: &OrbitCamera) {
            self.frames_3d += 1;
        }

        fn acquire_3d(&mut self, _viewport: Viewport) -> Result<(), ViewError> {
            if self.fail_acquire {
                return Err(ViewError::BackendUnavailable("no gpu".into()));
            }
            self.acquired += 1;
            Ok(())
        }

        fn release_3d(&mut self) {
            self.released += 1;
        }
    }

    fn session() -> DrawingSession {
        DrawingSession::new(SketchSettings::default(), Viewport::new(200.0, 100.0))
    }

    fn stroke(
        session: &mut DrawingSession,
        sink: &mut RecordingSink,
        from: (f32, f32),
        to: (f32, f32),
    ) {
        session.pointer_down(PointerEvent::new(from.0, from.1, false), sink);
        session.pointer_move(PointerEvent::new(to.0, to.1, false), sink);
        session.pointer_up(PointerEvent::new(to.0, to.1, false), sink);
    }

    #[test]
    fn commit_in_2d_redraws_once_with_new_segment() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        stroke(&mut session, &mut sink, (10.0, 10.0), (50.0, 10.0));
        assert_eq!(session.store().len(), 1);
        // preview during the move, then the committed frame
        assert_eq!(sink.frames_2d.len(), 2);
        assert_eq!(line_count(&sink.frames_2d[1]), 1);
    }

    #[test]
    fn toggle_round_trip_manages_scene_and_panels() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        stroke(&mut session, &mut sink, (10.0, 10.0), (50.0, 10.0));

        assert_eq!(session.toggle_view(&mut sink), Ok(ViewMode::View3D));
        assert!(!session.panels().options_open);
        let handle = session.scene().expect("scene").loop_handle().clone();
        assert_eq!(session.scene().map(|s| s.primitives().len()), Some(1));
        assert!(session.animation_frame(&mut sink));
        assert_eq!(sink.frames_3d, 1);

        assert_eq!(session.toggle_view(&mut sink), Ok(ViewMode::View2D));
        assert!(handle.is_cancelled());
        assert!(session.scene().is_none());
        assert!(session.panels().options_open);
        assert!(!session.animation_frame(&mut sink));
        assert_eq!((sink.acquired, sink.released), (1, 1));
    }

    #[test]
    fn pointer_input_orbits_in_3d_instead_of_drawing() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        session.toggle_view(&mut sink).expect("3d");
        let before = session.scene().map(|s| s.camera.position);
        stroke(&mut session, &mut sink, (10.0, 10.0), (80.0, 10.0));
        session.animation_frame(&mut sink);
        assert!(session.store().is_empty());
        assert_ne!(session.scene().map(|s| s.camera.position), before);
    }

    #[test]
    fn undo_in_3d_rebuilds_projection() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        stroke(&mut session, &mut sink, (10.0, 10.0), (50.0, 10.0));
        stroke(&mut session, &mut sink, (10.0, 40.0), (50.0, 40.0));
        session.toggle_view(&mut sink).expect("3d");
        let frames_before = sink.frames_2d.len();

        assert!(session.undo(&mut sink));
        let scene = session.scene().expect("scene");
        assert_eq!(scene.primitives().len(), 1);
        assert_eq!(scene.rebuilds(), 1);
        assert_eq!(sink.frames_2d.len(), frames_before);
    }

    #[test]
    fn failed_acquire_keeps_2d_working() {
        let mut session = session();
        let mut sink = RecordingSink {
            fail_acquire: true,
            ..RecordingSink::default()
        };
        assert!(session.toggle_view(&mut sink).is_err());
        assert_eq!(session.view(), ViewMode::View2D);
        assert!(session.scene().is_none());
        stroke(&mut session, &mut sink, (0.0, 0.0), (20.0, 20.0));
        assert_eq!(session.store().len(), 1);
    }

    #[test]
    fn entering_3d_discards_in_progress_stroke() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        session.pointer_down(PointerEvent::new(0.0, 0.0, false), &mut sink);
        session.toggle_view(&mut sink).expect("3d");
        session.toggle_view(&mut sink).expect("2d");
        session.pointer_up(PointerEvent::new(30.0, 0.0, false), &mut sink);
        assert!(session.store().is_empty());
    }

    #[test]
    fn wall_outline_toggle_rebuilds_with_outline_style() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        stroke(&mut session, &mut sink, (10.0, 10.0), (50.0, 10.0));
        session.toggle_view(&mut sink).expect("3d");
        session.toggle_wall_outline(&mut sink);
        let scene = session.scene().expect("scene");
        assert_eq!(scene.primitives()[0].style, WallStyle::Outline);
    }

    #[test]
    fn options_toggled_in_3d_survive_return_to_2d() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        assert!(session.panels().options_open);
        session.toggle_view(&mut sink).expect("3d");
        session
            .dispatch(SessionEvent::ToggleOptions, &mut sink)
            .expect("toggle");
        assert!(session.panels().options_open);
        session
            .dispatch(SessionEvent::ToggleOptions, &mut sink)
            .expect("toggle");
        session.toggle_view(&mut sink).expect("2d");
        assert!(!session.panels().options_open);
    }

    #[test]
    fn dispatch_routes_tool_events() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        session
            .dispatch(SessionEvent::SelectColor(Color::BLACK), &mut sink)
            .expect("color");
        session
            .dispatch(SessionEvent::SelectWidth(f32::INFINITY), &mut sink)
            .expect("width is ignored, not an error");
        session
            .dispatch(SessionEvent::SelectWidth(6.0), &mut sink)
            .expect("width");
        assert_eq!(session.tool().style().color, Color::BLACK);
        assert_eq!(session.tool().style().width, 6.0);
        assert!(session.set_tool_color_name("mauve").is_err());
    }

    #[test]
    fn resize_recenters_projection() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        stroke(&mut session, &mut sink, (100.0, 50.0), (120.0, 50.0));
        let before = session.build_projection()[0].footprint[0];
        session.resize(Viewport::new(400.0, 100.0), &mut sink);
        let after = session.build_projection()[0].footprint[0];
        assert!(after.x < before.x);
        assert_eq!(session.viewport(), Viewport::new(400.0, 100.0));
        assert_eq!(
            session.store().get(0).map(|segment| segment.start()),
            Some(Point::new(100.0, 50.0))
        );
    }
}
