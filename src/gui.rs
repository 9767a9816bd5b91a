use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke};

use crate::settings::Settings;
use crate::sketch::camera::OrbitCamera;
use crate::sketch::input::{KeyCode, KeyEvent, KeyModifiers, PointerEvent};
use crate::sketch::model::{Color, Point};
use crate::sketch::projection::{Viewport, WallPrimitive, WallStyle};
use crate::sketch::render::DrawCommand;
use crate::sketch::{DrawingSession, FrameSink, ViewError, ViewMode};

/// Scroll distance treated as one wheel notch.
const SCROLL_NOTCH: f32 = 50.0;

fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn shade(color: Color, factor: f32) -> Color32 {
    let scale = |c: u8| ((c as f32) * factor).clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(scale(color.r), scale(color.g), scale(color.b), color.a)
}

/// Keeps the most recent frame of each view; egui repaints it every update.
#[derive(Default)]
pub struct PainterSink {
    commands: Vec<DrawCommand>,
    walls: Vec<WallPrimitive>,
    camera: Option<OrbitCamera>,
}

impl FrameSink for PainterSink {
    fn render_frame_2d(&mut self, commands: &[DrawCommand]) {
        self.commands.clear();
        self.commands.extend_from_slice(commands);
    }

    fn render_frame_3d(&mut self, primitives: &[WallPrimitive], camera: &OrbitCamera) {
        self.walls.clear();
        self.walls.extend_from_slice(primitives);
        self.camera = Some(camera.clone());
    }

    fn acquire_3d(&mut self, viewport: Viewport) -> Result<(), ViewError> {
        if viewport.is_empty() {
            return Err(ViewError::BackendUnavailable(format!(
                "canvas has no drawable area ({}x{})",
                viewport.width, viewport.height
            )));
        }
        Ok(())
    }

    fn release_3d(&mut self) {
        self.walls.clear();
        self.camera = None;
    }
}

impl PainterSink {
    fn paint_2d(&self, painter: &egui::Painter, rect: Rect) {
        let to_pos = |p: Point| rect.min + egui::vec2(p.x, p.y);
        for command in &self.commands {
            match *command {
                DrawCommand::Clear { color, .. } => {
                    painter.rect_filled(rect, 0.0, color32(color));
                }
                DrawCommand::Line {
                    start,
                    end,
                    color,
                    width,
                } => {
                    painter.line_segment(
                        [to_pos(start), to_pos(end)],
                        Stroke::new(width, color32(color)),
                    );
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => {
                    painter.circle_filled(to_pos(center), radius, color32(color));
                }
            }
        }
    }

    /// Painter's algorithm over projected wall faces, farthest first.
    fn paint_3d(&self, painter: &egui::Painter, rect: Rect, background: Color) {
        painter.rect_filled(rect, 0.0, color32(background));
        let Some(camera) = &self.camera else {
            return;
        };
        let viewport = Viewport::new(rect.width(), rect.height());
        let to_pos = |x: f32, y: f32| Pos2::new(rect.min.x + x, rect.min.y + y);

        let mut faces: Vec<(f32, Vec<Pos2>, Color32)> = Vec::new();
        for wall in &self.walls {
            match wall.style {
                WallStyle::Solid => {
                    for (face_index, face) in wall.faces().iter().enumerate() {
                        let projected: Option<Vec<_>> = face
                            .iter()
                            .map(|corner| camera.project(corner, viewport))
                            .collect();
                        let Some(projected) = projected else {
                            continue;
                        };
                        let depth =
                            projected.iter().map(|p| p.depth).sum::<f32>() / projected.len() as f32;
                        let points = projected.iter().map(|p| to_pos(p.x, p.y)).collect();
                        let factor = match face_index {
                            1 => 1.0,
                            0 => 0.5,
                            n if n % 2 == 0 => 0.8,
                            _ => 0.65,
                        };
                        faces.push((depth, points, shade(wall.color, factor)));
                    }
                }
                WallStyle::Outline => {
                    for [a, b] in wall.edges() {
                        let (Some(a), Some(b)) =
                            (camera.project(&a, viewport), camera.project(&b, viewport))
                        else {
                            continue;
                        };
                        painter.line_segment(
                            [to_pos(a.x, a.y), to_pos(b.x, b.y)],
                            Stroke::new(1.5, color32(wall.color)),
                        );
                    }
                }
            }
        }

        faces.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, points, fill) in faces {
            painter.add(Shape::convex_polygon(
                points,
                fill,
                Stroke::new(1.0, Color32::from_black_alpha(60)),
            ));
        }
    }
}

/// Last pointer position and shift state seen by the canvas.
#[derive(Debug, Default)]
struct PointerTracker {
    position: Option<Pos2>,
    shift: bool,
}

impl PointerTracker {
    /// Records the new state; `true` when the session should get a move.
    /// Pressing or releasing shift counts so the hover highlight follows it.
    fn update(&mut self, position: Pos2, shift: bool) -> bool {
        let changed = self.position != Some(position) || self.shift != shift;
        self.position = Some(position);
        self.shift = shift;
        changed
    }
}

pub struct SketchApp {
    session: DrawingSession,
    sink: PainterSink,
    pointer_captured: bool,
    tracker: PointerTracker,
    view_error: Option<String>,
}

impl SketchApp {
    pub fn new(settings: Settings) -> Self {
        let (width, height) = settings.window_size();
        let session = DrawingSession::new(settings.sketch, Viewport::new(width, height));
        let mut sink = PainterSink::default();
        sink.render_frame_2d(&session.redraw_commands());
        Self {
            session,
            sink,
            pointer_captured: false,
            tracker: PointerTracker::default(),
            view_error: None,
        }
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    fn toggle_view(&mut self) {
        match self.session.toggle_view(&mut self.sink) {
            Ok(_) => self.view_error = None,
            Err(err) => self.view_error = Some(err.to_string()),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let panels = *self.session.panels();
        ui.horizontal(|ui| {
            let icon = if panels.options_open { "✕" } else { "☰" };
            if ui.button(icon).on_hover_text("Tools").clicked() {
                self.session.toggle_options();
            }
            if panels.options_open {
                if ui.button("✏ Pencil").clicked() {
                    self.session.toggle_pencil();
                }
                if ui.button("↶ Undo").clicked() {
                    self.session.undo(&mut self.sink);
                }
                if ui.button("↷ Redo").clicked() {
                    self.session.redo(&mut self.sink);
                }
            }
            let target = self.session.view().toggled();
            if ui.button(format!("{} view", target.label())).clicked() {
                self.toggle_view();
            }
            if self.session.view() == ViewMode::View3D {
                let mut outline = panels.wall_outline;
                if ui.checkbox(&mut outline, "Wall outline").changed() {
                    self.session.toggle_wall_outline(&mut self.sink);
                }
            }
            if let Some(err) = &self.view_error {
                ui.colored_label(Color32::RED, err);
            }
        });

        if panels.options_open && panels.pencil_open {
            ui.horizontal(|ui| {
                for (name, color) in Color::palette() {
                    let button = egui::Button::new("    ").fill(color32(color));
                    if ui.add(button).on_hover_text(name).clicked() {
                        self.session.set_tool_color(color);
                    }
                }
                let (min, max) = self.session.tool().width_bounds();
                let mut width = self.session.tool().style().width;
                if ui
                    .add(egui::Slider::new(&mut width, min..=max).text("width"))
                    .changed()
                {
                    if let Err(err) = self.session.set_tool_width(width) {
                        tracing::warn!(%err, "pencil width rejected");
                    }
                }
            });
        }
    }

    fn forward_keys(&mut self, ctx: &egui::Context) {
        let (keys, modifiers) = ctx.input(|i| {
            let keys: Vec<KeyCode> = [
                (egui::Key::Z, KeyCode::Z),
                (egui::Key::Y, KeyCode::Y),
                (egui::Key::V, KeyCode::V),
                (egui::Key::O, KeyCode::O),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, code)| code)
            .collect();
            (
                keys,
                KeyModifiers {
                    ctrl: i.modifiers.command,
                    shift: i.modifiers.shift,
                },
            )
        });
        for key in keys {
            if let Err(err) = self
                .session
                .handle_key(KeyEvent { key, modifiers }, &mut self.sink)
            {
                self.view_error = Some(err.to_string());
            }
        }
    }

    fn forward_pointer(&mut self, ctx: &egui::Context, rect: Rect, hovered: bool) {
        let (pressed, released, latest, shift, scroll) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.modifiers.shift,
                i.raw_scroll_delta.y,
            )
        });
        let Some(pos) = latest else {
            return;
        };
        let local = pos - rect.min;
        let event = PointerEvent::new(local.x, local.y, shift);

        if hovered && scroll.abs() > f32::EPSILON {
            self.session.wheel(scroll / SCROLL_NOTCH);
        }
        if pressed && hovered {
            self.pointer_captured = true;
            self.session.pointer_down(event, &mut self.sink);
        }
        if self.tracker.update(pos, shift) && (hovered || self.pointer_captured) {
            self.session.pointer_move(event, &mut self.sink);
        }
        if released && self.pointer_captured {
            self.pointer_captured = false;
            self.session.pointer_up(event, &mut self.sink);
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let size = ui.available_size();
                let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
                self.session
                    .resize(Viewport::new(rect.width(), rect.height()), &mut self.sink);
                self.forward_keys(ctx);
                self.forward_pointer(ctx, rect, response.hovered());

                let painter = ui.painter_at(rect);
                match self.session.view() {
                    ViewMode::View2D => self.sink.paint_2d(&painter, rect),
                    ViewMode::View3D => {
                        self.session.animation_frame(&mut self.sink);
                        self.sink
                            .paint_3d(&painter, rect, self.session.settings().clear_color);
                        ctx.request_repaint();
                    }
                }
            });
    }
}
