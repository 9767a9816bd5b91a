use crate::sketch::model::{Color, Point, StrokeStore, StrokeStyle};
use crate::sketch::projection::Viewport;
use crate::sketch::settings::SketchSettings;

/// A single drawing instruction for the 2D surface adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
        color: Color,
    },
    Line {
        start: Point,
        end: Point,
        color: Color,
        width: f32,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Color,
    },
}

/// Transient decoration painted on top of the committed strokes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    /// In-progress pencil stroke, never stored.
    Preview {
        start: Point,
        end: Point,
        style: StrokeStyle,
    },
    /// Shift-hover: every segment under `pointer` uses the highlight color.
    Hover { pointer: Point },
}

/// Clears the whole surface and repaints every segment in insertion order.
pub fn redraw_canvas(
    store: &StrokeStore,
    viewport: Viewport,
    overlay: Overlay,
    settings: &SketchSettings,
) -> Vec<DrawCommand> {
    let handles_per_segment = if settings.show_handles { 2 } else { 0 };
    let mut commands = Vec::with_capacity(2 + store.len() * (1 + handles_per_segment));
    commands.push(DrawCommand::Clear {
        width: viewport.width,
        height: viewport.height,
        color: settings.clear_color,
    });

    let hovered: Vec<usize> = match overlay {
        Overlay::Hover { pointer } => store.hits_under(pointer, settings.hit_tolerance).collect(),
        _ => Vec::new(),
    };

    for (index, segment) in store.all().iter().enumerate() {
        let color = if hovered.contains(&index) {
            settings.highlight_color
        } else {
            segment.color()
        };
        commands.push(DrawCommand::Line {
            start: segment.start(),
            end: segment.end(),
            color,
            width: segment.width(),
        });
        if settings.show_handles {
            if let Some(radius) = segment.handle_radius() {
                for center in [segment.start(), segment.end()] {
                    commands.push(DrawCommand::Circle {
                        center,
                        radius,
                        color: segment.color(),
                    });
                }
            }
        }
    }

    if let Overlay::Preview { start, end, style } = overlay {
        commands.push(DrawCommand::Line {
            start,
            end,
            color: style.color,
            width: style.width,
        });
    }
    commands
}

pub fn line_count(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::Line { .. }))
        .count()
}
