use crate::sketch::model::{Color, SketchError, StrokeStyle};
use crate::sketch::settings::SketchSettings;

/// Current pencil selection; applied to a stroke when it is committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    style: StrokeStyle,
    min_width: f32,
    max_width: f32,
}

impl ToolState {
    pub fn from_settings(settings: &SketchSettings) -> Self {
        Self {
            style: StrokeStyle {
                width: settings
                    .pencil_width
                    .clamp(settings.min_width, settings.max_width),
                color: settings.pencil_color,
            },
            min_width: settings.min_width,
            max_width: settings.max_width,
        }
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn width_bounds(&self) -> (f32, f32) {
        (self.min_width, self.max_width)
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    /// Clamps into the configured bounds; non-finite widths are rejected.
    pub fn set_width(&mut self, width: f32) -> Result<f32, SketchError> {
        if !width.is_finite() {
            return Err(SketchError::InvalidWidth(width));
        }
        self.style.width = width.clamp(self.min_width, self.max_width);
        Ok(self.style.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolPanels {
    pub options_open: bool,
    pub pencil_open: bool,
    pub wall_outline: bool,
}

impl ToolPanels {
    pub fn new(wall_outline: bool) -> Self {
        Self {
            options_open: true,
            pencil_open: false,
            wall_outline,
        }
    }

    /// Closing the options panel hides the pencil panel with it.
    pub fn toggle_options(&mut self) {
        self.set_options_open(!self.options_open);
    }

    pub fn set_options_open(&mut self, open: bool) {
        self.options_open = open;
        if !open {
            self.pencil_open = false;
        }
    }

    pub fn toggle_pencil(&mut self) {
        self.pencil_open = !self.pencil_open && self.options_open;
    }

    pub fn toggle_wall_outline(&mut self) -> bool {
        self.wall_outline = !self.wall_outline;
        self.wall_outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_clamped_to_bounds() {
        let mut tool = ToolState::from_settings(&SketchSettings::default());
        assert_eq!(tool.set_width(50.0), Ok(20.0));
        assert_eq!(tool.set_width(0.0), Ok(1.0));
        assert_eq!(tool.set_width(4.5), Ok(4.5));
        assert!(tool.set_width(f32::NAN).is_err());
        assert_eq!(tool.style().width, 4.5);
    }

    #[test]
    fn closing_options_hides_pencil_panel() {
        let mut panels = ToolPanels::new(false);
        panels.toggle_pencil();
        assert!(panels.pencil_open);
        panels.toggle_options();
        assert!(!panels.options_open);
        assert!(!panels.pencil_open);
        panels.toggle_pencil();
        assert!(!panels.pencil_open);
    }

    #[test]
    fn wall_outline_toggle_flips() {
        let mut panels = ToolPanels::new(false);
        assert!(panels.toggle_wall_outline());
        assert!(!panels.toggle_wall_outline());
    }
}
