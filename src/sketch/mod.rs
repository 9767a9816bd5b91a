pub mod camera;
pub mod geometry;
pub mod history;
pub mod input;
pub mod model;
pub mod panels;
pub mod projection;
pub mod render;
pub mod render_loop;
pub mod session;
pub mod settings;
pub mod view;

pub use session::{DrawingSession, FrameSink, SessionEvent};
pub use view::{ViewError, ViewMode};
