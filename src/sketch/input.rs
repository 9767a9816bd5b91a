use crate::sketch::history::SketchHistory;
use crate::sketch::model::{Endpoint, Point, Segment, StrokeStore, StrokeStyle};
use crate::sketch::render::Overlay;
use crate::sketch::settings::SketchSettings;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub position: Point,
    pub shift: bool,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, shift: bool) -> Self {
        Self {
            position: Point::new(x, y),
            shift,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerState {
    Idle,
    Drawing {
        start: Point,
    },
    DraggingSegment {
        index: usize,
        original_start: Point,
        original_end: Point,
        drag_start: Point,
    },
    DraggingEndpoint {
        index: usize,
        endpoint: Endpoint,
        /// Pointer minus handle center at grab time.
        offset: (f32, f32),
        original: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    None,
    /// Repaint the 2D surface with the given overlay; the store is unchanged.
    Redraw(Overlay),
    /// A new segment was appended at `index` after a history snapshot.
    Committed { index: usize },
    /// The segment at `index` was changed in place by a drag.
    Moved { index: usize },
}

/// Everything a pointer interaction may read or change.
pub struct EditTarget<'a> {
    pub store: &'a mut StrokeStore,
    pub history: &'a mut SketchHistory,
    pub tool: StrokeStyle,
    pub settings: &'a SketchSettings,
}

/// Pointer state machine of the 2D editing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EditingSurface {
    state: PointerState,
    hovering: bool,
}

impl Default for EditingSurface {
    fn default() -> Self {
        Self {
            state: PointerState::Idle,
            hovering: false,
        }
    }
}

impl EditingSurface {
    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, PointerState::Idle)
    }

    pub fn pointer_down(&mut self, event: PointerEvent, target: EditTarget<'_>) -> PointerOutcome {
        let finished = if self.is_idle() {
            PointerOutcome::None
        } else {
            // The previous pointer-up never arrived; finish it here.
            self.pointer_up(
                event,
                EditTarget {
                    store: &mut *target.store,
                    history: &mut *target.history,
                    tool: target.tool,
                    settings: target.settings,
                },
            )
        };

        let started = self.begin(event, target.store, target.settings);
        match started {
            PointerOutcome::None => finished,
            other => other,
        }
    }

    fn begin(
        &mut self,
        event: PointerEvent,
        store: &StrokeStore,
        settings: &SketchSettings,
    ) -> PointerOutcome {
        let point = event.position;
        if !event.shift {
            self.state = PointerState::Drawing { start: point };
            return PointerOutcome::None;
        }

        if let Some((index, endpoint)) = store.hit_endpoint_handle(point) {
            if let Some(segment) = store.get(index) {
                let center = segment.endpoint(endpoint);
                self.state = PointerState::DraggingEndpoint {
                    index,
                    endpoint,
                    offset: point.delta_from(center),
                    original: center,
                };
                return PointerOutcome::None;
            }
        }

        if let Some(index) = store.hit_segment(point, settings.hit_tolerance) {
            if let Some(segment) = store.get(index) {
                self.state = PointerState::DraggingSegment {
                    index,
                    original_start: segment.start(),
                    original_end: segment.end(),
                    drag_start: point,
                };
            }
        }
        PointerOutcome::None
    }

    pub fn pointer_move(&mut self, event: PointerEvent, target: EditTarget<'_>) -> PointerOutcome {
        let point = event.position;
        match self.state {
            PointerState::Idle => {
                if event.shift {
                    self.hovering = true;
                    PointerOutcome::Redraw(Overlay::Hover { pointer: point })
                } else if std::mem::take(&mut self.hovering) {
                    PointerOutcome::Redraw(Overlay::None)
                } else {
                    PointerOutcome::None
                }
            }
            PointerState::Drawing { start } => PointerOutcome::Redraw(Overlay::Preview {
                start,
                end: point,
                style: target.tool,
            }),
            PointerState::DraggingSegment {
                index,
                original_start,
                original_end,
                drag_start,
            } => {
                let delta = point.delta_from(drag_start);
                if target
                    .store
                    .translate_segment(index, original_start, original_end, delta)
                {
                    PointerOutcome::Moved { index }
                } else {
                    self.state = PointerState::Idle;
                    PointerOutcome::None
                }
            }
            PointerState::DraggingEndpoint {
                index,
                endpoint,
                offset,
                ..
            } => {
                let position = point.offset(-offset.0, -offset.1);
                if target.store.move_endpoint(index, endpoint, position) {
                    PointerOutcome::Moved { index }
                } else {
                    self.state = PointerState::Idle;
                    PointerOutcome::None
                }
            }
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent, target: EditTarget<'_>) -> PointerOutcome {
        let state = std::mem::replace(&mut self.state, PointerState::Idle);
        match state {
            PointerState::Idle => PointerOutcome::None,
            PointerState::Drawing { start } => {
                let Ok(segment) = Segment::new(start, event.position, target.tool) else {
                    // Clears any preview left by moves that returned to the start.
                    return PointerOutcome::Redraw(Overlay::None);
                };
                let segment = if target.settings.show_handles {
                    segment.with_handle_radius(target.settings.handle_radius)
                } else {
                    segment
                };
                target.history.record_before_mutation(target.store);
                match target.store.append(segment) {
                    Ok(index) => {
                        tracing::debug!(
                            index,
                            start_x = start.x,
                            start_y = start.y,
                            end_x = event.position.x,
                            end_y = event.position.y,
                            "segment committed"
                        );
                        PointerOutcome::Committed { index }
                    }
                    Err(err) => {
                        tracing::warn!(%err, "segment rejected by stroke store");
                        PointerOutcome::Redraw(Overlay::None)
                    }
                }
            }
            drag => settle_drag(drag, target.store),
        }
    }

    /// Ends any interaction without a pointer-up: a pencil stroke is
    /// dropped, a drag is settled exactly as a release would settle it.
    pub fn finish(&mut self, store: &mut StrokeStore) -> PointerOutcome {
        self.hovering = false;
        match std::mem::replace(&mut self.state, PointerState::Idle) {
            PointerState::Idle => PointerOutcome::None,
            PointerState::Drawing { .. } => PointerOutcome::Redraw(Overlay::None),
            drag => settle_drag(drag, store),
        }
    }
}

/// An endpoint drag may not leave a zero-length segment behind.
fn settle_drag(state: PointerState, store: &mut StrokeStore) -> PointerOutcome {
    let PointerState::DraggingEndpoint {
        index,
        endpoint,
        original,
        ..
    } = state
    else {
        return PointerOutcome::Redraw(Overlay::None);
    };
    let collapsed = store
        .get(index)
        .map(Segment::is_zero_length)
        .unwrap_or(false);
    if collapsed {
        store.move_endpoint(index, endpoint, original);
        return PointerOutcome::Moved { index };
    }
    PointerOutcome::Redraw(Overlay::None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Z,
    Y,
    V,
    O,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Undo,
    Redo,
    ToggleView,
    ToggleOptions,
}

pub fn map_key_event_to_command(event: KeyEvent) -> Option<KeyCommand> {
    match (event.key, event.modifiers) {
        (KeyCode::Z, KeyModifiers { ctrl: true, shift: false }) => Some(KeyCommand::Undo),
        (KeyCode::Z, KeyModifiers { ctrl: true, shift: true }) => Some(KeyCommand::Redo),
        (KeyCode::Y, KeyModifiers { ctrl: true, .. }) => Some(KeyCommand::Redo),
        (KeyCode::V, KeyModifiers { ctrl: false, .. }) => Some(KeyCommand::ToggleView),
        (KeyCode::O, KeyModifiers { ctrl: false, .. }) => Some(KeyCommand::ToggleOptions),
        _ => None,
    }
}
