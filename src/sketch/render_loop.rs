use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

/// The frame-producing side of a render loop. The host asks for one frame
/// per display refresh; every request polls the cancellation flag first.
#[derive(Debug)]
pub struct RenderLoop {
    id: u64,
    cancelled: Arc<AtomicBool>,
    frames: u64,
}

/// Cancellation side of a [`RenderLoop`]. Cloning shares the same flag.
#[derive(Debug, Clone)]
pub struct RenderLoopHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl RenderLoop {
    pub fn start() -> (RenderLoop, RenderLoopHandle) {
        let id = NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        tracing::debug!(loop_id = id, "render loop started");
        (
            RenderLoop {
                id,
                cancelled: Arc::clone(&cancelled),
                frames: 0,
            },
            RenderLoopHandle { id, cancelled },
        )
    }

    /// Returns `true` when a frame should be rendered now.
    pub fn next_frame(&mut self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl RenderLoopHandle {
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!(loop_id = self.id, "render loop cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
