use crate::sketch::model::{Segment, StrokeStore};

/// Snapshot-based undo/redo. Every entry is an owned copy of the whole
/// stroke sequence, so later in-place drags never reach into history.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SketchHistory {
    undo_stack: Vec<Vec<Segment>>,
    redo_stack: Vec<Vec<Segment>>,
    limit: usize,
}

impl SketchHistory {
    /// `limit == 0` keeps every snapshot.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn record_before_mutation(&mut self, store: &StrokeStore) {
        self.undo_stack.push(store.all().to_vec());
        self.redo_stack.clear();
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            let overflow = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..overflow);
        }
    }

    pub fn undo(&mut self, store: &mut StrokeStore) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(store.all().to_vec());
        store.replace_all(snapshot);
        true
    }

    pub fn redo(&mut self, store: &mut StrokeStore) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(store.all().to_vec());
        store.replace_all(snapshot);
        true
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
