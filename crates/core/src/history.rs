//! Annotation store with snapshot history
//!
//! Every mutation appends a full snapshot of the annotation set and moves
//! the cursor to it; undo and redo only move the cursor. The live set is
//! always `snapshots[cursor]`.
//!
//! The log is append-only. Snapshots hold annotations behind `Arc`, so a
//! snapshot costs one pointer per annotation plus whatever the mutation
//! created. Select-drag records one snapshot per pointer move, so long
//! drags grow the log quickly; that is accepted for interactive sessions.

use crate::annotation::{Annotation, AnnotationId, AnnotationSet, Point};
use crate::error::{EngineError, EngineResult};
use std::sync::Arc;

/// Owner of the live annotation set and its undo/redo history
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    snapshots: Vec<AnnotationSet>,
    cursor: usize,
}

impl AnnotationStore {
    /// Create a store holding one empty snapshot
    pub fn new() -> Self {
        Self {
            snapshots: vec![AnnotationSet::new()],
            cursor: 0,
        }
    }

    /// The live annotation set
    pub fn current(&self) -> &AnnotationSet {
        &self.snapshots[self.cursor]
    }

    /// Index of the live snapshot
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of snapshots in the history
    pub fn history_len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Append a validated annotation on top of the z-order
    pub fn add(&mut self, annotation: Annotation) -> EngineResult<AnnotationId> {
        annotation.validate()?;

        let id = annotation.id();
        if self.current().contains(id) {
            return Err(EngineError::DuplicateId(id));
        }

        let mut next = self.current().clone();
        next.push(annotation);
        self.record(next);
        tracing::debug!(%id, cursor = self.cursor, "annotation added");
        Ok(id)
    }

    /// Remove an annotation; no snapshot is recorded when it is absent
    pub fn remove(&mut self, id: AnnotationId) -> Option<Arc<Annotation>> {
        let mut next = self.current().clone();
        let removed = next.remove(id)?;
        self.record(next);
        tracing::debug!(%id, cursor = self.cursor, "annotation removed");
        Some(removed)
    }

    /// Translate every point of an annotation by `delta`
    ///
    /// Returns false (and records nothing) when the annotation is absent.
    pub fn move_by(&mut self, id: AnnotationId, delta: Point) -> bool {
        let Some(moved) = self.current().get(id).map(|a| a.translated(delta)) else {
            return false;
        };

        let mut next = self.current().clone();
        next.replace(moved);
        self.record(next);
        tracing::trace!(%id, dx = delta.x, dy = delta.y, cursor = self.cursor, "annotation moved");
        true
    }

    /// Step back one snapshot; no-op at the earliest
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "undo");
        true
    }

    /// Step forward one snapshot; no-op at the latest
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "redo");
        true
    }

    /// Drop all annotations and history (used when a new image is loaded)
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.snapshots.push(AnnotationSet::new());
        self.cursor = 0;
    }

    /// Truncate the redo future, append `next` and make it live
    fn record(&mut self, next: AnnotationSet) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(next);
        self.cursor = self.snapshots.len() - 1;
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}
