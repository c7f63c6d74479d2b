use tracing::debug;

use crate::preference_list::{ListKind, PreferenceLists};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub list: ListKind,
    pub index: usize,
}

impl DragLocation {
    pub fn new(list: ListKind, index: usize) -> Self {
        Self { list, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
}

impl DragGesture {
    pub fn new(source: DragLocation, destination: Option<DragLocation>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Reordered,
    Moved,
    Ignored,
}

/// Applies one gesture; at most one item changes place.
pub fn apply_drag(lists: &mut PreferenceLists, gesture: DragGesture) -> DragOutcome {
    let Some(destination) = gesture.destination else {
        debug!(source = ?gesture.source, "drag dropped outside any list");
        return DragOutcome::Ignored;
    };
    let source = gesture.source;

    if source.list == destination.list {
        return if lists.relocate(source.list, source.index, destination.index) {
            DragOutcome::Reordered
        } else {
            DragOutcome::Ignored
        };
    }

    let Some(course) = lists.list(source.list).get(source.index) else {
        debug!(?source, "drag source index out of range");
        return DragOutcome::Ignored;
    };
    let ids = [course.course_id.clone()];

    let moved = match destination.list {
        ListKind::Preference => lists.move_to_preference(&ids, Some(destination.index)),
        ListKind::Available => lists.move_to_available(&ids, Some(destination.index)),
    };
    if moved {
        DragOutcome::Moved
    } else {
        DragOutcome::Ignored
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
