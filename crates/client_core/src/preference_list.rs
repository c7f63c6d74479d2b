use std::{
    collections::{BTreeSet, HashSet},
    mem,
};

use shared::domain::{CourseId, CourseItem};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Available,
    Preference,
}

impl ListKind {
    pub fn other(self) -> Self {
        match self {
            Self::Available => Self::Preference,
            Self::Preference => Self::Available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Top,
    Bottom,
    Up,
    Down,
}

#[derive(Debug, Clone, Default)]
pub struct PreferenceLists {
    available: Vec<CourseItem>,
    preference: Vec<CourseItem>,
    selected_available: BTreeSet<CourseId>,
    selected_preference: BTreeSet<CourseId>,
    course_set: BTreeSet<CourseId>,
}

impl PreferenceLists {
    pub fn new(courses: Vec<CourseItem>) -> Self {
        let mut course_set = BTreeSet::new();
        let mut available = Vec::with_capacity(courses.len());
        for course in courses {
            if course_set.insert(course.course_id.clone()) {
                available.push(course);
            } else {
                warn!(course_id = %course.course_id, "dropping duplicate course from form data");
            }
        }

        Self {
            available,
            preference: Vec::new(),
            selected_available: BTreeSet::new(),
            selected_preference: BTreeSet::new(),
            course_set,
        }
    }

    pub fn available(&self) -> &[CourseItem] {
        &self.available
    }

    pub fn preference(&self) -> &[CourseItem] {
        &self.preference
    }

    pub fn list(&self, kind: ListKind) -> &[CourseItem] {
        match kind {
            ListKind::Available => &self.available,
            ListKind::Preference => &self.preference,
        }
    }

    pub fn contains(&self, kind: ListKind, course_id: &CourseId) -> bool {
        self.list(kind)
            .iter()
            .any(|course| &course.course_id == course_id)
    }

    pub fn preference_ids(&self) -> Vec<CourseId> {
        self.preference
            .iter()
            .map(|course| course.course_id.clone())
            .collect()
    }

    pub fn move_to_preference(&mut self, ids: &[CourseId], at_index: Option<usize>) -> bool {
        self.transfer(ListKind::Available, ids, at_index)
    }

    pub fn move_to_available(&mut self, ids: &[CourseId], at_index: Option<usize>) -> bool {
        self.transfer(ListKind::Preference, ids, at_index)
    }

    pub fn move_all_to_preference(&mut self) -> usize {
        if self.available.is_empty() {
            return 0;
        }
        let moved = mem::take(&mut self.available);
        let count = moved.len();
        self.preference.extend(moved);
        self.selected_available.clear();
        self.debug_check_invariant();
        count
    }

    pub fn reorder_within_preference(&mut self, ids: &[CourseId], direction: Direction) -> bool {
        let wanted: HashSet<&CourseId> = ids.iter().collect();
        let positions: Vec<usize> = self
            .preference
            .iter()
            .enumerate()
            .filter(|(_, course)| wanted.contains(&course.course_id))
            .map(|(index, _)| index)
            .collect();
        if positions.is_empty() {
            return false;
        }

        let before = self.preference_ids();
        match direction {
            Direction::Top | Direction::Bottom => {
                let (block, rest): (Vec<_>, Vec<_>) = mem::take(&mut self.preference)
                    .into_iter()
                    .partition(|course| wanted.contains(&course.course_id));
                self.preference = if direction == Direction::Top {
                    block.into_iter().chain(rest).collect()
                } else {
                    rest.into_iter().chain(block).collect()
                };
            }
            Direction::Up => {
                for index in positions {
                    if index == 0 {
                        continue;
                    }
                    self.preference.swap(index - 1, index);
                }
            }
            Direction::Down => {
                let last = self.preference.len() - 1;
                for index in positions.into_iter().rev() {
                    if index == last {
                        continue;
                    }
                    self.preference.swap(index, index + 1);
                }
            }
        }

        self.debug_check_invariant();
        before != self.preference_ids()
    }

    pub fn relocate(&mut self, kind: ListKind, from: usize, to: usize) -> bool {
        let list = self.list_mut(kind);
        if from >= list.len() {
            return false;
        }
        let item = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, item);
        self.debug_check_invariant();
        from != to
    }

    pub fn select(&mut self, kind: ListKind, course_id: &CourseId) -> bool {
        if !self.contains(kind, course_id) {
            return false;
        }
        self.selection_mut(kind).insert(course_id.clone())
    }

    pub fn deselect(&mut self, kind: ListKind, course_id: &CourseId) -> bool {
        self.selection_mut(kind).remove(course_id)
    }

    /// Returns whether the course is selected afterwards.
    pub fn toggle_selection(&mut self, kind: ListKind, course_id: &CourseId) -> bool {
        if self.deselect(kind, course_id) {
            return false;
        }
        self.select(kind, course_id)
    }

    pub fn clear_selection(&mut self, kind: ListKind) {
        self.selection_mut(kind).clear();
    }

    pub fn is_selected(&self, kind: ListKind, course_id: &CourseId) -> bool {
        self.selection(kind).contains(course_id)
    }

    pub fn selected_ids(&self, kind: ListKind) -> Vec<CourseId> {
        let selection = self.selection(kind);
        self.list(kind)
            .iter()
            .filter(|course| selection.contains(&course.course_id))
            .map(|course| course.course_id.clone())
            .collect()
    }

    pub fn move_selected_to_preference(&mut self, at_index: Option<usize>) -> bool {
        let ids = self.selected_ids(ListKind::Available);
        self.move_to_preference(&ids, at_index)
    }

    pub fn move_selected_to_available(&mut self, at_index: Option<usize>) -> bool {
        let ids = self.selected_ids(ListKind::Preference);
        self.move_to_available(&ids, at_index)
    }

    pub fn reorder_selected(&mut self, direction: Direction) -> bool {
        let ids = self.selected_ids(ListKind::Preference);
        self.reorder_within_preference(&ids, direction)
    }

    fn transfer(&mut self, from: ListKind, ids: &[CourseId], at_index: Option<usize>) -> bool {
        if ids.is_empty() || !ids.iter().all(|id| self.contains(from, id)) {
            return false;
        }

        let wanted: HashSet<&CourseId> = ids.iter().collect();
        let (moved, kept): (Vec<_>, Vec<_>) = mem::take(self.list_mut(from))
            .into_iter()
            .partition(|course| wanted.contains(&course.course_id));
        *self.list_mut(from) = kept;

        let source_selection = self.selection_mut(from);
        for course in &moved {
            source_selection.remove(&course.course_id);
        }

        let destination = self.list_mut(from.other());
        let at = at_index.unwrap_or(destination.len()).min(destination.len());
        destination.splice(at..at, moved);

        self.debug_check_invariant();
        true
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<CourseItem> {
        match kind {
            ListKind::Available => &mut self.available,
            ListKind::Preference => &mut self.preference,
        }
    }

    fn selection(&self, kind: ListKind) -> &BTreeSet<CourseId> {
        match kind {
            ListKind::Available => &self.selected_available,
            ListKind::Preference => &self.selected_preference,
        }
    }

    fn selection_mut(&mut self, kind: ListKind) -> &mut BTreeSet<CourseId> {
        match kind {
            ListKind::Available => &mut self.selected_available,
            ListKind::Preference => &mut self.selected_preference,
        }
    }

    fn debug_check_invariant(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let mut seen = BTreeSet::new();
        for course in self.available.iter().chain(&self.preference) {
            assert!(
                seen.insert(course.course_id.clone()),
                "course {} is present in both lists",
                course.course_id
            );
        }
        assert_eq!(
            seen, self.course_set,
            "course lists no longer cover the loaded course set"
        );
    }
}

#[cfg(test)]
#[path = "tests/preference_list_tests.rs"]
mod tests;
