use std::fmt;

use shared::domain::{CourseId, CourseItem};

use crate::preference_list::PreferenceLists;

pub const REVIEW_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Editing,
    Reviewing,
    Submitted,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Editing => "editing",
            Self::Reviewing => "reviewing",
            Self::Submitted => "submitted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryOutcome {
    CollectedRemaining(usize),
    Reviewing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub rank: usize,
    pub course_id: CourseId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewSummary {
    NoCoursesSelected,
    Ranked {
        entries: Vec<ReviewEntry>,
        remaining: usize,
    },
}

impl ReviewSummary {
    pub fn from_preference(preference: &[CourseItem]) -> Self {
        if preference.is_empty() {
            return Self::NoCoursesSelected;
        }
        let entries = preference
            .iter()
            .take(REVIEW_PREVIEW_LIMIT)
            .enumerate()
            .map(|(index, course)| ReviewEntry {
                rank: index + 1,
                course_id: course.course_id.clone(),
                name: course.name.clone(),
            })
            .collect();
        Self::Ranked {
            entries,
            remaining: preference.len().saturating_sub(REVIEW_PREVIEW_LIMIT),
        }
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCoursesSelected => f.write_str("No courses selected"),
            Self::Ranked { entries, remaining } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{}. {} - {}", entry.rank, entry.course_id, entry.name)?;
                }
                if *remaining > 0 {
                    write!(f, "\n... and {remaining} more")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition(pub GateState);

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationGate {
    state: GateState,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == GateState::Editing
    }

    /// Review is only reachable once nothing is left in the available list.
    pub fn primary_action(
        &mut self,
        lists: &mut PreferenceLists,
    ) -> Result<PrimaryOutcome, InvalidTransition> {
        if self.state != GateState::Editing {
            return Err(InvalidTransition(self.state));
        }
        if !lists.available().is_empty() {
            return Ok(PrimaryOutcome::CollectedRemaining(
                lists.move_all_to_preference(),
            ));
        }
        self.state = GateState::Reviewing;
        Ok(PrimaryOutcome::Reviewing)
    }

    pub fn review(&self, lists: &PreferenceLists) -> Result<ReviewSummary, InvalidTransition> {
        if self.state != GateState::Reviewing {
            return Err(InvalidTransition(self.state));
        }
        Ok(ReviewSummary::from_preference(lists.preference()))
    }

    pub fn cancel(&mut self) -> Result<(), InvalidTransition> {
        self.transition(GateState::Reviewing, GateState::Editing)
    }

    pub fn confirm(&mut self) -> Result<(), InvalidTransition> {
        self.transition(GateState::Reviewing, GateState::Submitted)
    }

    pub fn reopen_review(&mut self) -> Result<(), InvalidTransition> {
        self.transition(GateState::Submitted, GateState::Reviewing)
    }

    fn transition(&mut self, from: GateState, to: GateState) -> Result<(), InvalidTransition> {
        if self.state != from {
            return Err(InvalidTransition(self.state));
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gate_tests.rs"]
mod tests;
