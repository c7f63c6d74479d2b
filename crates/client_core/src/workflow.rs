use std::sync::Arc;

use shared::{
    domain::{CourseCategory, CourseId, TeacherInitial},
    protocol::SubmitPreferencesResponse,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    api::{ClientError, PreferenceApi},
    drag::{apply_drag, DragGesture, DragOutcome},
    gate::{ConfirmationGate, GateState, InvalidTransition, PrimaryOutcome, ReviewSummary},
    notify::Notifier,
    preference_list::{Direction, ListKind, PreferenceLists},
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("preferences cannot be changed while {0}")]
    NotEditable(GateState),
    #[error("action not available while {0}")]
    InvalidTransition(GateState),
    #[error("failed to load preference form: {0}")]
    Load(#[source] ClientError),
    #[error("failed to submit preferences: {0}")]
    Submit(#[source] ClientError),
}

impl From<InvalidTransition> for WorkflowError {
    fn from(value: InvalidTransition) -> Self {
        Self::InvalidTransition(value.0)
    }
}

#[derive(Debug, Clone)]
pub struct FormSession {
    pub initial: TeacherInitial,
    pub teacher_name: String,
    pub category: CourseCategory,
    pub lists: PreferenceLists,
}

pub struct PreferenceWorkflow<A, N> {
    api: Arc<A>,
    notifier: Arc<N>,
    session: FormSession,
    gate: ConfirmationGate,
}

impl<A: PreferenceApi, N: Notifier> PreferenceWorkflow<A, N> {
    pub async fn load(
        api: &Arc<A>,
        notifier: &Arc<N>,
        initial: TeacherInitial,
        category: CourseCategory,
    ) -> Result<Self, WorkflowError> {
        let form = match api.load_form(&initial, category).await {
            Ok(form) => form,
            Err(e) => {
                error!(%initial, %category, error = %e, "preferences: form load failed");
                notifier.failure(format!(
                    "Could not load {category} preferences for {initial}: {e}"
                ));
                return Err(WorkflowError::Load(e));
            }
        };

        let session = FormSession {
            initial,
            teacher_name: form.teacher.name,
            category,
            lists: PreferenceLists::new(form.courses),
        };
        Ok(Self {
            api: Arc::clone(api),
            notifier: Arc::clone(notifier),
            session,
            gate: ConfirmationGate::new(),
        })
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn lists(&self) -> &PreferenceLists {
        &self.session.lists
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn move_to_preference(
        &mut self,
        ids: &[CourseId],
        at_index: Option<usize>,
    ) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.move_to_preference(ids, at_index))
    }

    pub fn move_to_available(
        &mut self,
        ids: &[CourseId],
        at_index: Option<usize>,
    ) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.move_to_available(ids, at_index))
    }

    pub fn reorder(&mut self, ids: &[CourseId], direction: Direction) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.reorder_within_preference(ids, direction))
    }

    pub fn drag(&mut self, gesture: DragGesture) -> Result<DragOutcome, WorkflowError> {
        self.edit(|lists| apply_drag(lists, gesture))
    }

    pub fn toggle_selection(
        &mut self,
        list: ListKind,
        course_id: &CourseId,
    ) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.toggle_selection(list, course_id))
    }

    pub fn clear_selection(&mut self, list: ListKind) -> Result<(), WorkflowError> {
        self.edit(|lists| lists.clear_selection(list))
    }

    pub fn move_selected_to_preference(
        &mut self,
        at_index: Option<usize>,
    ) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.move_selected_to_preference(at_index))
    }

    pub fn move_selected_to_available(
        &mut self,
        at_index: Option<usize>,
    ) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.move_selected_to_available(at_index))
    }

    pub fn reorder_selected(&mut self, direction: Direction) -> Result<bool, WorkflowError> {
        self.edit(|lists| lists.reorder_selected(direction))
    }

    pub fn primary_action(&mut self) -> Result<PrimaryOutcome, WorkflowError> {
        let outcome = self.gate.primary_action(&mut self.session.lists)?;
        debug!(initial = %self.session.initial, ?outcome, "preferences: primary action");
        Ok(outcome)
    }

    pub fn review(&self) -> Result<ReviewSummary, WorkflowError> {
        Ok(self.gate.review(&self.session.lists)?)
    }

    pub fn cancel_review(&mut self) -> Result<(), WorkflowError> {
        Ok(self.gate.cancel()?)
    }

    /// A failed request reopens the review so the user can confirm again.
    pub async fn confirm(&mut self) -> Result<SubmitPreferencesResponse, WorkflowError> {
        self.gate.confirm()?;
        let initial = &self.session.initial;
        let category = self.session.category;
        let preferences = self.session.lists.preference_ids();

        match self
            .api
            .submit_preferences(initial, category, &preferences)
            .await
        {
            Ok(response) => {
                info!(%initial, %category, ranked = preferences.len(), "preferences: session complete");
                self.notifier
                    .success(format!("Preferences saved for {initial}"));
                Ok(response)
            }
            Err(e) => {
                error!(%initial, %category, error = ?e, "preferences: submission failed");
                self.notifier
                    .failure(format!("Could not save preferences for {initial}: {e}"));
                let reopened = self.gate.reopen_review();
                debug_assert!(reopened.is_ok(), "gate left submitted state early");
                Err(WorkflowError::Submit(e))
            }
        }
    }

    fn edit<T>(&mut self, f: impl FnOnce(&mut PreferenceLists) -> T) -> Result<T, WorkflowError> {
        if !self.gate.is_editing() {
            return Err(WorkflowError::NotEditable(self.gate.state()));
        }
        Ok(f(&mut self.session.lists))
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
