use super::*;
use crate::{
    drag::DragLocation,
    notify::{RecordingNotifier, Toast, ToastKind},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{CourseItem, TeacherSummary},
    protocol::PreferenceFormResponse,
};
use std::sync::Arc;
use tokio::sync::Mutex;

type Submission = (TeacherInitial, CourseCategory, Vec<CourseId>);

#[derive(Clone, Default)]
struct FakePreferenceApi {
    courses: Vec<CourseItem>,
    fail_load: Arc<Mutex<bool>>,
    fail_submit: Arc<Mutex<bool>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl FakePreferenceApi {
    fn with_courses(courses: &[(&str, &str)]) -> Self {
        Self {
            courses: courses
                .iter()
                .map(|(id, name)| CourseItem::new(*id, *name))
                .collect(),
            ..Self::default()
        }
    }

    fn rejection() -> ClientError {
        ClientError::Server {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: None,
        }
    }
}

#[async_trait]
impl PreferenceApi for FakePreferenceApi {
    async fn load_form(
        &self,
        initial: &TeacherInitial,
        _category: CourseCategory,
    ) -> Result<PreferenceFormResponse, ClientError> {
        if *self.fail_load.lock().await {
            return Err(Self::rejection());
        }
        Ok(PreferenceFormResponse {
            teacher: TeacherSummary {
                initial: initial.clone(),
                name: "Test Teacher".to_string(),
            },
            courses: self.courses.clone(),
        })
    }

    async fn submit_preferences(
        &self,
        initial: &TeacherInitial,
        category: CourseCategory,
        preferences: &[CourseId],
    ) -> Result<SubmitPreferencesResponse, ClientError> {
        if *self.fail_submit.lock().await {
            return Err(Self::rejection());
        }
        self.submissions
            .lock()
            .await
            .push((initial.clone(), category, preferences.to_vec()));
        Ok(SubmitPreferencesResponse::default())
    }
}

fn ids(values: &[&str]) -> Vec<CourseId> {
    values.iter().map(|value| CourseId::from(*value)).collect()
}

async fn load(
    api: FakePreferenceApi,
) -> (
    PreferenceWorkflow<FakePreferenceApi, RecordingNotifier>,
    Arc<RecordingNotifier>,
) {
    let notifier = Arc::new(RecordingNotifier::new());
    let workflow = PreferenceWorkflow::load(
        &Arc::new(api),
        &notifier,
        TeacherInitial::from("MMA"),
        CourseCategory::Theory,
    )
    .await
    .expect("load");
    (workflow, notifier)
}

#[tokio::test]
async fn full_scenario_submits_ranked_ids() {
    let api = FakePreferenceApi::with_courses(&[("A", "Algo"), ("B", "Bio"), ("C", "Calc")]);
    let submissions = api.submissions.clone();
    let (mut workflow, notifier) = load(api).await;
    assert_eq!(workflow.session().teacher_name, "Test Teacher");

    workflow
        .move_to_preference(&ids(&["B"]), Some(0))
        .expect("move B");
    workflow
        .move_to_preference(&ids(&["C"]), Some(1))
        .expect("move C");
    assert_eq!(
        workflow.primary_action().expect("collect"),
        PrimaryOutcome::CollectedRemaining(1)
    );
    assert_eq!(workflow.lists().preference_ids(), ids(&["B", "C", "A"]));
    assert_eq!(workflow.state(), GateState::Editing);

    assert_eq!(
        workflow.primary_action().expect("review"),
        PrimaryOutcome::Reviewing
    );
    assert_eq!(
        workflow.review().expect("summary").to_string(),
        "1. B - Bio\n2. C - Calc\n3. A - Algo"
    );

    workflow.confirm().await.expect("confirm");
    assert_eq!(workflow.state(), GateState::Submitted);

    let submissions = submissions.lock().await;
    assert_eq!(
        submissions.as_slice(),
        &[(
            TeacherInitial::from("MMA"),
            CourseCategory::Theory,
            ids(&["B", "C", "A"])
        )]
    );
    assert_eq!(
        notifier.drain(),
        vec![Toast {
            kind: ToastKind::Success,
            message: "Preferences saved for MMA".to_string(),
        }]
    );
}

#[tokio::test]
async fn empty_form_reviews_with_explicit_empty_state() {
    let (mut workflow, _notifier) = load(FakePreferenceApi::default()).await;
    assert_eq!(
        workflow.primary_action().expect("review"),
        PrimaryOutcome::Reviewing
    );
    assert_eq!(
        workflow.review().expect("summary"),
        ReviewSummary::NoCoursesSelected
    );
}

#[tokio::test]
async fn edits_are_rejected_outside_editing() {
    let api = FakePreferenceApi::with_courses(&[("A", "Algo"), ("B", "Bio")]);
    let (mut workflow, _notifier) = load(api).await;
    workflow.primary_action().expect("collect");
    workflow.primary_action().expect("review");

    let err = workflow
        .reorder(&ids(&["B"]), Direction::Top)
        .expect_err("read-only review");
    assert!(matches!(err, WorkflowError::NotEditable(GateState::Reviewing)));

    workflow.cancel_review().expect("cancel");
    assert!(workflow.reorder(&ids(&["B"]), Direction::Top).expect("edit"));
    assert_eq!(workflow.lists().preference_ids(), ids(&["B", "A"]));

    workflow.primary_action().expect("review again");
    workflow.confirm().await.expect("confirm");
    assert!(matches!(
        workflow.move_to_available(&ids(&["A"]), None),
        Err(WorkflowError::NotEditable(GateState::Submitted))
    ));
    assert!(matches!(
        workflow.primary_action(),
        Err(WorkflowError::InvalidTransition(GateState::Submitted))
    ));
}

#[tokio::test]
async fn confirm_requires_review() {
    let (mut workflow, _notifier) = load(FakePreferenceApi::default()).await;
    assert!(matches!(
        workflow.confirm().await,
        Err(WorkflowError::InvalidTransition(GateState::Editing))
    ));
}

#[tokio::test]
async fn failed_submission_reopens_review_and_can_be_retried() {
    let api = FakePreferenceApi::with_courses(&[("A", "Algo")]);
    let fail_submit = api.fail_submit.clone();
    let submissions = api.submissions.clone();
    *fail_submit.lock().await = true;
    let (mut workflow, notifier) = load(api).await;

    workflow.primary_action().expect("collect");
    workflow.primary_action().expect("review");
    let err = workflow.confirm().await.expect_err("must fail");
    assert!(matches!(err, WorkflowError::Submit(_)));
    assert_eq!(workflow.state(), GateState::Reviewing);
    assert_eq!(workflow.lists().preference_ids(), ids(&["A"]));

    let toasts = notifier.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Failure);
    assert!(toasts[0].message.starts_with("Could not save preferences for MMA"));

    *fail_submit.lock().await = false;
    workflow.confirm().await.expect("retry");
    assert_eq!(workflow.state(), GateState::Submitted);
    assert_eq!(submissions.lock().await.len(), 1);
}

#[tokio::test]
async fn load_failure_raises_a_toast_and_can_be_retried() {
    let fake = FakePreferenceApi::with_courses(&[("A", "Algo")]);
    let fail_load = fake.fail_load.clone();
    *fail_load.lock().await = true;
    let api = Arc::new(fake);
    let notifier = Arc::new(RecordingNotifier::new());

    let result = PreferenceWorkflow::load(
        &api,
        &notifier,
        TeacherInitial::from("MMA"),
        CourseCategory::Sessional,
    )
    .await;

    assert!(matches!(result, Err(WorkflowError::Load(_))));
    let toasts = notifier.snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Failure);
    assert!(toasts[0]
        .message
        .starts_with("Could not load sessional preferences for MMA"));

    *fail_load.lock().await = false;
    let workflow = PreferenceWorkflow::load(
        &api,
        &notifier,
        TeacherInitial::from("MMA"),
        CourseCategory::Sessional,
    )
    .await
    .expect("retry with the same transport");
    assert_eq!(workflow.lists().available().len(), 1);
    assert_eq!(workflow.state(), GateState::Editing);
}

#[tokio::test]
async fn drag_and_selection_drive_the_same_lists() {
    let api = FakePreferenceApi::with_courses(&[("A", "Algo"), ("B", "Bio"), ("C", "Calc")]);
    let (mut workflow, _notifier) = load(api).await;

    let outcome = workflow
        .drag(DragGesture::new(
            DragLocation::new(ListKind::Available, 2),
            Some(DragLocation::new(ListKind::Preference, 0)),
        ))
        .expect("drag");
    assert_eq!(outcome, DragOutcome::Moved);

    assert!(workflow
        .toggle_selection(ListKind::Available, &CourseId::from("A"))
        .expect("select"));
    assert!(workflow.move_selected_to_preference(None).expect("move"));
    assert_eq!(workflow.lists().preference_ids(), ids(&["C", "A"]));

    workflow
        .toggle_selection(ListKind::Preference, &CourseId::from("A"))
        .expect("select");
    assert!(workflow.reorder_selected(Direction::Up).expect("up"));
    assert_eq!(workflow.lists().preference_ids(), ids(&["A", "C"]));

    assert!(workflow.move_selected_to_available(Some(0)).expect("back"));
    workflow.clear_selection(ListKind::Preference).expect("clear");
    assert_eq!(workflow.lists().available().len(), 2);
    assert_eq!(workflow.lists().available()[0].course_id, CourseId::from("A"));
}
