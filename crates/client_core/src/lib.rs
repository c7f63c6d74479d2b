pub mod api;
pub mod drag;
pub mod gate;
pub mod notify;
pub mod preference_list;
pub mod workflow;

pub use api::{ClientError, HttpPreferenceApi, PreferenceApi, RequestContext};
pub use drag::{apply_drag, DragGesture, DragLocation, DragOutcome};
pub use gate::{ConfirmationGate, GateState, PrimaryOutcome, ReviewEntry, ReviewSummary};
pub use notify::{Notifier, RecordingNotifier, Toast, ToastKind};
pub use preference_list::{Direction, ListKind, PreferenceLists};
pub use workflow::{FormSession, PreferenceWorkflow, WorkflowError};
