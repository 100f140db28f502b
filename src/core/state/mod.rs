mod app_state;
pub mod selection;
pub mod terms;

pub use app_state::{
    build_time_api_base, default_data_dir, refresh_train_list, refresh_train_list_from,
    resolve_api_base, AppState, DownloadBehavior, ManagerSettings, API_BASE_ENV,
};
pub use selection::SelectionState;
pub use terms::{GateDecision, TermsGate, TermsPrompt};
