// Application state for HTTP handlers
use crate::application::period_service::PeriodService;

#[derive(Clone)]
pub struct AppState {
    pub period_service: PeriodService,
}
