use std::sync::Arc;

use crate::services::pipeline_service::HistoricPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<HistoricPipeline>,
}
