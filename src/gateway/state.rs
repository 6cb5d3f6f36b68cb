use std::sync::Arc;

use crate::service::RecommendationService;

#[derive(Clone)]
pub struct HandlerState {
    pub service: Arc<RecommendationService>,
}

impl HandlerState {
    pub fn new(service: Arc<RecommendationService>) -> Self {
        Self { service }
    }
}
