use std::sync::Arc;

use crate::config::Config;
use crate::providers::TutorProvider;
use crate::ratelimit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
    pub provider: Arc<dyn TutorProvider>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn TutorProvider>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.min_delay));
        Self {
            config: Arc::new(config),
            limiter,
            provider,
        }
    }
}
