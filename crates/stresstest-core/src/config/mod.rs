pub mod model;
pub mod validation;

pub use model::{RunConfig, DEFAULT_TIMEOUT, MAX_CONCURRENCY, MAX_REQUESTS};
pub use validation::{validate_config, validate_url};
