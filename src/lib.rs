pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, AppResult};
pub use models::recommendation::{Candidate, Priority, RecommendationOutcome, RecommendationRequest};
pub use services::recommendation_service::{Collaborators, RecommendationService};
pub use utils::logger::init_logging;
