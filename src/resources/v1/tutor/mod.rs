pub mod handlers;
pub mod models;
pub mod prompt;

pub use models::{V1TutorRequest, V1TutorResponse};
