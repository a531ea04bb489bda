// Profile module - customer profile and avatar persistence: the
// post-sign-up orchestrator with its primary/fallback write paths, and
// the REST endpoints serving as the fallback side

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod persist;
pub mod routes;


pub use models::Profile;
pub use orchestrator::{PersistenceOrchestrator, SignupOutcome};
pub use routes::profile_routes;
