// RHTMX Validation Site
// Sample site posting view models through metadata validation

pub mod app;
pub mod config;
pub mod models;
pub mod response;

pub use app::{create_app, AppState};
pub use config::SiteConfig;
pub use models::{build_registry, shared_registry};
