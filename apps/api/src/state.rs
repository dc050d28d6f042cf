use std::sync::Arc;

use crate::auth::Authenticator;
use crate::db::{PortfolioRepository, ProfileRepository, ResumeRepository, UserRepository};
use crate::llm_client::StructuredCompletion;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator is a trait object so tests can swap in
/// in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<dyn FileStore>,
    pub resumes: Arc<dyn ResumeRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub portfolios: Arc<dyn PortfolioRepository>,
    pub users: Arc<dyn UserRepository>,
    pub llm: Arc<dyn StructuredCompletion>,
    pub auth: Arc<dyn Authenticator>,
    /// Request body cap applied by the router.
    pub max_upload_bytes: usize,
}
