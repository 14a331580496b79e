pub mod analysis;
pub mod auth;

pub use analysis::{AnalysisError, AnalysisResult, ReviewAnalysisService, UpdateResult};
pub use auth::{AuthError, AuthService};
