//! Server-side proof-token verification against an external scoring provider.

mod decision;
mod http_client;
pub mod policy;
mod siteverify;
mod traits;

pub use decision::TrustDecision;
pub use policy::{DEFAULT_SCORE_THRESHOLD, ScorePolicy, SiteVerifyResponse};
pub use siteverify::SiteVerifyClient;
pub use traits::ScoreVerifier;
