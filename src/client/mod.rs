//! Client-side half of the protocol: proof-token acquisition and the sticky
//! verification gate a form consults before submitting.

mod endpoint;
mod gate;
mod readiness;
mod token;

pub use endpoint::{HttpVerifyEndpoint, VerifyEndpoint};
pub use gate::{GateDependencies, GateState, VerificationGate};
pub use readiness::Readiness;
pub use token::{AgentTokenProvider, AntiBotAgent, ProofToken, TokenProvider};
