pub mod schema;

pub use schema::{Config, FormConfig, GatewayConfig, VerifyConfig};
