mod core;
mod form;
mod gateway;
mod verify;

pub use core::Config;
pub use form::FormConfig;
pub use gateway::GatewayConfig;
pub use verify::VerifyConfig;
