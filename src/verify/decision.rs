use serde::{Deserialize, Serialize};

/// Wire shape of the verification endpoint's reply: `{"verified": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrustDecision {
    pub verified: bool,
}

impl TrustDecision {
    pub const fn verified() -> Self {
        Self { verified: true }
    }

    pub const fn rejected() -> Self {
        Self { verified: false }
    }
}

impl From<bool> for TrustDecision {
    fn from(verified: bool) -> Self {
        Self { verified }
    }
}
