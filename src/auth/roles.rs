//! Account roles
//!
//! The set is closed: every guard and registry check matches on [`Role`]
//! directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::PrecinctError;

/// Role of an account, fixed at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Member of the public; files and follows their own cases
    Citizen,
    /// Officer; files on behalf of citizens and works cases in their jurisdiction
    Police,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "CITIZEN",
            Role::Police => "POLICE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PrecinctError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CITIZEN" => Ok(Role::Citizen),
            "POLICE" => Ok(Role::Police),
            other => Err(PrecinctError::Validation(format!(
                "Role must be CITIZEN or POLICE, got '{}'",
                other
            ))),
        }
    }
}
