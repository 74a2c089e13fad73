use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::SessionId;

/// Capabilities the receipting pages check for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "view contribution")]
    ViewContribution,
    #[serde(rename = "edit contribution")]
    EditContribution,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewContribution => "view contribution",
            Capability::EditContribution => "edit contribution",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view contribution" => Some(Capability::ViewContribution),
            "edit contribution" => Some(Capability::EditContribution),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // staff user id
    pub sid: String, // login session id
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub exp: usize,
    pub iat: usize,
    pub token_type: String, // "access"
}

/// The staff user making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub session_id: SessionId,
    pub capabilities: Vec<Capability>,
}

impl Actor {
    pub fn new(id: impl Into<String>, session_id: SessionId, capabilities: Vec<Capability>) -> Self {
        Self {
            id: id.into(),
            session_id,
            capabilities,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        let capabilities = claims
            .capabilities
            .iter()
            .filter_map(|c| {
                let parsed = Capability::parse(c);
                if parsed.is_none() {
                    log::debug!("Ignoring unknown capability '{}' for {}", c, claims.sub);
                }
                parsed
            })
            .collect();

        Self {
            id: claims.sub,
            session_id: SessionId(claims.sid),
            capabilities,
        }
    }
}
