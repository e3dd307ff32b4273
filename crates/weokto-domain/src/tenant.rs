//! Tenant identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two branded products served from this codebase.
///
/// Wire format: lowercase string (`"weokto"`, `"stam"`). Also used as the
/// URL namespace prefix and as the value stored in `magic_link_tokens.tenant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenant {
    Weokto,
    Stam,
}

/// Returned when a string names no known tenant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tenant: {0}")]
pub struct UnknownTenant(pub String);

impl Tenant {
    pub const ALL: [Tenant; 2] = [Tenant::Weokto, Tenant::Stam];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weokto => "weokto",
            Self::Stam => "stam",
        }
    }

    /// Path namespace (without slashes) that tenant pages live under.
    pub fn prefix(self) -> &'static str {
        self.as_str()
    }

    /// Domain used when no allow-list is configured for this tenant.
    pub fn default_domain(self) -> &'static str {
        match self {
            Self::Weokto => "weokto.com",
            Self::Stam => "be-stam.com",
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tenant {
    type Err = UnknownTenant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weokto" => Ok(Self::Weokto),
            "stam" => Ok(Self::Stam),
            _ => Err(UnknownTenant(s.to_owned())),
        }
    }
}
