// crates/gateway-protocol/src/trust.rs
// ============================================================================
// Module: Trust Tier
// Description: The three-valued trust tier used by the classifier.
// Purpose: Fail-closed parsing of tier strings from untrusted rule sources.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A rule source (agent override, workspace rule, or system default) stores
//! its tier as a plain string. [`TrustTier::parse_normalized`] is the single
//! place that string is turned into this enum; any value that is not
//! exactly one of the three literals becomes [`TrustTier::Block`]. Do not
//! trust external strings — fail closed on corruption.

use serde::Deserialize;
use serde::Serialize;

/// Trust classification assigned to a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// Allow the call without human review.
    Auto,
    /// Require human approval before forwarding the call.
    Review,
    /// Deny the call outright.
    Block,
}

impl TrustTier {
    /// Parses a raw tier string, normalizing anything unrecognized to
    /// [`TrustTier::Block`].
    #[must_use]
    pub fn parse_normalized(raw: &str) -> Self {
        match raw {
            "auto" => Self::Auto,
            "review" => Self::Review,
            _ => Self::Block,
        }
    }

    /// Returns the canonical string label for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Review => "review",
            Self::Block => "block",
        }
    }
}
