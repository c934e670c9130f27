//! Receiver configuration.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the receiver does when a call's identity is absent or has no key.
///
/// There is no default. A host picks one explicitly when it builds the
/// receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdentityPolicy {
    /// Fail closed: end the call with an error before the handler runs.
    Reject,
    /// Fail open: log a warning and forward the bytes unmodified.
    ///
    /// A caller that strips or forges its identity is then served in
    /// plaintext. Only for migrations where some callers do not encrypt yet.
    Passthrough,
}

impl UnknownIdentityPolicy {
    /// Configuration name (`reject` or `passthrough`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for UnknownIdentityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised policy name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown identity policy {0:?}: expected \"reject\" or \"passthrough\"")]
pub struct ParsePolicyError(String);

impl FromStr for UnknownIdentityPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "fail-closed" | "fail_closed" => Ok(Self::Reject),
            "passthrough" | "fail-open" | "fail_open" => Ok(Self::Passthrough),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Receiver decorator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Behaviour on missing or unknown caller identity
    pub on_unknown_identity: UnknownIdentityPolicy,
}

impl ReceiverConfig {
    /// Configuration with the given key-miss policy.
    pub fn new(on_unknown_identity: UnknownIdentityPolicy) -> Self {
        Self { on_unknown_identity }
    }

    /// Fail-closed configuration.
    pub fn reject_unknown() -> Self {
        Self::new(UnknownIdentityPolicy::Reject)
    }

    /// Fail-open configuration.
    pub fn passthrough_unknown() -> Self {
        Self::new(UnknownIdentityPolicy::Passthrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_names() {
        assert_eq!("reject".parse(), Ok(UnknownIdentityPolicy::Reject));
        assert_eq!(" Passthrough ".parse(), Ok(UnknownIdentityPolicy::Passthrough));
        assert_eq!("fail-closed".parse(), Ok(UnknownIdentityPolicy::Reject));
        assert_eq!("fail_open".parse(), Ok(UnknownIdentityPolicy::Passthrough));
    }

    #[test]
    fn rejects_unknown_policy_names() {
        let err = "allow".parse::<UnknownIdentityPolicy>().unwrap_err();

        assert_eq!(err, ParsePolicyError("allow".to_string()));
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn display_matches_parse() {
        for policy in [UnknownIdentityPolicy::Reject, UnknownIdentityPolicy::Passthrough] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn constructors_pick_policy() {
        assert_eq!(
            ReceiverConfig::reject_unknown().on_unknown_identity,
            UnknownIdentityPolicy::Reject
        );
        assert_eq!(
            ReceiverConfig::passthrough_unknown().on_unknown_identity,
            UnknownIdentityPolicy::Passthrough
        );
    }
}
