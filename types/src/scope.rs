//! How the trial limit is counted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Scope of the maximum-trials bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialScope {
    /// The bound counts invocations across the orchestrator's lifetime and
    /// is never reset.
    #[default]
    Cumulative,
    /// The bound counts no-detection ticks within one session.
    PerSession,
}

impl TrialScope {
    pub const ALL: [TrialScope; 2] = [TrialScope::Cumulative, TrialScope::PerSession];

    /// The name used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialScope::Cumulative => "cumulative",
            TrialScope::PerSession => "per_session",
        }
    }
}

impl fmt::Display for TrialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the config-file names, case-insensitively, with `-` for `_`.
impl FromStr for TrialScope {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == normalized)
            .ok_or_else(|| TypesError::UnknownTrialScope(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_names_and_cli_spellings() {
        assert_eq!("cumulative".parse(), Ok(TrialScope::Cumulative));
        assert_eq!("per_session".parse(), Ok(TrialScope::PerSession));
        assert_eq!("Per-Session".parse(), Ok(TrialScope::PerSession));
        assert_eq!(
            "forever".parse::<TrialScope>(),
            Err(TypesError::UnknownTrialScope("forever".into()))
        );
    }

    #[test]
    fn display_matches_config_name() {
        for scope in TrialScope::ALL {
            assert_eq!(scope.to_string().parse(), Ok(scope));
        }
    }
}
