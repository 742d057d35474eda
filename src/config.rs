use serde::Deserialize;

/// Knobs for the JSON grammar. Missing fields take their default value, so a
/// partial document deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// How many arrays may be nested inside each other.
    pub max_depth: usize,
    /// Accept input that continues after the first complete value.
    pub allow_trailing: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 128,
            allow_trailing: false,
        }
    }
}
