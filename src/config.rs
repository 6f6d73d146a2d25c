use serde::{Deserialize, Serialize};

/// Policy configuration for the model.
///
/// Passed in explicitly (and injectable in tests) rather than read from
/// ambient application settings; the surrounding application owns where the
/// values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Allow at most one active event in the whole store
    #[serde(default)]
    pub one_event_at_a_time: bool,
    /// Events may only be logged against tasks without children
    #[serde(default)]
    pub events_in_leafs_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_permissive() {
        let config = ModelConfig::default();
        assert!(!config.one_event_at_a_time);
        assert!(!config.events_in_leafs_only);
    }
}
