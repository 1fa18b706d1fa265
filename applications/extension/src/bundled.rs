//! Configuration bundled with the extension

use soundmaster_core::BoostConfig;
use tracing::warn;

const BUNDLED_CONFIG: &str = include_str!("../boost.json");

/// Tunables shipped in `boost.json`, or the defaults if it does not validate
pub fn load_config() -> BoostConfig {
    parse_or_default(BUNDLED_CONFIG)
}

fn parse_or_default(source: &str) -> BoostConfig {
    match BoostConfig::from_json(source) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring bundled config: {e}");
            BoostConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() {
        assert_eq!(load_config(), BoostConfig::default());
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = parse_or_default(r#"{ "max_volume": 0 }"#);
        assert_eq!(config, BoostConfig::default());

        let config = parse_or_default("not json");
        assert_eq!(config, BoostConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = parse_or_default(r#"{ "timing": { "retry_delay_ms": 250 } }"#);
        assert_eq!(config.timing.retry_delay_ms, 250);
        assert_eq!(config.timing.initial_apply_delay_ms, 1000);
        assert_eq!(config.max_volume, 300);
    }
}
