use layers::MapConfig;
use serde::{Deserialize, Serialize};
use streaming::WatchOptions;

/// Client configuration. Every field has a default so the page can pass a
/// partial JSON override, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Path of the relay WebSocket on the page origin.
    pub channel_path: String,
    pub map: MapConfig,
    pub watch: WatchOptions,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            channel_path: "/ws".to_string(),
            map: MapConfig::default(),
            watch: WatchOptions::default(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(text: Option<&str>) -> Result<Self, serde_json::Error> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(text) => serde_json::from_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrackerConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_override_uses_defaults() {
        assert_eq!(TrackerConfig::from_json(None).unwrap(), TrackerConfig::default());
        assert_eq!(TrackerConfig::from_json(Some("  ")).unwrap(), TrackerConfig::default());
    }

    #[test]
    fn nested_override_keeps_sibling_defaults() {
        let cfg = TrackerConfig::from_json(Some(r#"{"map": {"zoom": 3}, "channel_path": "/live"}"#))
            .unwrap();
        assert_eq!(cfg.channel_path, "/live");
        assert_eq!(cfg.map.zoom, 3);
        assert_eq!(cfg.map.follow_zoom, 13);
        assert_eq!(cfg.watch.timeout_ms, 5000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(TrackerConfig::from_json(Some("{not json")).is_err());
    }
}
