use foundation::Position;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ZOOM: u8 = 13;
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Raster tile source for the base layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayerSpec {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayerSpec {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub animate: bool,
}

/// Initial map setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: Position,
    pub zoom: u8,
    /// Zoom used when re-centering on the local user.
    pub follow_zoom: u8,
    pub tiles: TileLayerSpec,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: Position::ORIGIN,
            zoom: DEFAULT_ZOOM,
            follow_zoom: DEFAULT_ZOOM,
            tiles: TileLayerSpec::default(),
        }
    }
}

/// Rendering surface that owns the map and its markers.
///
/// `Marker` is whatever handle the backend uses for a placed marker; the
/// renderer owns these handles and hands them back for moves and removal.
pub trait MapView {
    type Marker;

    fn create_view(&mut self, center: Position, zoom: u8);

    fn add_tile_layer(&mut self, tiles: &TileLayerSpec);

    fn set_view(&mut self, center: Position, zoom: u8, options: ViewOptions);

    /// Creates a marker at `position` and adds it to the map.
    fn create_marker(&mut self, position: Position) -> Self::Marker;

    fn set_marker_position(&mut self, marker: &mut Self::Marker, position: Position);

    fn remove_layer(&mut self, marker: Self::Marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_centers_on_origin_at_zoom_13() {
        let cfg = MapConfig::default();
        assert_eq!(cfg.center, Position::new(0.0, 0.0));
        assert_eq!(cfg.zoom, 13);
        assert_eq!(cfg.tiles.url_template, OSM_TILE_URL);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: MapConfig = serde_json::from_str(r#"{"zoom": 5}"#).unwrap();
        assert_eq!(cfg.zoom, 5);
        assert_eq!(cfg.follow_zoom, DEFAULT_ZOOM);
        assert_eq!(cfg.tiles, TileLayerSpec::default());
    }
}
