use foundation::Position;
use js_sys::{Array, Object, Reflect};
use layers::{MapView, TileLayerSpec, ViewOptions};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn leaflet_map(container_id: &str) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &Array, zoom: u8, options: &Object) -> LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &LeafletMarker) -> LeafletMap;

    type LeafletTileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn leaflet_tile_layer(url_template: &str, options: &Object) -> LeafletTileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LeafletTileLayer, map: &LeafletMap) -> LeafletTileLayer;

    pub type LeafletMarker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn leaflet_marker(lat_lng: &Array) -> LeafletMarker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LeafletMarker, map: &LeafletMap) -> LeafletMarker;

    #[wasm_bindgen(method, js_name = setLatLng)]
    fn set_lat_lng(this: &LeafletMarker, lat_lng: &Array) -> LeafletMarker;
}

fn lat_lng(p: Position) -> Array {
    let [lat, lng] = p.lat_lng();
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng))
}

fn options(entries: &[(&str, JsValue)]) -> Object {
    let obj = Object::new();
    for (key, value) in entries {
        // Reflect::set only fails on frozen or proxied targets.
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    obj
}

/// [`MapView`] backed by the page's global Leaflet (`L`).
pub struct LeafletMapView {
    map: LeafletMap,
}

impl LeafletMapView {
    /// Binds a Leaflet map to the element with `container_id`. Fails when
    /// Leaflet is not loaded or the container does not exist.
    pub fn new(container_id: &str) -> Result<Self, JsValue> {
        Ok(Self {
            map: leaflet_map(container_id)?,
        })
    }
}

impl MapView for LeafletMapView {
    type Marker = LeafletMarker;

    fn create_view(&mut self, center: Position, zoom: u8) {
        self.map.set_view(&lat_lng(center), zoom, &Object::new());
    }

    fn add_tile_layer(&mut self, tiles: &TileLayerSpec) {
        let opts = options(&[("attribution", JsValue::from_str(&tiles.attribution))]);
        leaflet_tile_layer(&tiles.url_template, &opts).add_to(&self.map);
    }

    fn set_view(&mut self, center: Position, zoom: u8, view: ViewOptions) {
        let opts = options(&[("animate", JsValue::from_bool(view.animate))]);
        self.map.set_view(&lat_lng(center), zoom, &opts);
    }

    fn create_marker(&mut self, position: Position) -> LeafletMarker {
        leaflet_marker(&lat_lng(position)).add_to(&self.map)
    }

    fn set_marker_position(&mut self, marker: &mut LeafletMarker, position: Position) {
        marker.set_lat_lng(&lat_lng(position));
    }

    fn remove_layer(&mut self, marker: LeafletMarker) {
        self.map.remove_layer(&marker);
    }
}
