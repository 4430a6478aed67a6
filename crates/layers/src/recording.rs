use std::collections::BTreeMap;

use foundation::Position;

use crate::map_view::{MapView, TileLayerSpec, ViewOptions};

/// Handle issued by [`RecordingMapView`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum MapOp {
    CreateView { center: Position, zoom: u8 },
    AddTileLayer(TileLayerSpec),
    SetView { center: Position, zoom: u8, animate: bool },
    CreateMarker(MarkerHandle, Position),
    MoveMarker(MarkerHandle, Position),
    RemoveMarker(MarkerHandle),
}

/// Headless map view that logs every call and tracks which markers are on
/// the map. Used by tests and by native tooling with no display.
#[derive(Debug, Default)]
pub struct RecordingMapView {
    pub ops: Vec<MapOp>,
    next_marker: u32,
    on_map: BTreeMap<MarkerHandle, Position>,
}

impl RecordingMapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_position(&self, marker: MarkerHandle) -> Option<Position> {
        self.on_map.get(&marker).copied()
    }

    pub fn markers_on_map(&self) -> usize {
        self.on_map.len()
    }

    pub fn set_view_calls(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, MapOp::SetView { .. }))
            .count()
    }
}

impl MapView for RecordingMapView {
    type Marker = MarkerHandle;

    fn create_view(&mut self, center: Position, zoom: u8) {
        self.ops.push(MapOp::CreateView { center, zoom });
    }

    fn add_tile_layer(&mut self, tiles: &TileLayerSpec) {
        self.ops.push(MapOp::AddTileLayer(tiles.clone()));
    }

    fn set_view(&mut self, center: Position, zoom: u8, options: ViewOptions) {
        self.ops.push(MapOp::SetView {
            center,
            zoom,
            animate: options.animate,
        });
    }

    fn create_marker(&mut self, position: Position) -> MarkerHandle {
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.on_map.insert(handle, position);
        self.ops.push(MapOp::CreateMarker(handle, position));
        handle
    }

    fn set_marker_position(&mut self, marker: &mut MarkerHandle, position: Position) {
        self.on_map.insert(*marker, position);
        self.ops.push(MapOp::MoveMarker(*marker, position));
    }

    fn remove_layer(&mut self, marker: MarkerHandle) {
        self.on_map.remove(&marker);
        self.ops.push(MapOp::RemoveMarker(marker));
    }
}
