use foundation::{ConnectionId, Position};
use tracing::debug;

use crate::map_view::{MapConfig, MapView, ViewOptions};
use crate::markers::MarkerRegistry;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Created,
    Moved,
}

/// Owns the map surface and the marker registry.
///
/// Per connection id the only states are untracked and tracked: the first
/// located update creates a marker, later ones move it in place, and a
/// disconnect removes it. Both handlers are idempotent with respect to the
/// final map state.
pub struct MapRenderer<V: MapView> {
    view: V,
    markers: MarkerRegistry<V::Marker>,
    own_id: Option<ConnectionId>,
    follow_zoom: u8,
}

impl<V: MapView> MapRenderer<V> {
    /// Creates the view at the configured center and attaches the base tiles.
    pub fn new(mut view: V, config: &MapConfig) -> Self {
        view.create_view(config.center, config.zoom);
        view.add_tile_layer(&config.tiles);
        Self {
            view,
            markers: MarkerRegistry::new(),
            own_id: None,
            follow_zoom: config.follow_zoom,
        }
    }

    /// Records the id the relay assigned to this client.
    pub fn set_own_id(&mut self, id: ConnectionId) {
        self.own_id = Some(id);
    }

    pub fn own_id(&self) -> Option<&ConnectionId> {
        self.own_id.as_ref()
    }

    pub fn markers(&self) -> &MarkerRegistry<V::Marker> {
        &self.markers
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn handle_located_update(
        &mut self,
        id: &ConnectionId,
        position: Position,
    ) -> UpdateOutcome {
        if self.own_id.as_ref() == Some(id) {
            self.view
                .set_view(position, self.follow_zoom, ViewOptions { animate: true });
        }

        if let Some(marker) = self.markers.get_mut(id) {
            self.view.set_marker_position(marker, position);
            return UpdateOutcome::Moved;
        }

        let marker = self.view.create_marker(position);
        self.markers.insert(id.clone(), marker);
        debug!(%id, "tracking new connection");
        UpdateOutcome::Created
    }

    /// Returns whether a marker was removed. Unknown ids are a no-op.
    pub fn handle_disconnect(&mut self, id: &ConnectionId) -> bool {
        match self.markers.remove(id) {
            Some(marker) => {
                self.view.remove_layer(marker);
                debug!(%id, "connection left");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_view::{TileLayerSpec, DEFAULT_ZOOM};
    use crate::recording::{MapOp, MarkerHandle, RecordingMapView};
    use pretty_assertions::assert_eq;

    fn renderer() -> MapRenderer<RecordingMapView> {
        MapRenderer::new(RecordingMapView::new(), &MapConfig::default())
    }

    fn id(s: &str) -> ConnectionId {
        ConnectionId::new(s)
    }

    #[test]
    fn init_creates_view_then_tiles() {
        let r = renderer();
        assert_eq!(
            r.view().ops,
            vec![
                MapOp::CreateView {
                    center: Position::new(0.0, 0.0),
                    zoom: 13
                },
                MapOp::AddTileLayer(TileLayerSpec::default()),
            ]
        );
    }

    #[test]
    fn repeated_updates_move_the_same_marker() {
        let mut r = renderer();
        let a = id("A");
        assert_eq!(
            r.handle_located_update(&a, Position::new(10.0, 20.0)),
            UpdateOutcome::Created
        );
        let marker = *r.markers().get(&a).unwrap();
        assert_eq!(r.view().marker_position(marker), Some(Position::new(10.0, 20.0)));

        assert_eq!(
            r.handle_located_update(&a, Position::new(11.0, 21.0)),
            UpdateOutcome::Moved
        );
        assert_eq!(r.markers().len(), 1);
        assert_eq!(*r.markers().get(&a).unwrap(), marker);
        assert_eq!(r.view().marker_position(marker), Some(Position::new(11.0, 21.0)));
        assert_eq!(r.view().markers_on_map(), 1);
    }

    #[test]
    fn many_updates_keep_one_marker_at_latest_position() {
        let mut r = renderer();
        let a = id("A");
        let mut last = Position::ORIGIN;
        for i in 0..50 {
            last = Position::new(i as f64 * 0.5, -(i as f64));
            r.handle_located_update(&a, last);
        }
        assert_eq!(r.markers().len(), 1);
        let marker = *r.markers().get(&a).unwrap();
        assert_eq!(r.view().marker_position(marker), Some(last));
    }

    #[test]
    fn disconnect_removes_marker_from_view_and_registry() {
        let mut r = renderer();
        let b = id("B");
        r.handle_located_update(&b, Position::new(5.0, 5.0));
        let marker = *r.markers().get(&b).unwrap();
        assert!(r.handle_disconnect(&b));
        assert!(!r.markers().contains(&b));
        assert_eq!(r.view().marker_position(marker), None);
        assert_eq!(r.view().ops.last(), Some(&MapOp::RemoveMarker(marker)));
    }

    #[test]
    fn double_disconnect_is_idempotent() {
        let mut r = renderer();
        let b = id("B");
        r.handle_located_update(&b, Position::new(5.0, 5.0));
        r.handle_located_update(&id("C"), Position::new(1.0, 1.0));
        assert!(r.handle_disconnect(&b));
        let ops_after_first = r.view().ops.len();
        assert!(!r.handle_disconnect(&b));
        assert_eq!(r.view().ops.len(), ops_after_first);
        assert_eq!(r.markers().ids(), vec![&id("C")]);
    }

    #[test]
    fn disconnect_of_unknown_id_changes_nothing() {
        let mut r = renderer();
        r.handle_located_update(&id("A"), Position::new(1.0, 2.0));
        let ops_before = r.view().ops.clone();
        assert!(!r.handle_disconnect(&id("ghost")));
        assert_eq!(r.markers().len(), 1);
        assert_eq!(r.view().ops, ops_before);
    }

    #[test]
    fn self_updates_always_recenter_and_others_never_do() {
        let mut r = renderer();
        r.set_own_id(id("me"));
        r.handle_located_update(&id("other"), Position::new(1.0, 1.0));
        assert_eq!(r.view().set_view_calls(), 0);

        r.handle_located_update(&id("me"), Position::new(2.0, 3.0));
        r.handle_located_update(&id("me"), Position::new(4.0, 5.0));
        r.handle_located_update(&id("other"), Position::new(1.5, 1.5));
        assert_eq!(r.view().set_view_calls(), 2);
        assert!(r.view().ops.contains(&MapOp::SetView {
            center: Position::new(4.0, 5.0),
            zoom: DEFAULT_ZOOM,
            animate: true,
        }));
    }

    #[test]
    fn no_recenter_before_own_id_is_known() {
        let mut r = renderer();
        r.handle_located_update(&id("me"), Position::new(2.0, 3.0));
        assert_eq!(r.view().set_view_calls(), 0);
        assert_eq!(r.markers().len(), 1);
    }

    #[test]
    fn reconnect_after_disconnect_creates_fresh_marker() {
        let mut r = renderer();
        let a = id("A");
        r.handle_located_update(&a, Position::new(1.0, 1.0));
        r.handle_disconnect(&a);
        r.handle_located_update(&a, Position::new(2.0, 2.0));
        assert_eq!(*r.markers().get(&a).unwrap(), MarkerHandle(1));
        assert_eq!(r.view().markers_on_map(), 1);
    }
}
