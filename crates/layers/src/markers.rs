use std::collections::HashMap;

use foundation::ConnectionId;

/// Owned marker handles keyed by connection.
///
/// Holds at most one marker per connection. Only the renderer mutates it.
#[derive(Debug)]
pub struct MarkerRegistry<M> {
    markers: HashMap<ConnectionId, M>,
}

impl<M> Default for MarkerRegistry<M> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<M> MarkerRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&M> {
        self.markers.get(id)
    }

    /// Tracked connection ids, sorted for stable output.
    pub fn ids(&self) -> Vec<&ConnectionId> {
        let mut ids: Vec<_> = self.markers.keys().collect();
        ids.sort();
        ids
    }

    pub(crate) fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut M> {
        self.markers.get_mut(id)
    }

    pub(crate) fn insert(&mut self, id: ConnectionId, marker: M) {
        let previous = self.markers.insert(id, marker);
        debug_assert!(previous.is_none(), "marker registered twice");
    }

    pub(crate) fn remove(&mut self, id: &ConnectionId) -> Option<M> {
        self.markers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerRegistry;
    use foundation::ConnectionId;

    #[test]
    fn ids_are_sorted() {
        let mut reg = MarkerRegistry::new();
        reg.insert(ConnectionId::new("b"), 2);
        reg.insert(ConnectionId::new("a"), 1);
        let ids: Vec<&str> = reg.ids().into_iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn remove_returns_marker_once() {
        let mut reg = MarkerRegistry::new();
        let id = ConnectionId::new("a");
        reg.insert(id.clone(), 7);
        assert_eq!(reg.remove(&id), Some(7));
        assert_eq!(reg.remove(&id), None);
        assert!(reg.is_empty());
    }
}
