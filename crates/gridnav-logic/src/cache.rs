//! Read-through cache in front of a [`SceneLoader`].
//!
//! Scene rows change rarely compared to how often routes are planned, so a
//! service may front its database loader with this cache. The cache owns its
//! state; callers invalidate a scene after editing it. The planner itself
//! never caches anything between calls.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::LoadError;
use crate::scene::{Fence, Node, NodeId, SceneId, SceneLoader};

#[derive(Default)]
struct CacheState {
    nodes: HashMap<SceneId, Vec<Node>>,
    fences: HashMap<SceneId, Vec<Fence>>,
    /// Nodes of scenes whose node list is cached; mirrors `nodes`.
    node_by_id: HashMap<NodeId, Node>,
    /// Nodes fetched one at a time, bounded by `node_capacity`.
    single_nodes: HashMap<NodeId, Node>,
}

impl CacheState {
    fn drop_scene_nodes(&mut self, scene_id: SceneId) {
        self.node_by_id.retain(|_, n| n.scene_id != scene_id);
        self.single_nodes.retain(|_, n| n.scene_id != scene_id);
    }
}

/// Bounded cache of scene snapshots keyed by scene id.
pub struct CachedSceneLoader<L> {
    inner: L,
    state: Mutex<CacheState>,
    scene_capacity: usize,
    node_capacity: usize,
}

impl<L: SceneLoader> CachedSceneLoader<L> {
    pub fn new(inner: L) -> Self {
        Self::with_capacity(inner, 64)
    }

    /// Cache at most `scene_capacity` scenes' node and fence lists, and
    /// 16 single-node lookups per scene slot.
    pub fn with_capacity(inner: L, scene_capacity: usize) -> Self {
        let scene_capacity = scene_capacity.max(1);
        Self {
            inner,
            state: Mutex::new(CacheState::default()),
            scene_capacity,
            node_capacity: scene_capacity.saturating_mul(16),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Drop everything cached for one scene.
    pub fn invalidate(&self, scene_id: SceneId) {
        let mut state = self.lock();
        state.nodes.remove(&scene_id);
        state.fences.remove(&scene_id);
        state.drop_scene_nodes(scene_id);
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.nodes.clear();
        state.fences.clear();
        state.node_by_id.clear();
        state.single_nodes.clear();
    }

    /// Number of scenes with a cached node list.
    pub fn cached_scenes(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Number of individually addressable cached nodes.
    pub fn cached_nodes(&self) -> usize {
        let state = self.lock();
        state.node_by_id.len() + state.single_nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Cached data is only ever replaced whole, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Insert `value`, evicting an arbitrary other key when full. Returns the
/// evicted key.
fn insert_bounded<K, V>(map: &mut HashMap<K, V>, capacity: usize, key: K, value: V) -> Option<K>
where
    K: Copy + Eq + std::hash::Hash,
{
    let mut evicted = None;
    if map.len() >= capacity && !map.contains_key(&key) {
        // HashMap iteration order
        if let Some(&evict) = map.keys().next() {
            map.remove(&evict);
            evicted = Some(evict);
        }
    }
    map.insert(key, value);
    evicted
}

impl<L: SceneLoader> SceneLoader for CachedSceneLoader<L> {
    fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError> {
        if let Some(nodes) = self.lock().nodes.get(&scene_id) {
            return Ok(nodes.clone());
        }
        let nodes = self.inner.load_nodes(scene_id)?;
        let mut state = self.lock();
        if let Some(evicted) =
            insert_bounded(&mut state.nodes, self.scene_capacity, scene_id, nodes.clone())
        {
            state.drop_scene_nodes(evicted);
        }
        state.single_nodes.retain(|_, n| n.scene_id != scene_id);
        for n in &nodes {
            state.node_by_id.insert(n.id, *n);
        }
        Ok(nodes)
    }

    fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError> {
        if let Some(fences) = self.lock().fences.get(&scene_id) {
            return Ok(fences.clone());
        }
        let fences = self.inner.load_fences(scene_id)?;
        let mut state = self.lock();
        insert_bounded(&mut state.fences, self.scene_capacity, scene_id, fences.clone());
        Ok(fences)
    }

    fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError> {
        {
            let state = self.lock();
            if let Some(&node) = state
                .node_by_id
                .get(&node_id)
                .or_else(|| state.single_nodes.get(&node_id))
            {
                return Ok(Some(node));
            }
        }
        // Misses are not cached: the node may be created later.
        let node = self.inner.load_node_by_id(node_id)?;
        if let Some(n) = node {
            let mut state = self.lock();
            insert_bounded(&mut state.single_nodes, self.node_capacity, n.id, n);
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneMeta, SceneStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls that reach the wrapped store.
    struct CountingLoader {
        store: SceneStore,
        calls: AtomicUsize,
    }

    impl SceneLoader for CountingLoader {
        fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.load_nodes(scene_id)
        }

        fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.load_fences(scene_id)
        }

        fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.store.load_node_by_id(node_id)
        }
    }

    fn counting(scenes: u64) -> CountingLoader {
        let mut store = SceneStore::new();
        for s in 1..=scenes {
            store.add_scene(SceneMeta::new(s)).unwrap();
            store.add_node(s, s * 100, (0, 0)).unwrap();
            store.add_fence(s, s * 1000, (0, 1), (1, 1)).unwrap();
        }
        CountingLoader {
            store,
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_cache_hit() {
        let cache = CachedSceneLoader::new(counting(1));
        let first = cache.load_nodes(1).unwrap();
        let second = cache.load_nodes(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_node_lookup_served_from_scene_load() {
        let cache = CachedSceneLoader::new(counting(1));
        cache.load_nodes(1).unwrap();
        assert!(cache.load_node_by_id(100).unwrap().is_some());
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_misses_not_cached() {
        let cache = CachedSceneLoader::new(counting(1));
        assert_eq!(cache.load_node_by_id(7).unwrap(), None);
        assert_eq!(cache.load_node_by_id(7).unwrap(), None);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate() {
        let cache = CachedSceneLoader::new(counting(1));
        cache.load_fences(1).unwrap();
        cache.invalidate(1);
        cache.load_fences(1).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_drops_node_lookups() {
        let cache = CachedSceneLoader::new(counting(2));
        cache.load_nodes(1).unwrap();
        cache.load_node_by_id(200).unwrap();
        assert_eq!(cache.cached_nodes(), 2);

        cache.invalidate(1);
        assert_eq!(cache.cached_nodes(), 1);
        let calls = cache.inner().calls.load(Ordering::SeqCst);
        assert!(cache.load_node_by_id(100).unwrap().is_some());
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), calls + 1);
    }

    #[test]
    fn test_clear() {
        let cache = CachedSceneLoader::new(counting(2));
        cache.load_nodes(1).unwrap();
        cache.load_fences(1).unwrap();
        cache.load_node_by_id(200).unwrap();
        cache.clear();
        assert_eq!(cache.cached_scenes(), 0);
        assert_eq!(cache.cached_nodes(), 0);

        let calls = cache.inner().calls.load(Ordering::SeqCst);
        cache.load_fences(1).unwrap();
        cache.load_node_by_id(200).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), calls + 2);
    }

    #[test]
    fn test_node_index_follows_scene_eviction() {
        let cache = CachedSceneLoader::with_capacity(counting(50), 2);
        for s in 1..=50 {
            cache.load_nodes(s).unwrap();
        }
        assert_eq!(cache.cached_scenes(), 2);
        assert_eq!(cache.cached_nodes(), 2);
    }

    #[test]
    fn test_single_node_lookups_bounded() {
        // One scene slot allows 16 single-node entries
        let cache = CachedSceneLoader::with_capacity(counting(50), 1);
        for s in 1..=50 {
            assert!(cache.load_node_by_id(s * 100).unwrap().is_some());
        }
        assert_eq!(cache.cached_nodes(), 16);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache = CachedSceneLoader::with_capacity(counting(3), 2);
        cache.load_nodes(1).unwrap();
        cache.load_nodes(2).unwrap();
        assert_eq!(cache.cached_scenes(), 2);
        cache.load_nodes(3).unwrap();
        assert_eq!(cache.cached_scenes(), 2);
    }

    #[test]
    fn test_errors_pass_through() {
        let cache = CachedSceneLoader::new(counting(1));
        assert!(matches!(
            cache.load_nodes(9),
            Err(LoadError::UnknownScene(9))
        ));
        assert_eq!(cache.cached_scenes(), 0);
    }
}
