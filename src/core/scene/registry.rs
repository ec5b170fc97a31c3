//=========================================================================
// Body Registry
//=========================================================================
//
// Non-owning sets of caller-owned bodies.
//
// Architecture:
//   WeakSet<T>
//     └─ entries: HashMap<allocation address, Weak<RefCell<T>>>
//
// Identity is the `Rc` allocation, not the value, so two equal bodies are
// two entries. A held `Weak` keeps the allocation reserved, which means an
// address cannot be reused by another body while its entry is present.
// Dead entries are skipped on iteration and dropped by `prune`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

//=== Internal Dependencies ===============================================

use super::body::{Body, RigidBody, SharedBody, SharedRigidBody};

//=== WeakSet =============================================================

/// Set of weak references keyed by allocation identity.
pub struct WeakSet<T: ?Sized> {
    entries: HashMap<usize, Weak<RefCell<T>>>,
}

impl<T: ?Sized> WeakSet<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn key(item: &Rc<RefCell<T>>) -> usize {
        Rc::as_ptr(item) as *const () as usize
    }

    //--- Mutation ---------------------------------------------------------

    /// Inserts `item`. Returns `false` if it was already present.
    pub fn insert(&mut self, item: &Rc<RefCell<T>>) -> bool {
        self.entries
            .insert(Self::key(item), Rc::downgrade(item))
            .is_none()
    }

    /// Removes `item`. Returns `false` if it was not present.
    pub fn remove(&mut self, item: &Rc<RefCell<T>>) -> bool {
        self.entries.remove(&Self::key(item)).is_some()
    }

    /// Drops entries whose owner released the item. Returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn contains(&self, item: &Rc<RefCell<T>>) -> bool {
        self.entries
            .get(&Self::key(item))
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over live items in unspecified order.
    pub fn iter_live(&self) -> impl Iterator<Item = Rc<RefCell<T>>> + '_ {
        self.entries.values().filter_map(Weak::upgrade)
    }

    /// Prunes dead entries and returns strong handles to the rest.
    ///
    /// Callers iterate the snapshot, so items may be added or removed
    /// while the snapshot is being walked.
    pub fn snapshot(&mut self) -> Vec<Rc<RefCell<T>>> {
        let pruned = self.prune();
        if pruned > 0 {
            debug!(target: "engine", "Pruned {} dropped reference(s)", pruned);
        }
        self.iter_live().collect()
    }
}

impl<T: ?Sized> Default for WeakSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=== BodyRegistry ========================================================

/// The engine's render set: plain bodies and rigid bodies.
#[derive(Default)]
pub struct BodyRegistry {
    bodies: WeakSet<Body>,
    rigid_bodies: WeakSet<RigidBody>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Plain bodies -----------------------------------------------------

    pub fn add_body(&mut self, body: &SharedBody) -> bool {
        self.bodies.insert(body)
    }

    pub fn remove_body(&mut self, body: &SharedBody) -> bool {
        self.bodies.remove(body)
    }

    pub fn contains_body(&self, body: &SharedBody) -> bool {
        self.bodies.contains(body)
    }

    //--- Rigid bodies -----------------------------------------------------

    pub fn add_rigid_body(&mut self, body: &SharedRigidBody) -> bool {
        self.rigid_bodies.insert(body)
    }

    pub fn remove_rigid_body(&mut self, body: &SharedRigidBody) -> bool {
        self.rigid_bodies.remove(body)
    }

    pub fn contains_rigid_body(&self, body: &SharedRigidBody) -> bool {
        self.rigid_bodies.contains(body)
    }

    //--- Queries ----------------------------------------------------------

    /// Live bodies of both kinds.
    pub fn len(&self) -> usize {
        self.bodies.len() + self.rigid_bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots both sets for a render pass.
    pub fn snapshot(&mut self) -> (Vec<SharedBody>, Vec<SharedRigidBody>) {
        (self.bodies.snapshot(), self.rigid_bodies.snapshot())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::body::shared;
    use glam::Vec3;

    //=====================================================================
    // WeakSet
    //=====================================================================

    #[test]
    fn insert_is_idempotent() {
        let mut set = WeakSet::new();
        let body = shared(Body::default());

        assert!(set.insert(&body));
        assert!(!set.insert(&body), "Second insert should report existing entry");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set = WeakSet::new();
        let body = shared(Body::default());
        set.insert(&body);

        assert!(set.remove(&body));
        assert!(!set.remove(&body));
        assert!(set.is_empty());
    }

    #[test]
    fn identity_is_allocation_not_value() {
        let mut set = WeakSet::new();
        let a = shared(Body::default());
        let b = shared(Body::default());

        set.insert(&a);
        assert!(set.contains(&a));
        assert!(!set.contains(&b), "Equal values are distinct entries");
    }

    #[test]
    fn dropped_items_are_skipped_and_pruned() {
        let mut set = WeakSet::new();
        let kept = shared(Body::default().at(Vec3::X));
        let dropped = shared(Body::default());

        set.insert(&kept);
        set.insert(&dropped);
        drop(dropped);

        assert_eq!(set.len(), 1);
        assert_eq!(set.iter_live().count(), 1);

        let snapshot = set.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(Rc::ptr_eq(&snapshot[0], &kept));
        assert_eq!(set.prune(), 0, "Snapshot should already have pruned");
    }

    #[test]
    fn snapshot_does_not_hold_the_set() {
        let mut set = WeakSet::new();
        let a = shared(Body::default());
        let b = shared(Body::default());
        set.insert(&a);

        for _ in set.snapshot() {
            set.insert(&b);
        }

        assert_eq!(set.len(), 2);
    }

    //=====================================================================
    // BodyRegistry
    //=====================================================================

    #[test]
    fn registry_round_trip() {
        let mut registry = BodyRegistry::new();
        let body = shared(Body::default());
        let rigid = shared(RigidBody::new(Body::default(), 1.0));

        registry.add_body(&body);
        registry.add_rigid_body(&rigid);
        assert!(registry.contains_body(&body));
        assert!(registry.contains_rigid_body(&rigid));
        assert_eq!(registry.len(), 2);

        registry.remove_body(&body);
        registry.remove_rigid_body(&rigid);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_snapshot_splits_kinds() {
        let mut registry = BodyRegistry::new();
        let body = shared(Body::default());
        let rigid = shared(RigidBody::immovable(Body::default()));
        registry.add_body(&body);
        registry.add_rigid_body(&rigid);

        let (plain, rigid_bodies) = registry.snapshot();
        assert_eq!(plain.len(), 1);
        assert_eq!(rigid_bodies.len(), 1);
    }
}
