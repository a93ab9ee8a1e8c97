#![forbid(unsafe_code)]

//! Gesture arbitration across a tree of nested pagers.
//!
//! Every pager tree has exactly one [`ArbitrationRegistry`], created by the
//! root pager and handed to descendants through [`PagerContext`]. It holds
//! two id sets:
//!
//! - **active touches**: pagers currently mid-gesture and eligible to move;
//! - **mounted pagers**: every live pager, used to detect topology churn.
//!
//! # Lock rule
//!
//! A pager is *locked* iff some active pager of the same orientation sits
//! strictly deeper in the tree. Among active pagers sharing an axis only the
//! deepest moves; pagers on the other axis never lock each other, so a
//! vertical feed of horizontal carousels can track both axes at once.
//!
//! The lock is derived on every call from the current active set; it is not
//! stored anywhere.
//!
//! # Concurrency
//!
//! Both sets are immutable snapshots behind [`arc_swap::ArcSwap`]. Reads
//! (`is_locked`, `is_active`) are wait-free and allocate nothing. Writes
//! clone the set, modify the clone and swap it in with read-copy-update, so
//! no writer ever takes a lock. Only the ordering of one gesture's own
//! callbacks is guaranteed; writes from different gestures interleave.
//!
//! # Topology churn
//!
//! Mounting or unmounting bumps [`ArbitrationRegistry::topology_epoch`]. When
//! the active set goes from empty to non-empty the registry snapshots the
//! epoch; [`ArbitrationRegistry::topology_churned`] reports whether it has
//! moved since. The root pager polls that and calls
//! [`ArbitrationRegistry::rearm`]: the active set is cleared and
//! [`ArbitrationRegistry::rearm_generation`] advances. Locks left behind by
//! pagers that stopped receiving touches disappear with the set; pagers that
//! are still tracking notice the new generation on their next callback and
//! register again, so a live drag survives the churn.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashSet;
use arc_swap::ArcSwap;

use crate::geometry::Orientation;

type IdSet = AHashSet<PagerId>;

/// Identity of one mounted pager: `(orientation, nesting depth, salt)`.
///
/// The salt is unique per mount within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PagerId {
    pub orientation: Orientation,
    pub depth: u32,
    pub salt: u64,
}

impl fmt::Display for PagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", self.orientation.label(), self.depth, self.salt)
    }
}

/// Shared arbitration state for one pager tree.
pub struct ArbitrationRegistry {
    active_touches: ArcSwap<IdSet>,
    mounted: ArcSwap<IdSet>,
    next_salt: AtomicU64,
    topology_epoch: AtomicU64,
    gesture_epoch: AtomicU64,
    rearm_generation: AtomicU64,
}

impl fmt::Debug for ArbitrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbitrationRegistry")
            .field("active", &self.active_count())
            .field("mounted", &self.mounted_count())
            .field("topology_epoch", &self.topology_epoch())
            .field("rearm_generation", &self.rearm_generation())
            .finish()
    }
}

impl ArbitrationRegistry {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active_touches: ArcSwap::from_pointee(IdSet::new()),
            mounted: ArcSwap::from_pointee(IdSet::new()),
            next_salt: AtomicU64::new(1),
            topology_epoch: AtomicU64::new(0),
            gesture_epoch: AtomicU64::new(0),
            rearm_generation: AtomicU64::new(0),
        })
    }

    /// Allocate an id for a new pager and add it to the mounted set.
    pub fn mount(&self, orientation: Orientation, depth: u32) -> PagerId {
        let id = PagerId {
            orientation,
            depth,
            salt: self.next_salt.fetch_add(1, Ordering::Relaxed),
        };
        insert(&self.mounted, id);
        self.topology_epoch.fetch_add(1, Ordering::AcqRel);
        id
    }

    /// Remove a pager from both sets.
    pub fn unmount(&self, id: PagerId) {
        remove(&self.active_touches, id);
        remove(&self.mounted, id);
        self.topology_epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Add `id` to the active-touch set. No-op if already present.
    pub fn register_touch(&self, id: PagerId) {
        let was_idle = self.active_touches.load().is_empty();
        insert(&self.active_touches, id);
        if was_idle {
            self.gesture_epoch.store(self.topology_epoch(), Ordering::Release);
        }
    }

    /// Remove `id` from the active-touch set. No-op if absent.
    pub fn deregister_touch(&self, id: PagerId) {
        remove(&self.active_touches, id);
    }

    #[must_use]
    pub fn is_active(&self, id: PagerId) -> bool {
        self.active_touches.load().contains(&id)
    }

    #[must_use]
    pub fn is_mounted(&self, id: PagerId) -> bool {
        self.mounted.load().contains(&id)
    }

    /// Whether `id` must ignore movement because a deeper pager on the same
    /// axis is active.
    #[must_use]
    pub fn is_locked(&self, id: PagerId) -> bool {
        let active = self.active_touches.load();
        active
            .iter()
            .any(|other| other.orientation == id.orientation && other.depth > id.depth)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_touches.load().len()
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.mounted.load().len()
    }

    /// Active ids in a stable order.
    #[must_use]
    pub fn active_touches(&self) -> Vec<PagerId> {
        let mut ids: Vec<PagerId> = self.active_touches.load().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Counter bumped by every mount and unmount.
    #[must_use]
    pub fn topology_epoch(&self) -> u64 {
        self.topology_epoch.load(Ordering::Acquire)
    }

    /// Pagers were mounted or unmounted while touches are active.
    #[must_use]
    pub fn topology_churned(&self) -> bool {
        !self.active_touches.load().is_empty()
            && self.gesture_epoch.load(Ordering::Acquire) != self.topology_epoch()
    }

    /// Counter bumped by every [`rearm`](Self::rearm).
    #[must_use]
    pub fn rearm_generation(&self) -> u64 {
        self.rearm_generation.load(Ordering::Acquire)
    }

    /// Drop every active touch and start a new arbitration generation.
    ///
    /// Returns the new generation.
    pub fn rearm(&self) -> u64 {
        self.active_touches.store(Arc::new(IdSet::new()));
        self.gesture_epoch.store(self.topology_epoch(), Ordering::Release);
        self.rearm_generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

fn insert(set: &ArcSwap<IdSet>, id: PagerId) {
    if set.load().contains(&id) {
        return;
    }
    set.rcu(|current| {
        let mut next = IdSet::clone(current);
        next.insert(id);
        next
    });
}

fn remove(set: &ArcSwap<IdSet>, id: PagerId) {
    if !set.load().contains(&id) {
        return;
    }
    set.rcu(|current| {
        let mut next = IdSet::clone(current);
        next.remove(&id);
        next
    });
}

/// Position of a pager in its tree plus the tree's shared registry.
///
/// The root context owns a fresh registry; [`child`](Self::child) hands the
/// same registry one level deeper.
#[derive(Debug, Clone)]
pub struct PagerContext {
    registry: Arc<ArbitrationRegistry>,
    depth: u32,
}

impl PagerContext {
    /// Context for a new root pager with its own registry.
    #[must_use]
    pub fn root() -> Self {
        Self {
            registry: ArbitrationRegistry::new(),
            depth: 0,
        }
    }

    /// Context for a pager nested one level below this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            depth: self.depth + 1,
        }
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ArbitrationRegistry> {
        &self.registry
    }
}

impl Default for PagerContext {
    fn default() -> Self {
        Self::root()
    }
}
