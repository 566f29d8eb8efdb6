use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;
use core::sync::atomic::{self, AtomicU64};

use alloc::vec::Vec;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Link, Node, Side};

/// Inline capacity of a root-to-node path. A red-black tree holding `n` nodes is at most
/// `2 * log2(n + 1)` levels deep, which stays below this for every tree `Handle` can address.
const PATH_CAPACITY: usize = 64;

/// Ancestors of the node being worked on, root first. Nodes have no parent links, so every
/// rebalancing step reads its parent, grandparent and uncle from here.
type Path = SmallVec<[Handle; PATH_CAPACITY]>;

/// Source of map identities. Every tree, including every clone, draws a fresh one.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_id() -> u64 {
    NEXT_ID.fetch_add(1, atomic::Ordering::Relaxed)
}

/// The red-black tree backing `RbTreeMap`.
pub(crate) struct RawRbTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Root of the tree, `None` when empty.
    root: Link,
    /// Number of key-value pairs in the tree.
    len: usize,
    /// Bumped by every structural or value mutation. Cursors compare against it.
    version: u64,
    /// Distinguishes this tree from every other, so a cursor can reject a map it did not come from.
    id: u64,
}

impl<K: Clone, V: Clone> Clone for RawRbTreeMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            version: self.version,
            id: fresh_id(),
        }
    }
}

impl<K, V> RawRbTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            version: 0,
            id: fresh_id(),
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn root(&self) -> Link {
        self.root
    }

    pub(crate) const fn version(&self) -> u64 {
        self.version
    }

    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    /// Records a mutation that cursors must observe.
    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Pointer to the node slots, for iterators that hand out disjoint `&mut V`.
    pub(crate) fn node_slots_ptr(&mut self) -> *mut Option<Node<K, V>> {
        self.nodes.slots_ptr()
    }

    /// Left and right links of a node.
    #[inline]
    pub(crate) fn links(&self, handle: Handle) -> (Link, Link) {
        let node = self.nodes.get(handle);
        (node.left(), node.right())
    }

    pub(crate) fn clear(&mut self) {
        debug!(len = self.len, "clearing red-black tree");
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.touch();
    }

    /// The leftmost (`Side::Left`) or rightmost (`Side::Right`) node.
    pub(crate) fn extreme(&self, side: Side) -> Link {
        let mut current = self.root?;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        Some(current)
    }

    /// Moves every entry out of the tree in ascending key order.
    pub(crate) fn into_entries(mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut traversal = Traversal::new(self.root);
        while let Some(handle) = traversal.next(|h| self.links(h)) {
            // The traversal never revisits a node it has yielded.
            let node = self.nodes.take(handle);
            entries.push((node.key, node.value));
        }
        self.root = None;
        self.len = 0;
        entries
    }

    #[inline]
    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|handle| self.nodes.get(handle).is_red())
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.nodes.get_mut(handle).color = color;
    }

    /// Rotates the subtree rooted at the top of `path` in `direction`.
    ///
    /// For `Side::Left` the right child rises into the top's place (and the mirror for
    /// `Side::Right`). The node above, if any, is relinked to the risen child, otherwise the risen
    /// child becomes the root. On return `path` ends with the risen child followed by the old
    /// top, matching the new shape.
    fn rotate(&mut self, path: &mut Path, direction: Side) {
        let top = path.pop().expect("`RawRbTreeMap::rotate()` - `path` is empty!");
        let rising = self
            .nodes
            .get(top)
            .child(direction.opposite())
            .expect("`RawRbTreeMap::rotate()` - rising child is empty!");
        let inner = self.nodes.get(rising).child(direction);
        trace!(?direction, depth = path.len(), "rotate");

        match path.last() {
            Some(&above) => {
                let side = self.nodes.get(above).side_of(top);
                self.nodes.get_mut(above).set_child(side, Some(rising));
            }
            None => self.root = Some(rising),
        }
        self.nodes.get_mut(top).set_child(direction.opposite(), inner);
        self.nodes.get_mut(rising).set_child(direction, Some(top));

        path.push(rising);
        path.push(top);
    }
}

impl<K: Ord, V> RawRbTreeMap<K, V> {
    /// Finds the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Finds the node with the smallest key strictly greater than `key`.
    pub(crate) fn successor<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            if key.cmp(node.key.borrow()) == Ordering::Less {
                best = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path: Path = SmallVec::new();
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            side = match key.cmp(&self.nodes.get(handle).key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    let old = mem::replace(&mut self.nodes.get_mut(handle).value, value);
                    self.touch();
                    return Some(old);
                }
            };
            path.push(handle);
            current = self.nodes.get(handle).child(side);
        }

        let node = self.nodes.alloc(Node::new(key, value, Color::Red));
        match path.last() {
            Some(&parent) => self.nodes.get_mut(parent).set_child(side, Some(node)),
            None => self.root = Some(node),
        }
        path.push(node);
        self.fix_after_insert(&mut path);

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
        self.len += 1;
        self.touch();
        None
    }

    /// Restores the red-black properties after a red node was attached at the end of `path`.
    fn fix_after_insert(&mut self, path: &mut Path) {
        while path.len() > 2 {
            let depth = path.len();
            let (node, parent, grandparent) = (path[depth - 1], path[depth - 2], path[depth - 3]);
            if !self.nodes.get(parent).is_red() {
                return;
            }

            let parent_side = self.nodes.get(grandparent).side_of(parent);
            let uncle = self.nodes.get(grandparent).child(parent_side.opposite());

            if let Some(uncle) = uncle.filter(|&uncle| self.nodes.get(uncle).is_red()) {
                self.set_color(grandparent, Color::Red);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                // The grandparent is now red and may clash with its own parent.
                path.truncate(depth - 2);
                continue;
            }

            if self.nodes.get(parent).side_of(node) != parent_side {
                // Inner grandchild: rotate it outward so it becomes the parent.
                path.pop();
                self.rotate(path, parent_side);
            }

            let depth = path.len();
            let (parent, grandparent) = (path[depth - 2], path[depth - 3]);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            path.truncate(depth - 2);
            self.rotate(path, parent_side.opposite());
            return;
        }
    }

    /// Removes a key from the tree and returns the key-value pair.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;
        let target = loop {
            let handle = current?;
            path.push(handle);
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => break handle,
            };
        };

        // A node with two children swaps payloads with its in-order successor, which has at most
        // one child, and that successor is unlinked instead.
        if let (Some(_), Some(right)) = self.links(target) {
            let mut next = right;
            path.push(next);
            while let Some(left) = self.nodes.get(next).left() {
                next = left;
                path.push(next);
            }
        }

        let victim = path.pop().expect("`RawRbTreeMap::remove_entry()` - `path` is empty!");
        let child = self.nodes.get(victim).sole_child();
        let victim_is_black = !self.nodes.get(victim).is_red();

        match path.last() {
            None => self.root = child,
            Some(&parent) => {
                let side = self.nodes.get(parent).side_of(victim);
                self.nodes.get_mut(parent).set_child(side, child);
                if victim_is_black {
                    match child.filter(|&child| self.nodes.get(child).is_red()) {
                        Some(child) => self.set_color(child, Color::Black),
                        None => self.fix_after_remove(&mut path, side),
                    }
                }
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }

        let mut removed = self.nodes.take(victim);
        if victim != target {
            let node = self.nodes.get_mut(target);
            mem::swap(&mut node.key, &mut removed.key);
            mem::swap(&mut node.value, &mut removed.value);
        }
        self.len -= 1;
        self.touch();
        Some((removed.key, removed.value))
    }

    /// Resolves a missing black on `side` of the node at the end of `path`.
    fn fix_after_remove(&mut self, path: &mut Path, mut side: Side) {
        loop {
            let parent = *path.last().expect("`RawRbTreeMap::fix_after_remove()` - `path` is empty!");
            let far = side.opposite();
            let mut sibling =
                self.nodes.get(parent).child(far).expect("`RawRbTreeMap::fix_after_remove()` - sibling is empty!");

            if self.nodes.get(sibling).is_red() {
                self.rotate(path, side);
                self.set_color(parent, Color::Red);
                self.set_color(sibling, Color::Black);
                sibling = self
                    .nodes
                    .get(parent)
                    .child(far)
                    .expect("`RawRbTreeMap::fix_after_remove()` - sibling is empty!");
            }

            let near_nephew = self.nodes.get(sibling).child(side);
            let far_nephew = self.nodes.get(sibling).child(far);

            if !self.is_red(near_nephew) && !self.is_red(far_nephew) {
                self.set_color(sibling, Color::Red);
                if self.nodes.get(parent).is_red() {
                    self.set_color(parent, Color::Black);
                    return;
                }
                path.pop();
                let Some(&grandparent) = path.last() else {
                    return;
                };
                trace!(depth = path.len(), "black deficiency moves up");
                side = self.nodes.get(grandparent).side_of(parent);
                continue;
            }

            match far_nephew.filter(|&nephew| self.nodes.get(nephew).is_red()) {
                None => {
                    // Near nephew is red: lift it above the sibling so the far side turns red.
                    let near =
                        near_nephew.expect("`RawRbTreeMap::fix_after_remove()` - red nephew is empty!");
                    self.set_color(sibling, Color::Red);
                    self.set_color(near, Color::Black);
                    path.push(sibling);
                    self.rotate(path, far);
                    path.truncate(path.len() - 2);
                }
                Some(far_nephew) => {
                    let parent_color = self.nodes.get(parent).color;
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    self.set_color(far_nephew, Color::Black);
                    self.rotate(path, side);
                    return;
                }
            }
        }
    }
}

/// Iterative in-order walk driven by two parallel stacks: pending nodes, and for each of them
/// whether its left subtree still has to be descended.
///
/// Link lookups are supplied by the caller so the same walk serves shared, mutable and owning
/// iteration.
#[derive(Clone, Debug, Default)]
pub(crate) struct Traversal {
    nodes: SmallVec<[Handle; PATH_CAPACITY]>,
    descend: SmallVec<[bool; PATH_CAPACITY]>,
}

impl Traversal {
    pub(crate) fn new(root: Link) -> Self {
        let mut traversal = Self::default();
        if let Some(root) = root {
            traversal.push(root);
        }
        traversal
    }

    fn push(&mut self, handle: Handle) {
        self.nodes.push(handle);
        self.descend.push(true);
    }

    /// Returns the next node in ascending key order.
    ///
    /// A yielded node's links are read before it is returned and never again.
    pub(crate) fn next(&mut self, mut links: impl FnMut(Handle) -> (Link, Link)) -> Option<Handle> {
        loop {
            let &top = self.nodes.last()?;
            let pending = self.descend.last_mut()?;
            if mem::take(pending) {
                if let (Some(left), _) = links(top) {
                    self.push(left);
                }
                continue;
            }

            self.nodes.pop();
            self.descend.pop();
            if let (_, Some(right)) = links(top) {
                self.push(right);
            }
            return Some(top);
        }
    }
}
