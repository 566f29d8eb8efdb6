use super::handle::Handle;

/// A child slot. `None` is the empty child, which always counts as black.
pub(crate) type Link = Option<Handle>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A red-black tree node. Nodes own their children through arena handles and carry no parent
/// link; callers that need ancestors keep an explicit path.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    left: Link,
    right: Link,
}

impl<K, V> Node<K, V> {
    pub(crate) const fn new(key: K, value: V, color: Color) -> Self {
        Self {
            key,
            value,
            color,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    #[inline]
    pub(crate) const fn left(&self) -> Link {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Link {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, link: Link) {
        match side {
            Side::Left => self.left = link,
            Side::Right => self.right = link,
        }
    }

    /// Returns the side on which `child` hangs.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this node.
    pub(crate) fn side_of(&self, child: Handle) -> Side {
        if self.left == Some(child) {
            Side::Left
        } else if self.right == Some(child) {
            Side::Right
        } else {
            panic!("`Node::side_of()` - `child` is not a child of this node!")
        }
    }

    /// The only child of a node with at most one child.
    #[inline]
    pub(crate) fn sole_child(&self) -> Link {
        debug_assert!(self.left.is_none() || self.right.is_none(), "`Node::sole_child()` - node has two children!");
        self.left.or(self.right)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn children_by_side() {
        let mut node = Node::new(1, "one", Color::Red);
        assert!(node.is_red());
        assert_eq!(node.child(Side::Left), None);

        let left = Handle::from_index(3);
        let right = Handle::from_index(4);
        node.set_child(Side::Left, Some(left));
        node.set_child(Side::Right, Some(right));

        assert_eq!(node.left(), Some(left));
        assert_eq!(node.right(), Some(right));
        assert_eq!(node.side_of(left), Side::Left);
        assert_eq!(node.side_of(right), Side::Right);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn sole_child_prefers_whichever_is_present() {
        let mut node = Node::new(1, (), Color::Black);
        assert_eq!(node.sole_child(), None);
        let child = Handle::from_index(0);
        node.set_child(Side::Right, Some(child));
        assert_eq!(node.sole_child(), Some(child));
    }

    #[test]
    #[should_panic(expected = "`Node::side_of()` - `child` is not a child of this node!")]
    fn side_of_stranger_panics() {
        let node = Node::new(1, (), Color::Black);
        let _ = node.side_of(Handle::from_index(9));
    }
}
