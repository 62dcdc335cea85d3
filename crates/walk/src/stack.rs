use std::ffi::OsStr;

/// One node of the directory-name stack.
///
/// The stack records the names of the directories between the traversal root
/// and the directory currently being enumerated. Nodes live on the call stack
/// of the recursive walk: each directory handler creates exactly one node that
/// points at its parent's node, so the newest name is reached first and the
/// root is at the far end. Nodes are never mutated once built.
#[derive(Clone, Copy, Debug)]
pub struct DirStack<'a> {
    name: &'a OsStr,
    parent: Option<&'a DirStack<'a>>,
}

impl<'a> DirStack<'a> {
    /// Creates a node for `name` below `parent`.
    ///
    /// `parent` is `None` for directories that sit directly beneath the root.
    #[must_use]
    pub const fn new(name: &'a OsStr, parent: Option<&'a DirStack<'a>>) -> Self {
        Self { name, parent }
    }

    /// Returns the name of the directory this node represents.
    #[must_use]
    pub const fn name(&self) -> &'a OsStr {
        self.name
    }

    /// Returns the enclosing directory's node.
    #[must_use]
    pub const fn parent(&self) -> Option<&'a DirStack<'a>> {
        self.parent
    }

    /// Iterates over the stack from this node back to the root.
    #[must_use]
    pub fn iter(&self) -> Components<'_> {
        Components { next: Some(self) }
    }

    /// Number of directories between the root and this node, inclusive.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.iter().count()
    }
}

/// Iterates over an optional stack innermost-first.
///
/// An absent stack (the root level) yields nothing.
#[must_use]
pub fn components<'a>(stack: Option<&'a DirStack<'a>>) -> Components<'a> {
    Components { next: stack }
}

/// Iterator over directory names, innermost-first.
#[derive(Clone, Debug)]
pub struct Components<'a> {
    next: Option<&'a DirStack<'a>>,
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a OsStr;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.parent;
        Some(node.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_runs_from_newest_to_root() {
        let a = DirStack::new(OsStr::new("a"), None);
        let b = DirStack::new(OsStr::new("b"), Some(&a));
        let c = DirStack::new(OsStr::new("c"), Some(&b));

        let names: Vec<_> = c.iter().collect();
        assert_eq!(names, [OsStr::new("c"), OsStr::new("b"), OsStr::new("a")]);
        assert_eq!(c.depth(), 3);
        assert_eq!(a.depth(), 1);
    }

    #[test]
    fn siblings_share_parent_without_interference() {
        let parent = DirStack::new(OsStr::new("p"), None);
        let left = DirStack::new(OsStr::new("left"), Some(&parent));
        let right = DirStack::new(OsStr::new("right"), Some(&parent));

        assert_eq!(left.iter().nth(1), Some(OsStr::new("p")));
        assert_eq!(right.iter().nth(1), Some(OsStr::new("p")));
        assert_eq!(left.name(), OsStr::new("left"));
    }

    #[test]
    fn absent_stack_yields_nothing() {
        assert_eq!(components(None).count(), 0);
    }
}
