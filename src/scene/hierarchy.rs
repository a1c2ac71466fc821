//! Children, reordering and tree queries.

use crate::scene::element::NodeKind;
use crate::scene::node::Node;
use crate::signal::signal::SignalValue;

impl Node {
    /// Current children, subscribing the running computation.
    ///
    /// Reactive children are (re)spawned here whenever their producer yields a new list.
    pub fn children(&self) -> Vec<Node> {
        let nodes = self.0.children.get();
        if self.0.children.is_reactive() {
            let stale = !self.0.has_spawned_children.get() || *self.0.real_children.borrow() != nodes;
            if stale {
                self.spawn_children(true, &nodes);
            }
        }
        self.0.real_children.borrow().clone()
    }

    /// Children as last spawned, without subscribing or spawning.
    pub fn peek_children(&self) -> Vec<Node> {
        self.0.real_children.borrow().clone()
    }

    pub fn children_are_reactive(&self) -> bool {
        self.0.children.is_reactive()
    }

    pub(crate) fn raw_children(&self) -> SignalValue<Vec<Node>> {
        self.0.children.raw()
    }

    /// Replace the children. A reactive producer is re-evaluated when its dependencies change.
    pub fn set_children(&self, value: impl Into<SignalValue<Vec<Node>>>) {
        match value.into() {
            SignalValue::Value(nodes) => {
                let mut unique: Vec<Node> = Vec::with_capacity(nodes.len());
                for node in nodes {
                    if node != *self && !unique.contains(&node) {
                        unique.push(node);
                    }
                }
                self.0.children.set(unique.clone());
                self.spawn_children(false, &unique);
            }
            reactive @ SignalValue::Reactive(_) => {
                self.0.children.set(reactive);
                if !self.0.has_spawned_children.get() {
                    let old = std::mem::take(&mut *self.0.real_children.borrow_mut());
                    for child in old {
                        if child.peek_parent().as_ref() == Some(self) {
                            child.set_parent(None);
                        }
                    }
                }
            }
        }
    }

    /// Replace the children list without touching any parent links.
    ///
    /// The caller is responsible for keeping the hierarchy consistent.
    pub(crate) fn set_parsed_children(&self, nodes: Vec<Node>) {
        self.0.children.set(nodes.clone());
        *self.0.real_children.borrow_mut() = nodes;
    }

    fn spawn_children(&self, reactive: bool, nodes: &[Node]) {
        for child in nodes {
            let current = child.peek_parent();
            if let Some(previous) = &current
                && previous != self
            {
                previous.remove_child(child);
            }
            if current.as_ref() != Some(self) {
                child.set_parent(Some(self));
            }
        }
        let old = std::mem::replace(&mut *self.0.real_children.borrow_mut(), nodes.to_vec());
        for child in old {
            if !nodes.contains(&child) && child.peek_parent().as_ref() == Some(self) {
                child.set_parent(None);
            }
        }
        self.0.has_spawned_children.set(reactive);
    }

    /// Append `node` (or move it to the end if it already is a child).
    pub fn add(&self, node: Node) -> &Self {
        self.insert([node], usize::MAX)
    }

    pub fn add_all(&self, nodes: impl IntoIterator<Item = Node>) -> &Self {
        self.insert(nodes, usize::MAX)
    }

    /// Insert `nodes` at `index`, detaching each from its previous parent first.
    ///
    /// `index` counts the children that remain after the inserted nodes are detached and is
    /// clamped to the end. A node is never inserted into its own subtree.
    pub fn insert(&self, nodes: impl IntoIterator<Item = Node>, index: usize) -> &Self {
        let mut inserted: Vec<Node> = Vec::new();
        for node in nodes {
            if inserted.contains(&node) {
                continue;
            }
            if node == *self || self.find_ancestor(|ancestor| *ancestor == node).is_some() {
                tracing::error!(
                    inspect = %self.key(),
                    child = %node.key(),
                    remarks = "A node cannot become a descendant of itself.",
                    "Refusing to insert a node into its own subtree"
                );
                continue;
            }
            inserted.push(node);
        }
        if inserted.is_empty() {
            return self;
        }

        for node in &inserted {
            node.remove();
        }
        let current = self.children();
        let at = index.min(current.len());
        let mut next = Vec::with_capacity(current.len() + inserted.len());
        next.extend_from_slice(&current[..at]);
        for node in inserted {
            node.set_parent(Some(self));
            next.push(node);
        }
        next.extend_from_slice(&current[at..]);
        self.set_parsed_children(next);
        self
    }

    /// Detach this node from its parent.
    pub fn remove(&self) -> &Self {
        if let Some(parent) = self.peek_parent() {
            parent.remove_child(self);
            self.set_parent(None);
        }
        self
    }

    pub fn remove_child(&self, child: &Node) {
        let remaining = self.children().into_iter().filter(|n| n != child).collect();
        self.set_parsed_children(remaining);
    }

    pub fn remove_children(&self) -> &Self {
        let old = self.peek_children();
        for child in old {
            child.set_parent(None);
        }
        self.set_parsed_children(Vec::new());
        self
    }

    /// Move this node `by` places among its siblings; positive values draw it later (on top).
    pub fn move_by(&self, by: isize) -> &Self {
        let Some(parent) = self.peek_parent() else {
            return self;
        };
        if by == 0 {
            return self;
        }
        let mut siblings = parent.children();
        let Some(own) = siblings.iter().position(|n| n == self) else {
            return self;
        };
        siblings.remove(own);
        let last = isize::try_from(siblings.len()).unwrap_or(isize::MAX);
        let own = isize::try_from(own).unwrap_or(isize::MAX);
        let target = own.saturating_add(by).clamp(0, last);
        siblings.insert(target.unsigned_abs(), self.clone());
        parent.set_parsed_children(siblings);
        self
    }

    pub fn move_up(&self) -> &Self {
        self.move_by(1)
    }

    pub fn move_down(&self) -> &Self {
        self.move_by(-1)
    }

    pub fn move_to_top(&self) -> &Self {
        self.move_by(isize::MAX)
    }

    pub fn move_to_bottom(&self) -> &Self {
        self.move_by(isize::MIN)
    }

    /// Move to `index` among the siblings.
    pub fn move_to(&self, index: usize) -> &Self {
        let Some(parent) = self.peek_parent() else {
            return self;
        };
        let Some(own) = parent.children().iter().position(|n| n == self) else {
            return self;
        };
        let index = isize::try_from(index).unwrap_or(isize::MAX);
        let own = isize::try_from(own).unwrap_or(isize::MAX);
        self.move_by(index.saturating_sub(own))
    }

    /// Draw this node below `sibling`.
    ///
    /// Unless `directly` is set, a node already below the sibling stays where it is.
    pub fn move_below(&self, sibling: &Node, directly: bool) -> &Self {
        let Some((own, other)) = self.sibling_indices(sibling) else {
            return self;
        };
        if !directly && own < other {
            return self;
        }
        self.move_by(other - own - 1)
    }

    /// Draw this node above `sibling`.
    ///
    /// Unless `directly` is set, a node already above the sibling stays where it is.
    pub fn move_above(&self, sibling: &Node, directly: bool) -> &Self {
        let Some((own, other)) = self.sibling_indices(sibling) else {
            return self;
        };
        if !directly && own > other {
            return self;
        }
        self.move_by(other - own + 1)
    }

    fn sibling_indices(&self, sibling: &Node) -> Option<(isize, isize)> {
        let parent = self.peek_parent()?;
        if sibling.peek_parent().as_ref() != Some(&parent) {
            tracing::error!(
                inspect = %self.key(),
                sibling = %sibling.key(),
                remarks = "Both nodes must share the same parent.",
                "Cannot position nodes relative to each other if they don't belong to the same parent."
            );
            return None;
        }
        let children = parent.children();
        let own = children.iter().position(|n| n == self)?;
        let other = children.iter().position(|n| n == sibling)?;
        Some((isize::try_from(own).ok()?, isize::try_from(other).ok()?))
    }

    /// Move under `new_parent`, keeping the world-space position, rotation and scale.
    pub fn reparent(&self, new_parent: &Node) -> &Self {
        let position = self.absolute_position();
        let rotation = self.absolute_rotation();
        let scale = self.absolute_scale();
        new_parent.add(self.clone());
        self.set_absolute_position(position);
        self.set_absolute_rotation(rotation);
        self.set_absolute_scale(scale);
        self
    }

    fn reversed_children(&self) -> Vec<Node> {
        let mut children = self.children();
        children.reverse();
        children
    }

    /// Every descendant matching `predicate`, in pre-order.
    pub fn find_all(&self, predicate: impl Fn(&Node) -> bool) -> Vec<Node> {
        let mut result = Vec::new();
        let mut stack = self.reversed_children();
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                result.push(node.clone());
            }
            stack.extend(node.reversed_children());
        }
        result
    }

    pub fn find_first(&self, predicate: impl Fn(&Node) -> bool) -> Option<Node> {
        let mut stack = self.reversed_children();
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                return Some(node);
            }
            stack.extend(node.reversed_children());
        }
        None
    }

    /// The last match in pre-order.
    pub fn find_last(&self, predicate: impl Fn(&Node) -> bool) -> Option<Node> {
        let mut visited = Vec::new();
        let mut stack = self.reversed_children();
        while let Some(node) = stack.pop() {
            stack.extend(node.reversed_children());
            visited.push(node);
        }
        visited.into_iter().rev().find(|node| predicate(node))
    }

    pub fn find_ancestor(&self, predicate: impl Fn(&Node) -> bool) -> Option<Node> {
        let mut current = self.parent();
        while let Some(node) = current {
            if predicate(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// The child at `index` when it is of the given kind.
    pub fn child_as(&self, index: usize, kind: NodeKind) -> Option<Node> {
        self.children()
            .get(index)
            .filter(|child| child.kind() == kind)
            .cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/hierarchy.rs"]
mod tests;
