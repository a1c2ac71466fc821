//! Cloning and property state snapshots.

use std::rc::Rc;

use crate::animation::ease::Ease;
use crate::animation::task::{All, BoxTask, all};
use crate::code::scope::CodeScope;
use crate::foundation::core::{BezPath, Vec2};
use crate::foundation::error::{VignetteError, VignetteResult};
use crate::scene::element::{Element, NodeKind};
use crate::scene::node::Node;
use crate::scene::props::{NodeState, PropValue, properties_of, property_by_key};

impl Node {
    /// A fresh node of the same kind with default properties and no children.
    pub fn instantiate(&self) -> VignetteResult<Node> {
        let scene = self
            .scene()
            .ok_or_else(|| VignetteError::invariant(format!("node `{}` outlived its scene", self.key())))?;
        let element = match self.element() {
            Element::Group => Element::Group,
            Element::View(_) => {
                return Err(VignetteError::validation("the view node cannot be instantiated"));
            }
            Element::Rect(_) => Element::rect(Vec2::ZERO),
            Element::Circle(_) => Element::circle(Vec2::ZERO),
            Element::Path(_) => Element::path(BezPath::new()),
            Element::Line(_) => Element::line(None),
            Element::Img(_) => Element::img(None),
            Element::Code(_) => Element::code(CodeScope::default()),
            Element::Svg(_) => Element::svg(String::new()),
        };
        Ok(Node::build(&scene, element, None, Vec::new(), false))
    }

    /// Copy explicitly set properties (reactive producers included) and static children.
    ///
    /// Reactive children are shared as the same producer.
    pub fn clone_node(&self) -> VignetteResult<Node> {
        self.clone_with(&NodeState::new())
    }

    /// [`Node::clone_node`] with `overrides` taking precedence over copied properties.
    pub fn clone_with(&self, overrides: &NodeState) -> VignetteResult<Node> {
        let copy = self.instantiate()?;
        for descriptor in properties_of(self.kind()) {
            if !descriptor.cloneable || overrides.contains_key(descriptor.key) {
                continue;
            }
            if let (Some(source), Some(target)) = (descriptor.signal(self), descriptor.signal(&copy))
                && !source.is_initial()
            {
                target.copy_raw_from(source);
            }
        }
        copy.apply_state(overrides);

        if self.kind() != NodeKind::Svg {
            if self.children_are_reactive() {
                copy.set_children(self.raw_children());
            } else {
                let children = self
                    .children()
                    .iter()
                    .map(Node::clone_node)
                    .collect::<VignetteResult<Vec<_>>>()?;
                if !children.is_empty() {
                    copy.set_children(children);
                }
            }
        }
        Ok(copy)
    }

    /// Copy with every reactive property evaluated now; the copy does not follow the source.
    pub fn snapshot_clone(&self) -> VignetteResult<Node> {
        let copy = self.instantiate()?;
        copy.apply_state(&self.get_state());
        if self.kind() != NodeKind::Svg {
            let children = self
                .children()
                .iter()
                .map(Node::snapshot_clone)
                .collect::<VignetteResult<Vec<_>>>()?;
            if !children.is_empty() {
                copy.set_children(children);
            }
        }
        Ok(copy)
    }

    /// Copy whose cloneable properties keep mirroring the source.
    pub fn reactive_clone(&self) -> VignetteResult<Node> {
        let copy = self.instantiate()?;
        for descriptor in properties_of(self.kind()) {
            if !descriptor.cloneable {
                continue;
            }
            let Some(target) = descriptor.signal(&copy) else {
                continue;
            };
            let source = self.downgrade();
            let getter = descriptor.access;
            target.set_reactive(Rc::new(move || {
                let node = source.upgrade();
                node.as_ref()
                    .and_then(|node| getter(node))
                    .map(|signal| signal.value())
                    .unwrap_or(PropValue::Flag(false))
            }));
        }
        if self.kind() != NodeKind::Svg {
            let children = self
                .children()
                .iter()
                .map(Node::reactive_clone)
                .collect::<VignetteResult<Vec<_>>>()?;
            if !children.is_empty() {
                copy.set_children(children);
            }
        }
        Ok(copy)
    }

    /// Current values of every cloneable property.
    pub fn get_state(&self) -> NodeState {
        properties_of(self.kind())
            .filter(|descriptor| descriptor.cloneable)
            .filter_map(|descriptor| {
                let signal = descriptor.signal(self)?;
                Some((descriptor.key.to_owned(), signal.value()))
            })
            .collect()
    }

    /// Set every property in `state` immediately. Unknown keys are logged and skipped.
    pub fn apply_state(&self, state: &NodeState) {
        for (key, value) in state {
            let applied = property_by_key(self.kind(), key)
                .and_then(|descriptor| descriptor.signal(self))
                .is_some_and(|signal| signal.set_value(value.clone()));
            if !applied {
                tracing::warn!(
                    inspect = %self.key(),
                    property = %key,
                    remarks = "The key is not a property of this node or the value has the wrong type.",
                    "Skipping state entry"
                );
            }
        }
    }

    /// Tween every property whose current value differs from `state`.
    pub fn apply_state_tween(&self, state: &NodeState, duration: f64, ease: Ease) -> All {
        let mut tasks: Vec<BoxTask> = Vec::new();
        for (key, value) in state {
            let Some(signal) = property_by_key(self.kind(), key).and_then(|d| d.signal(self)) else {
                tracing::warn!(inspect = %self.key(), property = %key, "Skipping state entry");
                continue;
            };
            if signal.value() == *value {
                continue;
            }
            if let Some(task) = signal.tween_to(value.clone(), duration, ease) {
                tasks.push(task);
            }
        }
        all(tasks)
    }

    /// Push the current state onto the node's state stack.
    pub fn save(&self) {
        let state = self.get_state();
        self.0.state_stack.borrow_mut().push(state);
    }

    /// Pop the last saved state and apply it immediately.
    pub fn restore(&self) {
        let state = self.0.state_stack.borrow_mut().pop();
        if let Some(state) = state {
            self.apply_state(&state);
        }
    }

    /// Pop the last saved state and tween towards it. `None` when nothing was saved.
    pub fn restore_tween(&self, duration: f64, ease: Ease) -> Option<All> {
        let state = self.0.state_stack.borrow_mut().pop()?;
        Some(self.apply_state_tween(&state, duration, ease))
    }

    pub fn state_json(&self) -> VignetteResult<String> {
        serde_json::to_string_pretty(&self.get_state()).map_err(|e| VignetteError::Other(e.into()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
