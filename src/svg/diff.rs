//! Structural diff between two SVG documents, matching shapes by id.
//!
//! Ids may repeat within a document, so every id maps to the ordered list of shapes carrying it.
//! Lists present on both sides are paired element-wise; the shorter side is padded with its last
//! entry so a duplicated shape grows out of (or collapses into) its sibling.

use std::collections::HashMap;

use crate::foundation::core::Vec2;
use crate::foundation::error::{VignetteError, VignetteResult};

#[derive(Clone, Debug, PartialEq)]
pub struct SvgShape<T> {
    pub id: String,
    pub shape: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument<T> {
    pub size: Vec2,
    pub nodes: Vec<SvgShape<T>>,
}

impl<T> Default for SvgDocument<T> {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            nodes: Vec::new(),
        }
    }
}

/// A shape together with its index in its document.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDiffShape<T> {
    pub index: usize,
    pub node: SvgShape<T>,
}

/// A source shape moving onto a target shape with the same id.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgTransformed<T> {
    /// The target has more shapes with this id; `from` is the padded last source entry.
    pub insert: bool,
    /// The source has more shapes with this id; `to` is the padded last target entry.
    pub deleted: bool,
    pub from: SvgDiffShape<T>,
    pub to: SvgDiffShape<T>,
}

/// How the shapes of one document map onto another.
///
/// `inserted` and `deleted` only hold shapes whose id is missing from the other document.
/// When an id occurs a different number of times on each side, the surplus still lands in
/// `transformed`, flagged with [`SvgTransformed::insert`] or [`SvgTransformed::deleted`]: a
/// target with one more `a` than the source yields one extra `transformed` entry growing out of
/// the last source `a`, and nothing in `inserted`. Callers counting new shapes should add the
/// `insert` entries to `inserted`.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDiff<T> {
    pub from_size: Vec2,
    pub to_size: Vec2,
    /// Target shapes whose id does not occur in the source.
    pub inserted: Vec<SvgDiffShape<T>>,
    /// Source shapes whose id does not occur in the target.
    pub deleted: Vec<SvgDiffShape<T>>,
    pub transformed: Vec<SvgTransformed<T>>,
}

/// Ids in order of first appearance, each with its shapes in document order.
fn shape_map<T: Clone>(document: &SvgDocument<T>) -> (Vec<String>, HashMap<String, Vec<SvgDiffShape<T>>>) {
    let mut keys = Vec::new();
    let mut map: HashMap<String, Vec<SvgDiffShape<T>>> = HashMap::new();
    for (index, node) in document.nodes.iter().enumerate() {
        let entry = map.entry(node.id.clone()).or_insert_with(|| {
            keys.push(node.id.clone());
            Vec::new()
        });
        entry.push(SvgDiffShape {
            index,
            node: node.clone(),
        });
    }
    (keys, map)
}

#[tracing::instrument(skip_all, fields(from = from.nodes.len(), to = to.nodes.len()))]
pub fn diff_svg<T: Clone>(from: &SvgDocument<T>, to: &SvgDocument<T>) -> SvgDiff<T> {
    let mut diff = SvgDiff {
        from_size: from.size,
        to_size: to.size,
        inserted: Vec::new(),
        deleted: Vec::new(),
        transformed: Vec::new(),
    };

    let (mut from_keys, mut from_map) = shape_map(from);
    let (mut to_keys, mut to_map) = shape_map(to);

    while let Some(key) = from_keys.pop() {
        let from_items = from_map.remove(&key).unwrap_or_default();
        let to_items = match to_keys.iter().position(|k| *k == key) {
            Some(position) => {
                to_keys.remove(position);
                to_map.remove(&key).unwrap_or_default()
            }
            None => Vec::new(),
        };

        match (from_items.last(), to_items.last()) {
            (Some(last_from), Some(last_to)) => {
                for i in 0..from_items.len().max(to_items.len()) {
                    diff.transformed.push(SvgTransformed {
                        insert: i >= from_items.len(),
                        deleted: i >= to_items.len(),
                        from: from_items.get(i).unwrap_or(last_from).clone(),
                        to: to_items.get(i).unwrap_or(last_to).clone(),
                    });
                }
            }
            _ => diff.deleted.extend(from_items.iter().cloned()),
        }
    }

    for key in to_keys {
        diff.inserted.extend(to_map.remove(&key).unwrap_or_default());
    }
    tracing::debug!(
        inserted = diff.inserted.len(),
        deleted = diff.deleted.len(),
        transformed = diff.transformed.len(),
        "svg diff"
    );
    diff
}

impl<T: Clone> SvgDiff<T> {
    /// Children while the morph starts: `current` with the source of every `insert` entry
    /// spliced in at its source index.
    pub fn initial_order(&self, current: &[T]) -> Vec<T> {
        let mut inserts: Vec<&SvgDiffShape<T>> = self
            .transformed
            .iter()
            .filter(|item| item.insert)
            .map(|item| &item.from)
            .collect();
        inserts.sort_by_key(|from| from.index);

        let mut children = current.to_vec();
        for (shift, from) in inserts.into_iter().enumerate() {
            let at = (from.index + shift).min(children.len());
            children.insert(at, from.node.shape.clone());
        }
        children
    }

    /// Children once the morph passes its midpoint: every target slot filled by the shape moving
    /// into it, with collapsing duplicates kept next to their target.
    ///
    /// Fails if a target slot is left without a shape, which means the diff was not built from
    /// a document of `to_len` nodes.
    pub fn final_order(&self, to_len: usize) -> VignetteResult<Vec<T>> {
        let mut slots: Vec<Option<T>> = vec![None; to_len];
        let mut collapsing: Vec<&SvgTransformed<T>> = Vec::new();

        for item in &self.transformed {
            if item.deleted {
                collapsing.push(item);
                continue;
            }
            let slot = slots.get_mut(item.to.index).ok_or_else(|| {
                VignetteError::invariant(format!("svg diff target index {} out of range", item.to.index))
            })?;
            *slot = Some(item.from.node.shape.clone());
        }
        for inserted in &self.inserted {
            let slot = slots.get_mut(inserted.index).ok_or_else(|| {
                VignetteError::invariant(format!("svg diff target index {} out of range", inserted.index))
            })?;
            *slot = Some(inserted.node.shape.clone());
        }

        let mut children = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    VignetteError::invariant(format!("svg diff left target slot {index} unmatched"))
                })
            })
            .collect::<VignetteResult<Vec<T>>>()?;

        collapsing.sort_by_key(|item| item.to.index);
        for (shift, item) in collapsing.into_iter().enumerate() {
            let at = (item.to.index + shift).min(children.len());
            children.insert(at, item.from.node.shape.clone());
        }
        Ok(children)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/svg/diff.rs"]
mod tests;
