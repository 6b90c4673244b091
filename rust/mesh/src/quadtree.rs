// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region quadtree over polygon bounds.
//!
//! Each polygon is stored, together with its bounds, in the deepest node
//! whose (closed) area fully contains those bounds. Nodes are subdivided
//! lazily on insertion and collapsed again when removals leave a subtree
//! empty. Nodes live in a slot map with parent links so trimming can walk
//! upward from the node that lost an item.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use roommodel_geometry::{Area, Position};

use crate::ids::PolygonId;

new_key_type! {
    /// Key for a quadtree node.
    pub struct NodeKey;
}

/// Default minimum side length of a quadtree leaf.
pub const DEFAULT_MIN_SIZE: i32 = 16;

#[derive(Debug, Clone)]
struct QuadNode {
    area: Area,
    parent: Option<NodeKey>,
    children: Option<[NodeKey; 4]>,
    items: Vec<(PolygonId, Area)>,
}

impl QuadNode {
    fn new(area: Area, parent: Option<NodeKey>) -> Self {
        Self {
            area,
            parent,
            children: None,
            items: Vec::new(),
        }
    }
}

/// A region quadtree mapping polygon ids to their bounds.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: SlotMap<NodeKey, QuadNode>,
    root: NodeKey,
    min_size: i32,
    locations: FxHashMap<PolygonId, NodeKey>,
}

impl QuadTree {
    /// Creates an empty tree covering `bounds`. Leaves are never split below
    /// `min_size` units on either side.
    pub fn new(bounds: Area, min_size: i32) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(QuadNode::new(bounds, None));
        Self {
            nodes,
            root,
            min_size: min_size.max(1),
            locations: FxHashMap::default(),
        }
    }

    /// The area covered by the tree.
    pub fn bounds(&self) -> Area {
        self.nodes[self.root].area
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of allocated nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the item is in the tree.
    pub fn contains(&self, id: PolygonId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Returns the bounds the item was inserted with.
    pub fn item_bounds(&self, id: PolygonId) -> Option<Area> {
        let key = self.locations.get(&id)?;
        self.nodes
            .get(*key)?
            .items
            .iter()
            .find(|(item, _)| *item == id)
            .map(|(_, area)| *area)
    }

    /// Iterates over all items and their bounds, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = (PolygonId, Area)> + '_ {
        self.nodes.values().flat_map(|n| n.items.iter().copied())
    }

    /// Inserts an item. Returns `false` if the item is already present or its
    /// bounds are not inside the tree bounds.
    pub fn insert(&mut self, id: PolygonId, area: Area) -> bool {
        if self.locations.contains_key(&id) || !self.bounds().contains(&area) {
            return false;
        }

        let mut key = self.root;
        loop {
            if !self.splittable(key) {
                break;
            }
            let children = self.ensure_children(key);
            match children
                .iter()
                .find(|&&c| self.nodes[c].area.contains(&area))
            {
                Some(&child) => key = child,
                None => break,
            }
        }

        self.nodes[key].items.push((id, area));
        self.locations.insert(id, key);
        true
    }

    /// Removes an item. Returns `false` if it was not present.
    pub fn remove(&mut self, id: PolygonId) -> bool {
        let key = match self.locations.remove(&id) {
            Some(key) => key,
            None => return false,
        };

        self.nodes[key].items.retain(|(item, _)| *item != id);
        self.trim(key);
        true
    }

    /// Returns the items whose bounds overlap `area`, in ascending id order.
    pub fn overlapped_by(&self, area: &Area) -> Vec<PolygonId> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];

        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if !node.area.touches(area) {
                continue;
            }
            result.extend(
                node.items
                    .iter()
                    .filter(|(_, b)| b.overlaps(area))
                    .map(|(id, _)| *id),
            );
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }

        result.sort_unstable();
        result
    }

    /// Returns the items whose bounds contain `p`, in ascending id order.
    pub fn containing_point(&self, p: Position) -> Vec<PolygonId> {
        let probe = Area::of(p.x, p.x, p.y, p.y);
        let mut result = Vec::new();
        let mut stack = vec![self.root];

        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            if !node.area.touches(&probe) {
                continue;
            }
            result.extend(
                node.items
                    .iter()
                    .filter(|(_, b)| b.contains_point(p))
                    .map(|(id, _)| *id),
            );
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }

        result.sort_unstable();
        result
    }

    fn splittable(&self, key: NodeKey) -> bool {
        let area = self.nodes[key].area;
        let min = self.min_size as i64;
        area.width() / 2 >= min && area.height() / 2 >= min
    }

    fn ensure_children(&mut self, key: NodeKey) -> [NodeKey; 4] {
        if let Some(children) = self.nodes[key].children {
            return children;
        }

        let quadrants = self.nodes[key].area.quadrants();
        let children = quadrants.map(|q| self.nodes.insert(QuadNode::new(q, Some(key))));
        self.nodes[key].children = Some(children);
        children
    }

    fn is_bare_leaf(&self, key: NodeKey) -> bool {
        let node = &self.nodes[key];
        node.children.is_none() && node.items.is_empty()
    }

    /// Collapses empty subtrees from `key` upward.
    fn trim(&mut self, key: NodeKey) {
        let mut cursor = Some(key);
        while let Some(key) = cursor {
            if let Some(children) = self.nodes[key].children {
                if !children.iter().all(|&c| self.is_bare_leaf(c)) {
                    break;
                }
                for c in children {
                    self.nodes.remove(c);
                }
                self.nodes[key].children = None;
            }
            if !self.nodes[key].items.is_empty() {
                break;
            }
            cursor = self.nodes[key].parent;
        }
    }
}
