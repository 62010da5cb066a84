// FibSlicer: Rule-level equivalence classes of forwarding tables
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Prefix Trie
//!
//! A binary trie keyed by [`AddressRange`]. Each bit of the mask corresponds to one level of the
//! trie, such that the depth is bounded by 32. Nodes are stored in a table and refer to their
//! children by index. A node that holds content is called a *leaf*, even though it may have
//! children of its own (more specific entries).
//!
//! The central query is [`PrefixTrie::search_match`], which returns the *frontier* of installed
//! entries that govern any part of the queried range.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::types::AddressRange;

/// The root is always stored at this position.
const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct Node<T> {
    range: AddressRange,
    content: Option<T>,
    children: [Option<usize>; 2],
}

impl<T> Node<T> {
    fn new(range: AddressRange) -> Self {
        Self {
            range,
            content: None,
            children: [None, None],
        }
    }

    #[inline(always)]
    fn is_leaf(&self) -> bool {
        self.content.is_some()
    }

    #[inline(always)]
    fn has_children(&self) -> bool {
        self.children[0].is_some() || self.children[1].is_some()
    }
}

/// # Prefix Trie
///
/// Binary trie that maps address ranges to some content `T`. See the [module
/// documentation](self) for details.
#[derive(Debug, Clone)]
pub struct PrefixTrie<T> {
    nodes: Vec<Node<T>>,
    /// Slots of removed nodes that can be reused.
    free: Vec<usize>,
    /// number of leaf nodes
    len: usize,
}

impl<T> Default for PrefixTrie<T> {
    fn default() -> Self {
        Self {
            nodes: vec![Node::new(AddressRange::ALL)],
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> PrefixTrie<T> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ranges stored in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the trie holds no content.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove all entries of the trie.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT] = Node::new(AddressRange::ALL);
        self.free.clear();
        self.len = 0;
    }

    /// Allocate a new node, reusing a free slot if possible.
    fn alloc(&mut self, range: AddressRange) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Node::new(range);
            idx
        } else {
            self.nodes.push(Node::new(range));
            self.nodes.len() - 1
        }
    }

    /// Insert `content` at `range`, creating all missing nodes on the way. If the range was already
    /// present, the old content is replaced and returned.
    pub fn insert(&mut self, range: AddressRange, content: T) -> Option<T> {
        let mut cur = ROOT;
        for depth in 0..range.len() {
            let bit = range.bit(depth);
            cur = match self.nodes[cur].children[bit] {
                Some(next) => next,
                None => {
                    let child_range = self.nodes[cur].range.child(bit);
                    let next = self.alloc(child_range);
                    self.nodes[cur].children[bit] = Some(next);
                    next
                }
            };
        }
        let old = self.nodes[cur].content.replace(content);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Remove the content stored at exactly `range`. If the node has no children, it is detached
    /// from its parent (and so are all ancestors that became empty). If the node has children, only
    /// its content is removed. Removing a range that is not stored is a no-op and returns `None`.
    pub fn remove(&mut self, range: &AddressRange) -> Option<T> {
        let mut trace: Vec<(usize, usize)> = Vec::with_capacity(range.len() as usize);
        let mut cur = ROOT;
        for depth in 0..range.len() {
            let bit = range.bit(depth);
            trace.push((cur, bit));
            cur = self.nodes[cur].children[bit]?;
        }

        let content = self.nodes[cur].content.take()?;
        self.len -= 1;

        // detach all nodes that are now useless.
        while let Some((parent, bit)) = trace.pop() {
            if self.nodes[cur].is_leaf() || self.nodes[cur].has_children() {
                break;
            }
            self.nodes[parent].children[bit] = None;
            self.free.push(cur);
            cur = parent;
        }

        Some(content)
    }

    /// Get the content stored at exactly `range`.
    pub fn get(&self, range: &AddressRange) -> Option<&T> {
        self.find(range).and_then(|idx| self.nodes[idx].content.as_ref())
    }

    /// Get a mutable reference to the content stored at exactly `range`.
    pub fn get_mut(&mut self, range: &AddressRange) -> Option<&mut T> {
        let idx = self.find(range)?;
        self.nodes[idx].content.as_mut()
    }

    /// Returns `true` if some content is stored at exactly `range`.
    pub fn contains(&self, range: &AddressRange) -> bool {
        self.get(range).is_some()
    }

    /// Find the node index of exactly `range`.
    fn find(&self, range: &AddressRange) -> Option<usize> {
        let mut cur = ROOT;
        for depth in 0..range.len() {
            cur = self.nodes[cur].children[range.bit(depth)]?;
        }
        Some(cur)
    }

    /// Get the content of the most specific range that contains `range` (longest prefix match).
    pub fn get_lpm(&self, range: &AddressRange) -> Option<(AddressRange, &T)> {
        let mut cur = ROOT;
        let mut best = None;
        for depth in 0..=range.len() {
            let node = &self.nodes[cur];
            if let Some(c) = node.content.as_ref() {
                best = Some((node.range, c));
            }
            if depth == range.len() {
                break;
            }
            match node.children[range.bit(depth)] {
                Some(next) => cur = next,
                None => break,
            }
        }
        best
    }

    /// Search all entries that govern some part of `range`.
    ///
    /// - If the trie has no node at `range`, the most specific entry that contains `range` is
    ///   returned (if any). That entry is responsible for the entire queried range.
    /// - Otherwise, all leaves in the sub-trie rooted at `range` are returned, except the leaves
    ///   whose space is completely split by more specific leaves below them. If the sub-trie does
    ///   not cover the entire range, then the most specific strict ancestor entry also governs
    ///   some part of `range`, and is returned as well.
    ///
    /// The result is ordered by the position of the nodes in the trie (breadth-first).
    pub fn search_match(&self, range: &AddressRange) -> Vec<&T> {
        let mut matches = Vec::new();
        self.search_nodes(range, &mut matches);
        matches
            .into_iter()
            .filter_map(|idx| self.nodes[idx].content.as_ref())
            .collect()
    }

    /// Search all entries that govern some part of any range in `ranges`. Each entry is reported
    /// only once, even if it is matched by multiple ranges.
    pub fn search_match_many<'a, I>(&self, ranges: I) -> Vec<&T>
    where
        I: IntoIterator<Item = &'a AddressRange>,
    {
        let mut seen: BTreeSet<usize> = BTreeSet::new();
        let mut matches = Vec::new();
        for range in ranges {
            self.search_nodes(range, &mut matches);
            seen.extend(matches.drain(..));
        }
        seen.into_iter()
            .filter_map(|idx| self.nodes[idx].content.as_ref())
            .collect()
    }

    /// Search all node indices that match `range`, and append them to `matches`.
    fn search_nodes(&self, range: &AddressRange, matches: &mut Vec<usize>) {
        let mut cur = ROOT;
        let mut last_leaf = None;
        for depth in 0..range.len() {
            if self.nodes[cur].is_leaf() {
                last_leaf = Some(cur);
            }
            match self.nodes[cur].children[range.bit(depth)] {
                Some(next) => cur = next,
                None => {
                    // a less specific entry governs the entire range
                    matches.extend(last_leaf);
                    return;
                }
            }
        }

        // breadth-first order of the sub-trie
        let mut order = Vec::new();
        let mut queue = VecDeque::from([cur]);
        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            queue.extend(self.nodes[idx].children.iter().flatten().copied());
        }

        // compute bottom-up which nodes are completely covered by leaves.
        let mut covered: HashMap<usize, bool> = HashMap::with_capacity(order.len());
        for &idx in order.iter().rev() {
            let node = &self.nodes[idx];
            let c = node.is_leaf() || self.is_repartitioned(node, &covered);
            covered.insert(idx, c);
        }

        if !covered.get(&cur).copied().unwrap_or(false) {
            matches.extend(last_leaf);
        }

        matches.extend(order.into_iter().filter(|idx| {
            let node = &self.nodes[*idx];
            node.is_leaf() && !self.is_repartitioned(node, &covered)
        }));
    }

    /// A node is fully repartitioned if both children exist and both are covered. Nodes that were
    /// not yet visited are never considered covered.
    fn is_repartitioned(&self, node: &Node<T>, covered: &HashMap<usize, bool>) -> bool {
        node.children
            .iter()
            .all(|c| c.and_then(|c| covered.get(&c).copied()).unwrap_or(false))
    }

    /// Iterate over all ranges and their content in pre-order (less specific ranges first).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            trie: self,
            stack: vec![ROOT],
        }
    }

    /// Iterate over all ranges stored in the trie in pre-order.
    pub fn ranges(&self) -> impl Iterator<Item = AddressRange> + '_ {
        self.iter().map(|(r, _)| r)
    }
}

impl<T> FromIterator<(AddressRange, T)> for PrefixTrie<T> {
    fn from_iter<I: IntoIterator<Item = (AddressRange, T)>>(iter: I) -> Self {
        let mut trie = Self::new();
        for (range, content) in iter {
            trie.insert(range, content);
        }
        trie
    }
}

/// Iterator over all entries of a [`PrefixTrie`], yielding less specific ranges before more
/// specific ones.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    trie: &'a PrefixTrie<T>,
    stack: Vec<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (AddressRange, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            let node = &self.trie.nodes[idx];
            // push the right child first, such that the left one is visited first.
            self.stack.extend(node.children.iter().rev().flatten().copied());
            if let Some(c) = node.content.as_ref() {
                return Some((node.range, c));
            }
        }
        None
    }
}

impl<'a, T> IntoIterator for &'a PrefixTrie<T> {
    type Item = (AddressRange, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
