//! Node pool and open list implementations for the corridor search
//!

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::PolyRef;

/// Node flags for search state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const EMPTY: NodeFlags = NodeFlags(0x00);
    pub const OPEN: NodeFlags = NodeFlags(0x01);
    pub const CLOSED: NodeFlags = NodeFlags(0x02);

    pub fn contains(&self, flag: NodeFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn insert(&mut self, flag: NodeFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: NodeFlags) {
        self.0 &= !flag.0;
    }
}

/// Node index type
pub type NodeIndex = u32;

/// Null node index constant
pub const NULL_NODE_IDX: NodeIndex = NodeIndex::MAX;

/// Search node for one polygon, alive for a single query
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Polygon the node corresponds to
    pub poly: PolyRef,
    /// Representative point of the polygon
    pub pos: [f32; 3],
    /// Accumulated cost from the start polygon
    pub g: f32,
    /// Heuristic estimate to the goal
    pub h: f32,
    /// Combined priority (g + h)
    pub f: f32,
    /// Index of the predecessor node
    pub parent: NodeIndex,
    pub flags: NodeFlags,
}

impl SearchNode {
    fn new(poly: PolyRef) -> Self {
        Self {
            poly,
            pos: [0.0; 3],
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: NULL_NODE_IDX,
            flags: NodeFlags::EMPTY,
        }
    }
}

/// Node pool keyed by polygon, with a fixed upper bound on node count
#[derive(Debug)]
pub struct NodePool {
    /// Node storage
    nodes: Vec<SearchNode>,
    /// First node index for each hash bucket
    first: Vec<NodeIndex>,
    /// Next node index in hash chain
    next: Vec<NodeIndex>,
    /// Maximum number of nodes
    max_nodes: usize,
}

impl NodePool {
    /// Creates a new node pool holding at most `max_nodes` nodes
    pub fn new(max_nodes: usize) -> Self {
        let max_nodes = max_nodes.clamp(1, NULL_NODE_IDX as usize);
        let hash_size = (max_nodes / 4).max(1).next_power_of_two();

        Self {
            nodes: Vec::new(),
            first: vec![NULL_NODE_IDX; hash_size],
            next: Vec::new(),
            max_nodes,
        }
    }

    /// Clears the node pool
    pub fn clear(&mut self) {
        self.first.fill(NULL_NODE_IDX);
        self.next.clear();
        self.nodes.clear();
    }

    /// Gets or allocates the node for a polygon.
    ///
    /// Returns `None` once the pool is full.
    pub fn get_node(&mut self, poly: PolyRef) -> Option<NodeIndex> {
        if let Some(idx) = self.find_node(poly) {
            return Some(idx);
        }

        if self.nodes.len() >= self.max_nodes {
            return None;
        }

        let idx = self.nodes.len() as NodeIndex;
        self.nodes.push(SearchNode::new(poly));

        let bucket = self.bucket(poly);
        self.next.push(self.first[bucket]);
        self.first[bucket] = idx;

        Some(idx)
    }

    /// Finds the node for a polygon, if one was allocated
    pub fn find_node(&self, poly: PolyRef) -> Option<NodeIndex> {
        let mut idx = self.first[self.bucket(poly)];

        while idx != NULL_NODE_IDX {
            if self.nodes[idx as usize].poly == poly {
                return Some(idx);
            }
            idx = self.next[idx as usize];
        }

        None
    }

    /// Gets a node by index
    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &SearchNode {
        &self.nodes[idx as usize]
    }

    /// Gets a mutable node by index
    #[inline]
    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut SearchNode {
        &mut self.nodes[idx as usize]
    }

    /// Gets the maximum number of nodes
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Gets the current node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn bucket(&self, poly: PolyRef) -> usize {
        let a = poly.id() as usize;
        (a ^ (a >> 16)) & (self.first.len() - 1)
    }
}

/// Open list entry. Stale entries are left in the heap and skipped on pop.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    node: NodeIndex,
    poly: PolyRef,
    f: f32,
    g: f32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap: lowest f, then lowest g, then
        // lowest polygon index pops first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.poly.cmp(&self.poly))
    }
}

/// Priority queue of open nodes
#[derive(Debug, Default)]
pub struct NodeQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl NodeQueue {
    /// Creates a new, empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the queue
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Pushes a node with its current priority.
    ///
    /// Pushing an already queued node re-prioritizes it; the older entry
    /// becomes stale.
    pub fn push(&mut self, idx: NodeIndex, node: &SearchNode) {
        self.heap.push(QueueEntry {
            node: idx,
            poly: node.poly,
            f: node.f,
            g: node.g,
        });
    }

    /// Pops the open node with the lowest priority, skipping stale entries
    pub fn pop(&mut self, pool: &NodePool) -> Option<NodeIndex> {
        while let Some(entry) = self.heap.pop() {
            let node = pool.node(entry.node);
            if node.flags.contains(NodeFlags::CLOSED) || node.g.to_bits() != entry.g.to_bits() {
                continue;
            }
            return Some(entry.node);
        }
        None
    }

    /// Checks if the queue has no entries (live or stale)
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of entries, including stale ones
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
