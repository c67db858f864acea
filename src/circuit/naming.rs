//! Node name canonicalization.
//!
//! Every distinct node spelling seen on a device line becomes one element of
//! a disjoint-set. Without `.ALIAS` directives each spelling stays in its own
//! set, so canonicalization reduces to first-seen identity assignment. Alias
//! pairs union their sets; the merged class takes the index and name of its
//! earliest-seen member, and any class containing ground is ground. A class
//! made only of alias spellings names no device terminal and gets no index.

use std::collections::{HashMap, HashSet};

use super::types::{is_ground_name, Node, NodeId, GROUND_NAME};

/// Disjoint-set forest with path compression and union by rank.
#[derive(Debug, Clone, Default)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn push(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Collects raw node-name occurrences and assigns canonical indices.
#[derive(Debug, Clone)]
pub struct NodeNamer {
    sets: UnionFind,
    /// Spelling -> element, in first-seen order
    elements: HashMap<String, usize>,
    spellings: Vec<String>,
    /// Whether the element was seen on a device line
    observed: Vec<bool>,
}

impl Default for NodeNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeNamer {
    /// Create a namer with ground pre-registered as element 0.
    pub fn new() -> Self {
        let mut namer = Self {
            sets: UnionFind::default(),
            elements: HashMap::new(),
            spellings: Vec::new(),
            observed: Vec::new(),
        };
        namer.observe(GROUND_NAME);
        namer
    }

    /// Record one occurrence of a node name.
    pub fn observe(&mut self, name: &str) -> usize {
        let element = self.intern(name);
        self.observed[element] = true;
        element
    }

    fn intern(&mut self, name: &str) -> usize {
        let key = if is_ground_name(name) { GROUND_NAME } else { name };
        if let Some(&element) = self.elements.get(key) {
            return element;
        }
        let element = self.sets.push();
        self.elements.insert(key.to_string(), element);
        self.spellings.push(key.to_string());
        self.observed.push(false);
        element
    }

    /// Record a whole occurrence sequence in order.
    pub fn observe_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.observe(name);
        }
    }

    /// Declare two spellings as the same electrical node.
    ///
    /// Neither spelling counts as observed. Aliases may be declared in any
    /// order; only the final classes matter.
    pub fn alias(&mut self, a: &str, b: &str) {
        let ea = self.intern(a);
        let eb = self.intern(b);
        self.sets.union(ea, eb);
    }

    /// Assign contiguous indices: ground is 0, other classes follow in
    /// first-seen order. Classes with no observed member are dropped.
    pub fn canonicalize(mut self) -> NodeMapping {
        let mut live = HashSet::new();
        for element in 0..self.spellings.len() {
            if self.observed[element] {
                live.insert(self.sets.find(element));
            }
        }

        let mut class_ids: HashMap<usize, NodeId> = HashMap::new();
        let mut nodes = Vec::new();
        let mut lookup = HashMap::with_capacity(self.spellings.len());

        let ground_root = self.sets.find(0);
        class_ids.insert(ground_root, NodeId::GROUND);
        nodes.push(Node {
            index: NodeId::GROUND,
            name: GROUND_NAME.to_string(),
        });

        for element in 0..self.spellings.len() {
            let root = self.sets.find(element);
            if !live.contains(&root) {
                continue;
            }
            let id = *class_ids.entry(root).or_insert_with(|| {
                let id = NodeId(nodes.len());
                nodes.push(Node {
                    index: id,
                    name: self.spellings[element].clone(),
                });
                id
            });
            lookup.insert(self.spellings[element].clone(), id);
        }

        NodeMapping { nodes, lookup }
    }
}

/// Result of canonicalization: the node table plus spelling lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMapping {
    nodes: Vec<Node>,
    lookup: HashMap<String, NodeId>,
}

impl NodeMapping {
    /// Canonical nodes in index order (ground first).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Canonical index of a raw spelling.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        if is_ground_name(name) {
            return Some(NodeId::GROUND);
        }
        self.lookup.get(name).copied()
    }

    /// All (spelling, index) pairs, including aliases.
    pub fn spellings(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.lookup.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
