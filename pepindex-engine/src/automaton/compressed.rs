//! Flat, breadth-first automaton layout searched by the workers

use super::trie::{TrieBuilder, NO_NODE, ROOT};
use super::SearchBudget;
use pepindex_core::{PepIndexError, PepIndexResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node {
    /// Symbol on the edge from the parent
    symbol: u8,
    child_count: u16,
    first_child: u32,
    fail: u32,
    output_link: u32,
    out_start: u32,
    out_count: u32,
    depth: u32,
}

/// Aho-Corasick automaton over the needle set, relabelled breadth first
///
/// All nodes sit in one array. The children of a node occupy a contiguous,
/// symbol-sorted range starting at `first_child`, so a transition is a binary
/// search over a few adjacent entries. Needle ids ending at a node are a
/// range of the shared `outputs` array. The automaton is immutable and
/// shared by reference between workers.
#[derive(Debug, Clone)]
pub struct Automaton {
    nodes: Vec<Node>,
    outputs: Vec<u32>,
    needle_lengths: Vec<u32>,
    min_needle_len: usize,
    budget: SearchBudget,
}

impl Automaton {
    /// Build the automaton for `needles`; needle ids follow input order.
    pub fn build<'a, I>(needles: I, budget: SearchBudget) -> PepIndexResult<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut trie = TrieBuilder::new();
        for needle in needles {
            trie.add_needle(needle)?;
        }
        if trie.needle_count() == 0 {
            return Err(PepIndexError::EmptyNeedleSet);
        }
        Ok(trie.compress().with_budget(budget))
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Length of the shortest needle (0 without needles)
    pub fn min_needle_len(&self) -> usize {
        self.min_needle_len
    }

    pub(crate) fn from_trie(trie: &TrieBuilder) -> Self {
        let node_count = trie.nodes.len();
        let mut order: Vec<u32> = Vec::with_capacity(node_count);
        let mut symbols: Vec<u8> = Vec::with_capacity(node_count);
        let mut first_child: Vec<u32> = Vec::with_capacity(node_count);
        let mut new_id = vec![0u32; node_count];

        order.push(ROOT);
        symbols.push(0);

        let mut head = 0;
        while head < order.len() {
            let old = order[head] as usize;
            head += 1;

            let mut children = trie.nodes[old].children.clone();
            children.sort_unstable_by_key(|&(symbol, _)| symbol);

            first_child.push(order.len() as u32);
            for (symbol, child) in children {
                new_id[child as usize] = order.len() as u32;
                order.push(child);
                symbols.push(symbol);
            }
        }

        let mut nodes = Vec::with_capacity(node_count);
        let mut outputs = Vec::new();
        for (k, &old) in order.iter().enumerate() {
            let source = &trie.nodes[old as usize];
            let out_start = outputs.len() as u32;
            outputs.extend_from_slice(&source.needles);

            nodes.push(Node {
                symbol: symbols[k],
                child_count: source.children.len() as u16,
                first_child: first_child[k],
                fail: new_id[source.fail as usize],
                output_link: if source.output_link == NO_NODE {
                    NO_NODE
                } else {
                    new_id[source.output_link as usize]
                },
                out_start,
                out_count: source.needles.len() as u32,
                depth: source.depth,
            });
        }

        Self {
            nodes,
            outputs,
            needle_lengths: trie.needle_lengths.clone(),
            min_needle_len: trie.needle_lengths.iter().min().copied().unwrap_or(0) as usize,
            budget: SearchBudget::exact(),
        }
    }

    pub fn root(&self) -> u32 {
        ROOT
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn needle_count(&self) -> usize {
        self.needle_lengths.len()
    }

    pub fn needle_len(&self, needle: u32) -> usize {
        self.needle_lengths[needle as usize] as usize
    }

    pub fn depth(&self, node: u32) -> usize {
        self.nodes[node as usize].depth as usize
    }

    pub fn fail(&self, node: u32) -> u32 {
        self.nodes[node as usize].fail
    }

    /// Next node ending a needle on the fail chain, if any
    pub fn output_link(&self, node: u32) -> Option<u32> {
        match self.nodes[node as usize].output_link {
            NO_NODE => None,
            link => Some(link),
        }
    }

    /// Needles ending exactly at `node`
    pub fn needles_at(&self, node: u32) -> &[u32] {
        let n = &self.nodes[node as usize];
        &self.outputs[n.out_start as usize..(n.out_start + n.out_count) as usize]
    }

    /// `(symbol, child)` pairs of `node` in symbol order
    pub fn children(&self, node: u32) -> impl Iterator<Item = (u8, u32)> + '_ {
        let n = &self.nodes[node as usize];
        (n.first_child..n.first_child + n.child_count as u32)
            .map(move |child| (self.nodes[child as usize].symbol, child))
    }

    pub fn child(&self, node: u32, symbol: u8) -> Option<u32> {
        let n = &self.nodes[node as usize];
        let start = n.first_child as usize;
        let range = &self.nodes[start..start + n.child_count as usize];
        range
            .binary_search_by_key(&symbol, |c| c.symbol)
            .ok()
            .map(|i| (start + i) as u32)
    }

    /// Exact transition, falling back along fail links.
    pub fn step(&self, mut node: u32, symbol: u8) -> u32 {
        loop {
            if let Some(next) = self.child(node, symbol) {
                return next;
            }
            if node == ROOT {
                return ROOT;
            }
            node = self.fail(node);
        }
    }
}
