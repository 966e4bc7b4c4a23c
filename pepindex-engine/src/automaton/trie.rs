//! Pointer-free keyword trie used while the needle set is being built

use smallvec::SmallVec;
use std::collections::VecDeque;

use super::compressed::Automaton;
use super::Hit;
use pepindex_core::{PepIndexError, PepIndexResult};

pub(crate) const ROOT: u32 = 0;
/// Absent output link
pub(crate) const NO_NODE: u32 = u32::MAX;

#[derive(Debug, Clone, Default)]
pub(crate) struct TrieNode {
    /// `(symbol, node)` pairs, in insertion order
    pub(crate) children: SmallVec<[(u8, u32); 4]>,
    pub(crate) fail: u32,
    /// Nearest node on the fail chain that ends a needle
    pub(crate) output_link: u32,
    /// Needles ending exactly here
    pub(crate) needles: SmallVec<[u32; 1]>,
    pub(crate) depth: u32,
}

/// Growable trie over needle byte strings
///
/// Nodes live in one arena and refer to each other by index. After all
/// needles are added, `build_links` derives fail and output links and
/// `compress` turns the trie into the flat [`Automaton`] that workers search.
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    pub(crate) nodes: Vec<TrieNode>,
    pub(crate) needle_lengths: Vec<u32>,
    linked: bool,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            needle_lengths: Vec::new(),
            linked: false,
        }
    }

    /// Insert a needle and return its id. Ids are dense and start at 0.
    pub fn add_needle(&mut self, needle: &[u8]) -> PepIndexResult<u32> {
        if needle.is_empty() {
            return Err(PepIndexError::InvalidInput(
                "cannot index an empty sequence".to_string(),
            ));
        }

        let id = self.needle_lengths.len() as u32;
        let mut node = ROOT;
        for &symbol in needle {
            node = match self.child(node, symbol) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len() as u32;
                    let depth = self.nodes[node as usize].depth + 1;
                    self.nodes.push(TrieNode {
                        depth,
                        ..TrieNode::default()
                    });
                    self.nodes[node as usize].children.push((symbol, next));
                    next
                }
            };
        }

        self.nodes[node as usize].needles.push(id);
        self.needle_lengths.push(needle.len() as u32);
        self.linked = false;
        Ok(id)
    }

    pub(crate) fn child(&self, node: u32, symbol: u8) -> Option<u32> {
        self.nodes[node as usize]
            .children
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|&(_, n)| n)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn needle_count(&self) -> usize {
        self.needle_lengths.len()
    }

    /// Compute fail and output links breadth first.
    pub fn build_links(&mut self) {
        if self.linked {
            return;
        }

        let mut queue = VecDeque::new();
        self.nodes[ROOT as usize].fail = ROOT;
        self.nodes[ROOT as usize].output_link = NO_NODE;

        let root_children: SmallVec<[(u8, u32); 4]> = self.nodes[ROOT as usize].children.clone();
        for (_, child) in root_children {
            self.nodes[child as usize].fail = ROOT;
            self.nodes[child as usize].output_link = NO_NODE;
            queue.push_back(child);
        }

        while let Some(node) = queue.pop_front() {
            let children: SmallVec<[(u8, u32); 4]> = self.nodes[node as usize].children.clone();
            for (symbol, child) in children {
                let mut fail = self.nodes[node as usize].fail;
                let target = loop {
                    if let Some(next) = self.child(fail, symbol) {
                        break next;
                    }
                    if fail == ROOT {
                        break ROOT;
                    }
                    fail = self.nodes[fail as usize].fail;
                };

                let fail_node = &self.nodes[target as usize];
                let output_link = if fail_node.needles.is_empty() {
                    fail_node.output_link
                } else {
                    target
                };

                let child_node = &mut self.nodes[child as usize];
                child_node.fail = target;
                child_node.output_link = output_link;
                queue.push_back(child);
            }
        }

        self.linked = true;
    }

    /// Exact Aho-Corasick scan on the uncompressed trie.
    ///
    /// Slow path for validation, the parallel search runs on the compressed
    /// automaton only.
    pub fn find_exact(&mut self, text: &[u8]) -> Vec<Hit> {
        self.build_links();

        let mut hits = Vec::new();
        let mut node = ROOT;
        for (pos, &symbol) in text.iter().enumerate() {
            node = loop {
                if let Some(next) = self.child(node, symbol) {
                    break next;
                }
                if node == ROOT {
                    break ROOT;
                }
                node = self.nodes[node as usize].fail;
            };

            let mut out = node;
            if self.nodes[out as usize].needles.is_empty() {
                out = self.nodes[out as usize].output_link;
            }
            while out != NO_NODE {
                for &needle in &self.nodes[out as usize].needles {
                    let len = self.needle_lengths[needle as usize] as usize;
                    hits.push(Hit {
                        needle,
                        start: pos + 1 - len,
                        len,
                    });
                }
                out = self.nodes[out as usize].output_link;
            }
        }

        hits.sort_by_key(|h| h.start);
        hits
    }

    /// Relabel the trie breadth first into the flat search layout.
    pub fn compress(mut self) -> Automaton {
        self.build_links();
        Automaton::from_trie(&self)
    }
}
