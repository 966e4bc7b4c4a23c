//! Per-worker scan state
//!
//! The exact Aho-Corasick walk (the *primary* state) finds every occurrence
//! without substitutions. When a budget is available, every position also
//! opens *spawned* states: for each node on the primary state's fail chain
//! (every needle prefix ending at the previous residue, the root included)
//! and each outgoing edge whose symbol differs from the current residue, a
//! spawn pays one substitution and continues from the child. Spawns follow
//! edges exactly for free and keep branching on substitutions while budget
//! remains. They have no fail links and die once stuck.
//!
//! Every alignment of a needle prefix against the text is reached along
//! exactly one path (its first substitution fixes the spawn point), so no
//! occurrence is reported twice.

use pepindex_bio::alphabet::{substitution, Substitution, UNKNOWN_AA};

use super::{Automaton, Hit, SearchBudget};

#[derive(Debug, Clone, Copy)]
struct Spawn {
    node: u32,
    aaa_left: u8,
    mm_left: u8,
}

impl Spawn {
    fn with_budget(budget: SearchBudget) -> Self {
        Self {
            node: 0,
            aaa_left: budget.aaa() as u8,
            mm_left: budget.mismatches() as u8,
        }
    }

    fn exhausted(&self) -> bool {
        self.aaa_left == 0 && self.mm_left == 0
    }

    /// Follow the edge labelled `symbol` to `child` while reading `residue`.
    fn advance(self, symbol: u8, residue: u8, child: u32) -> Option<Spawn> {
        match substitution(residue, symbol) {
            Substitution::Exact => Some(Spawn { node: child, ..self }),
            Substitution::Ambiguous if self.aaa_left > 0 => Some(Spawn {
                node: child,
                aaa_left: self.aaa_left - 1,
                ..self
            }),
            Substitution::Mismatch if self.mm_left > 0 => Some(Spawn {
                node: child,
                mm_left: self.mm_left - 1,
                ..self
            }),
            _ => None,
        }
    }
}

/// Reusable scan buffers of one worker
///
/// Holds the current query and scratch space that grows to the largest
/// input seen, so scanning entry after entry does not reallocate.
#[derive(Debug, Default)]
pub struct MatchState {
    query: Vec<u8>,
    spawns: Vec<Spawn>,
    next: Vec<Spawn>,
    piece_hits: Vec<Hit>,
    hits: Vec<Hit>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the sequence to scan next.
    pub fn set_query(&mut self, sequence: &[u8]) {
        self.query.clear();
        self.query.extend_from_slice(sequence);
        self.hits.clear();
    }

    /// Scan the current query and return every occurrence, ordered by start
    /// offset.
    ///
    /// Runs of `X` longer than the total budget plus one cannot lie inside a
    /// match, so the query is cut there. Each piece keeps as many `X` on each
    /// side as the budget could pay for, and hits of a piece that end inside
    /// the previous piece are dropped because that piece already reported
    /// them. Needles matching only inside such a run are seen at its edges
    /// only.
    pub fn get_all_hits(&mut self, automaton: &Automaton) -> &[Hit] {
        let MatchState {
            query,
            spawns,
            next,
            piece_hits,
            hits,
        } = self;
        hits.clear();

        if query.len() < automaton.min_needle_len() || automaton.needle_count() == 0 {
            return hits;
        }

        let keep = automaton.budget().total();
        let mut piece_start = 0;
        let mut covered_until = 0;
        let mut i = 0;
        while i < query.len() {
            if query[i] != UNKNOWN_AA {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < query.len() && query[i] == UNKNOWN_AA {
                i += 1;
            }
            if i - run_start > keep + 1 {
                let piece_end = run_start + keep;
                scan(automaton, &query[piece_start..piece_end], piece_start, spawns, next, piece_hits);
                hits.extend(piece_hits.iter().filter(|h| h.end() > covered_until));
                covered_until = piece_end;
                piece_start = i - keep;
            }
        }
        scan(automaton, &query[piece_start..], piece_start, spawns, next, piece_hits);
        hits.extend(piece_hits.iter().filter(|h| h.end() > covered_until));

        hits.sort_by_key(|h| h.start);
        hits
    }

    /// `set_query` followed by `get_all_hits`
    pub fn search(&mut self, automaton: &Automaton, sequence: &[u8]) -> &[Hit] {
        self.set_query(sequence);
        self.get_all_hits(automaton)
    }
}

/// Scan one piece; hit offsets are shifted by `offset`.
fn scan(
    automaton: &Automaton,
    text: &[u8],
    offset: usize,
    spawns: &mut Vec<Spawn>,
    next: &mut Vec<Spawn>,
    hits: &mut Vec<Hit>,
) {
    hits.clear();
    spawns.clear();
    if text.len() < automaton.min_needle_len() {
        return;
    }

    let budget = automaton.budget();
    let root = automaton.root();
    let mut primary = root;

    for (i, &residue) in text.iter().enumerate() {
        let end = offset + i + 1;
        next.clear();

        for spawn in spawns.iter() {
            if spawn.exhausted() {
                if let Some(child) = automaton.child(spawn.node, residue) {
                    next.push(Spawn { node: child, ..*spawn });
                }
                continue;
            }
            for (symbol, child) in automaton.children(spawn.node) {
                if let Some(advanced) = spawn.advance(symbol, residue, child) {
                    next.push(advanced);
                }
            }
        }

        if budget.total() > 0 {
            let fresh = Spawn::with_budget(budget);
            let mut node = primary;
            loop {
                for (symbol, child) in automaton.children(node) {
                    if symbol == residue {
                        continue;
                    }
                    if let Some(spawn) = fresh.advance(symbol, residue, child) {
                        next.push(spawn);
                    }
                }
                if node == root {
                    break;
                }
                node = automaton.fail(node);
            }
        }

        primary = automaton.step(primary, residue);
        let mut out = Some(primary);
        while let Some(node) = out {
            for &needle in automaton.needles_at(node) {
                let len = automaton.needle_len(needle);
                hits.push(Hit {
                    needle,
                    start: end - len,
                    len,
                });
            }
            out = automaton.output_link(node);
        }

        for spawn in next.iter() {
            for &needle in automaton.needles_at(spawn.node) {
                let len = automaton.needle_len(needle);
                hits.push(Hit {
                    needle,
                    start: end - len,
                    len,
                });
            }
        }

        std::mem::swap(spawns, next);
    }
}
