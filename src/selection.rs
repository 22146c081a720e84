//! Greedy maximal-marginal-relevance selection over a growing candidate pool

use std::collections::HashSet;

use crate::scoring::{cosine_similarity, max_similarity};
use crate::types::{Node, ScoredNode};

/// A node waiting to be selected
#[derive(Debug, Clone)]
pub struct Candidate {
    pub node: Node,
    pub embedding: Vec<f32>,
    /// Similarity to the query
    pub similarity: f32,
    /// Hops from the nearest similarity-discovered root
    pub depth: usize,
    /// Highest similarity to an already-selected node, `None` while nothing is selected
    redundancy: Option<f32>,
}

impl Candidate {
    pub fn id(&self) -> &str {
        self.node.id.as_deref().unwrap_or_default()
    }

    fn mmr_score(&self, lambda_mult: f32) -> f32 {
        lambda_mult * self.similarity - (1.0 - lambda_mult) * self.redundancy.unwrap_or(0.0)
    }
}

/// Candidate pool for MMR.
///
/// Candidates are kept in discovery order; the first discovery of an id is
/// the only one that counts, and equal scores resolve to the earlier
/// candidate.
pub struct MmrSelector {
    lambda_mult: f32,
    score_threshold: f32,
    candidates: Vec<Candidate>,
    seen: HashSet<String>,
    selected_embeddings: Vec<Vec<f32>>,
}

impl MmrSelector {
    pub fn new(lambda_mult: f32, score_threshold: f32) -> Self {
        Self {
            lambda_mult,
            score_threshold,
            candidates: Vec::new(),
            seen: HashSet::new(),
            selected_embeddings: Vec::new(),
        }
    }

    /// Record an id that must never become a candidate. Returns false if
    /// it was already known.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    /// Add newly discovered nodes at `depth`. Ids seen before are ignored,
    /// as are nodes below the score threshold. Nodes without an id are
    /// never deduplicated. Returns how many joined.
    pub fn add_candidates(&mut self, nodes: Vec<ScoredNode>, depth: usize) -> usize {
        let mut added = 0;
        for scored in nodes {
            if let Some(id) = scored.node.id.as_deref() {
                if !self.seen.insert(id.to_string()) {
                    continue;
                }
            }
            if !(scored.score >= self.score_threshold) {
                continue;
            }
            let redundancy = if self.selected_embeddings.is_empty() {
                None
            } else {
                Some(max_similarity(&scored.embedding, &self.selected_embeddings))
            };
            self.candidates.push(Candidate {
                node: scored.node,
                embedding: scored.embedding,
                similarity: scored.score,
                depth,
                redundancy,
            });
            added += 1;
        }
        added
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected_embeddings.len()
    }

    /// Remove and return the best candidate, updating the redundancy of the
    /// rest against it.
    pub fn pop_best(&mut self) -> Option<Candidate> {
        let best_idx = self.find_best()?;
        let best = self.candidates.remove(best_idx);

        for cand in &mut self.candidates {
            let sim = cosine_similarity(&cand.embedding, &best.embedding);
            cand.redundancy = Some(cand.redundancy.map_or(sim, |r| r.max(sim)));
        }
        self.selected_embeddings.push(best.embedding.clone());
        Some(best)
    }

    fn find_best(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, cand) in self.candidates.iter().enumerate() {
            let score = cand.mmr_score(self.lambda_mult);
            // strict comparison: earlier discovery wins ties
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: f32, embedding: Vec<f32>) -> ScoredNode {
        ScoredNode {
            node: Node::new(id).with_id(id),
            score,
            embedding,
        }
    }

    #[test]
    fn test_pure_similarity_order() {
        let mut sel = MmrSelector::new(1.0, f32::NEG_INFINITY);
        sel.add_candidates(
            vec![
                scored("low", 0.2, vec![1.0, 0.0]),
                scored("high", 0.9, vec![1.0, 0.0]),
                scored("mid", 0.5, vec![1.0, 0.0]),
            ],
            0,
        );
        let order: Vec<String> = std::iter::from_fn(|| sel.pop_best())
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_diversity_penalty() {
        // "dup" is nearly as relevant as "top" but identical to it
        let mut sel = MmrSelector::new(0.5, f32::NEG_INFINITY);
        sel.add_candidates(
            vec![
                scored("top", 0.9, vec![1.0, 0.0]),
                scored("dup", 0.85, vec![1.0, 0.0]),
                scored("other", 0.6, vec![0.0, 1.0]),
            ],
            0,
        );
        assert_eq!(sel.pop_best().unwrap().id(), "top");
        assert_eq!(sel.pop_best().unwrap().id(), "other");
        assert_eq!(sel.pop_best().unwrap().id(), "dup");
        assert!(sel.pop_best().is_none());
    }

    #[test]
    fn test_ties_prefer_first_discovered() {
        let mut sel = MmrSelector::new(0.5, f32::NEG_INFINITY);
        sel.add_candidates(vec![scored("first", 0.7, vec![1.0, 0.0])], 0);
        sel.add_candidates(vec![scored("second", 0.7, vec![1.0, 0.0])], 1);
        assert_eq!(sel.pop_best().unwrap().id(), "first");
    }

    #[test]
    fn test_threshold_and_dedup() {
        let mut sel = MmrSelector::new(0.5, 0.5);
        let added = sel.add_candidates(
            vec![
                scored("ok", 0.5, vec![1.0]),
                scored("below", 0.49, vec![1.0]),
                scored("ok", 0.9, vec![1.0]),
            ],
            0,
        );
        assert_eq!(added, 1);
        // rejected ids stay rejected when rediscovered
        assert_eq!(sel.add_candidates(vec![scored("below", 0.9, vec![1.0])], 1), 0);
        let c = sel.pop_best().unwrap();
        assert_eq!((c.id(), c.similarity, c.depth), ("ok", 0.5, 0));
    }

    #[test]
    fn test_marked_roots_never_candidates() {
        let mut sel = MmrSelector::new(0.5, f32::NEG_INFINITY);
        assert!(sel.mark_seen("root"));
        assert_eq!(sel.add_candidates(vec![scored("root", 1.0, vec![1.0])], 0), 0);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_idless_nodes_are_all_kept() {
        let mut sel = MmrSelector::new(0.5, f32::NEG_INFINITY);
        let anonymous = |score| ScoredNode {
            node: Node::new("anonymous"),
            score,
            embedding: vec![1.0],
        };
        assert_eq!(sel.add_candidates(vec![anonymous(0.9), anonymous(0.8)], 0), 2);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_late_candidate_gets_redundancy() {
        let mut sel = MmrSelector::new(0.5, f32::NEG_INFINITY);
        sel.add_candidates(vec![scored("a", 0.9, vec![1.0, 0.0])], 0);
        sel.pop_best();
        sel.add_candidates(
            vec![scored("same", 0.8, vec![1.0, 0.0]), scored("orth", 0.5, vec![0.0, 1.0])],
            1,
        );
        // same: 0.4 - 0.5 = -0.1, orth: 0.25 - 0 = 0.25
        assert_eq!(sel.pop_best().unwrap().id(), "orth");
        assert_eq!(sel.selected_count(), 2);
    }
}
