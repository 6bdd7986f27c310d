//! Branch-and-bound search over feature-to-cluster assignments.
//!
//! Depth `d` of the search tree decides the cluster of the `d`-th selected
//! feature. Children are the compatible, unused clusters within the geometric
//! cutoff, nearest first, followed by a child that leaves the feature unmapped.
//! A branch is abandoned once its optimistic bound cannot beat the incumbent.

use super::assignment::{Assignment, ClusterUsage};
use super::scoring::ConformerScorer;
use super::selector::select_features;
use crate::ligand::LigandGraph;
use crate::pharmacophore::PharmacophoreModel;
use crate::settings::Settings;
use std::time::Instant;

/// Best assignment found for one protein.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub assignment: Assignment,
    pub score: f64,
    /// Search nodes expanded
    pub expansions: usize,
    /// The node cap or deadline stopped the search before the tree was exhausted
    pub truncated: bool,
}

impl SearchOutcome {
    pub(crate) fn empty() -> Self {
        Self {
            assignment: Assignment::new(),
            score: 0.0,
            expansions: 0,
            truncated: false,
        }
    }
}

struct Candidate {
    cluster: usize,
    /// Pair contribution per conformer
    row: Vec<f64>,
}

struct Level {
    feature: usize,
    candidates: Vec<Candidate>,
    /// Largest reduced contribution any candidate can add
    ceiling: f64,
}

struct SearchState {
    /// Per-conformer partial sums, one row of `n_conformers` values per depth
    rows: Vec<f64>,
    n_conformers: usize,
    used: ClusterUsage,
    current: Assignment,
    best: Assignment,
    best_score: f64,
    expansions: usize,
    truncated: bool,
    deadline: Option<Instant>,
}

impl SearchState {
    fn row(&self, depth: usize) -> &[f64] {
        &self.rows[depth * self.n_conformers..(depth + 1) * self.n_conformers]
    }

    /// Copy the partial sums of `depth` into `depth + 1`, adding `pair` if given.
    fn extend_row(&mut self, depth: usize, pair: Option<&[f64]>) {
        let n = self.n_conformers;
        let (head, tail) = self.rows.split_at_mut((depth + 1) * n);
        let child = &mut tail[..n];
        child.copy_from_slice(&head[depth * n..]);
        if let Some(pair) = pair {
            child.iter_mut().zip(pair).for_each(|(c, v)| *c += v);
        }
    }

    fn out_of_budget(&self, node_cap: usize) -> bool {
        self.expansions >= node_cap || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

pub struct AssignmentSearch<'a> {
    graph: &'a LigandGraph,
    model: &'a PharmacophoreModel,
    scorer: ConformerScorer<'a>,
    levels: Vec<Level>,
    /// `remaining[d]` is the sum of ceilings of levels `d..`
    remaining: Vec<f64>,
    node_cap: usize,
    settings: &'a Settings,
}

impl<'a> AssignmentSearch<'a> {
    /// Prepare the search: select features and precompute each candidate pair's
    /// per-conformer contributions.
    pub fn new(
        graph: &'a LigandGraph,
        model: &'a PharmacophoreModel,
        settings: &'a Settings,
    ) -> Self {
        let scorer = ConformerScorer::new(settings);
        let levels: Vec<Level> =
            select_features(graph, &settings.weights, settings.max_selected_features)
                .into_iter()
                .map(|feature| {
                    let node = graph.feature(feature);
                    let candidates: Vec<Candidate> = model
                        .clusters_within(
                            node.feature_type,
                            &node.centroid(),
                            settings.geometric_cutoff,
                        )
                        .into_iter()
                        .map(|(cluster, _)| Candidate {
                            cluster,
                            row: scorer.pair_row(graph, model, feature, cluster),
                        })
                        // A pair that never scores is dominated by leaving the feature unmapped
                        .filter(|c| c.row.iter().any(|&v| v > 0.0))
                        .collect();
                    let ceiling = candidates
                        .iter()
                        .map(|c| scorer.reduce(&c.row))
                        .fold(0.0, f64::max);
                    Level {
                        feature,
                        candidates,
                        ceiling,
                    }
                })
                .collect();

        let mut remaining = vec![0.0; levels.len() + 1];
        for d in (0..levels.len()).rev() {
            remaining[d] = remaining[d + 1] + levels[d].ceiling;
        }

        Self {
            graph,
            model,
            scorer,
            levels,
            remaining,
            node_cap: settings.node_expansion_cap,
            settings,
        }
    }

    /// Number of features taking part in the search.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Run the search. Never fails: on budget exhaustion the best assignment
    /// found so far is returned with `truncated` set.
    pub fn run(&self) -> SearchOutcome {
        let n = self.graph.n_conformers();
        let mut state = SearchState {
            rows: vec![0.0; (self.levels.len() + 1) * n],
            n_conformers: n,
            used: ClusterUsage::new(self.model.cluster_count()),
            current: Assignment::new(),
            best: Assignment::new(),
            best_score: 0.0,
            expansions: 0,
            truncated: false,
            deadline: self.settings.time_limit.map(|limit| Instant::now() + limit),
        };

        let (greedy, greedy_score) = self.greedy();
        if greedy_score > state.best_score {
            state.best = greedy;
            state.best_score = greedy_score;
        }

        self.descend(&mut state, 0);

        let score = self.scorer.score(&state.best, self.graph, self.model);
        SearchOutcome {
            assignment: state.best,
            score,
            expansions: state.expansions,
            truncated: state.truncated,
        }
    }

    /// Nearest free cluster for every level, used as the first incumbent.
    fn greedy(&self) -> (Assignment, f64) {
        let mut used = ClusterUsage::new(self.model.cluster_count());
        let mut assignment = Assignment::new();
        for level in &self.levels {
            if let Some(c) = level.candidates.iter().find(|c| !used.contains(c.cluster)) {
                used.insert(c.cluster);
                assignment.push(level.feature, c.cluster);
            }
        }
        let score = self.scorer.score(&assignment, self.graph, self.model);
        (assignment, score)
    }

    fn descend(&self, state: &mut SearchState, depth: usize) {
        if state.truncated {
            return;
        }
        if state.out_of_budget(self.node_cap) {
            state.truncated = true;
            return;
        }
        state.expansions += 1;

        let partial = self.scorer.reduce(state.row(depth));
        if depth == self.levels.len() {
            // Strict improvement keeps the first of equally scored assignments
            if partial > state.best_score {
                state.best_score = partial;
                state.best = state.current.clone();
            }
            return;
        }
        if partial + self.remaining[depth] <= state.best_score {
            return;
        }

        let level = &self.levels[depth];
        for candidate in &level.candidates {
            if state.used.contains(candidate.cluster) {
                continue;
            }
            state.used.insert(candidate.cluster);
            state.current.push(level.feature, candidate.cluster);
            state.extend_row(depth, Some(&candidate.row));

            self.descend(state, depth + 1);

            state.current.pop();
            state.used.remove(candidate.cluster);
            if state.truncated {
                return;
            }
        }

        state.extend_row(depth, None);
        self.descend(state, depth + 1);
    }
}
