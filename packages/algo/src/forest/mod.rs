//! Bagged Regression Trees
//!
//! A random-forest style regressor built from shallow CART trees.
//!
//! Core principles:
//! - Each tree is fitted on a bootstrap resample of the training rows
//! - Splits minimize the summed squared error of the two children
//! - The ensemble prediction is the mean of the per-tree predictions
//!
//! Trees are trained in parallel; every tree draws from its own ChaCha
//! stream derived from the ensemble seed, so fitting is reproducible
//! regardless of thread scheduling.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitize::has_invalid_values;

// ==================== Constants ====================

/// Minimum error reduction for a split to be accepted
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

// ==================== Configuration ====================

/// Ensemble hyper-parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum depth of each tree (root has depth 0)
    pub max_depth: usize,
    /// Nodes with fewer rows than this become leaves
    pub min_samples_split: usize,
    /// Seed for bootstrap resampling
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            max_depth: 5,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("feature rows ({rows}) and targets ({targets}) differ in length")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("ensemble needs at least one tree")]
    NoTrees,
}

/// A deserialized ensemble whose node graph cannot be traversed safely
#[derive(Debug, Error, PartialEq)]
pub enum StructureError {
    #[error("ensemble has no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node} points to child {child}, expected index in {node}+1..{len}")]
    BadChild {
        tree: usize,
        node: usize,
        child: usize,
        len: usize,
    },
    #[error("tree {tree} node {node} splits on feature {feature}, ensemble has {n_features}")]
    BadFeature {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },
    #[error("tree {tree} holds non-finite thresholds or leaf values")]
    NonFinite { tree: usize },
}

// ==================== Tree ====================

/// Flat tree node; children are indices into the owning tree's node list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Fit a tree on the rows selected by `indices`
    fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &mut [usize], config: &ForestConfig) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(rows, targets, indices, 0, config);
        tree
    }

    fn grow(
        &mut self,
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: &mut [usize],
        depth: usize,
        config: &ForestConfig,
    ) -> usize {
        let node_id = self.nodes.len();
        let mean = mean_of(targets, indices);
        self.nodes.push(TreeNode::Leaf { value: mean });

        if depth >= config.max_depth || indices.len() < config.min_samples_split.max(2) {
            return node_id;
        }

        let Some(split) = best_split(rows, targets, indices) else {
            return node_id;
        };

        // Partition rows in place: left side gets feature <= threshold
        let mut boundary = 0;
        for i in 0..indices.len() {
            if rows[indices[i]][split.feature] <= split.threshold {
                indices.swap(i, boundary);
                boundary += 1;
            }
        }
        if boundary == 0 || boundary == indices.len() {
            return node_id;
        }

        let (left_rows, right_rows) = indices.split_at_mut(boundary);
        let left = self.grow(rows, targets, left_rows, depth + 1, config);
        let right = self.grow(rows, targets, right_rows, depth + 1, config);

        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every child index points strictly forward and in bounds, which makes
    /// traversal from the root terminate.
    fn check_structure(&self, tree: usize, n_features: usize) -> Result<(), StructureError> {
        let len = self.nodes.len();
        if len == 0 {
            return Err(StructureError::EmptyTree { tree });
        }

        let mut values = Vec::with_capacity(len);
        for (node, entry) in self.nodes.iter().enumerate() {
            match entry {
                TreeNode::Leaf { value } => values.push(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(StructureError::BadFeature {
                            tree,
                            node,
                            feature: *feature,
                            n_features,
                        });
                    }
                    for &child in [left, right] {
                        if child <= node || child >= len {
                            return Err(StructureError::BadChild {
                                tree,
                                node,
                                child,
                                len,
                            });
                        }
                    }
                    values.push(*threshold);
                }
            }
        }

        if has_invalid_values(&values) {
            return Err(StructureError::NonFinite { tree });
        }
        Ok(())
    }
}

struct Split {
    feature: usize,
    threshold: f64,
}

/// Exhaustive search over every feature using sorted prefix sums
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<Split> {
    let n = indices.len();
    let n_features = rows[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best: Option<(f64, Split)> = None;
    let mut order: Vec<usize> = indices.to_vec();

    for feature in 0..n_features {
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for pos in 1..n {
            let y = targets[order[pos - 1]];
            left_sum += y;
            left_sq += y * y;

            let prev = rows[order[pos - 1]][feature];
            let next = rows[order[pos]][feature];
            if prev >= next {
                continue;
            }

            let left_n = pos as f64;
            let right_n = (n - pos) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().map_or(true, |(best_sse, _)| sse < *best_sse) {
                best = Some((
                    sse,
                    Split {
                        feature,
                        threshold: (prev + next) / 2.0,
                    },
                ));
            }
        }
    }

    best.filter(|(sse, _)| parent_sse - sse > MIN_IMPURITY_DECREASE)
        .map(|(_, split)| split)
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

// ==================== Ensemble ====================

/// Bootstrap-aggregated regression trees
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: ForestConfig) -> Result<Self, FitError> {
        if rows.is_empty() {
            return Err(FitError::EmptyTrainingSet);
        }
        if rows.len() != targets.len() {
            return Err(FitError::LengthMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        if config.n_trees == 0 {
            return Err(FitError::NoTrees);
        }

        let n_features = rows[0].len();
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n_features)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(FitError::RaggedRow {
                row,
                found,
                expected: n_features,
            });
        }

        let n = rows.len();
        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
                rng.set_stream(tree_idx as u64);
                let mut sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, &mut sample, &config)
            })
            .collect();

        Ok(Self {
            config,
            n_features,
            trees,
        })
    }

    /// Mean of the per-tree predictions
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        total / self.trees.len() as f64
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Verify a loaded ensemble before it serves predictions
    pub fn check_structure(&self) -> Result<(), StructureError> {
        if self.trees.is_empty() {
            return Err(StructureError::NoTrees);
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(idx, tree)| tree.check_structure(idx, self.n_features))
    }
}
