use super::Election;
use crate::util::to_f64;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Shared support between two candidates, from the point of view of `a`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRow {
    pub candidate_a: String,
    pub name_a: String,
    pub candidate_b: String,
    pub name_b: String,
    pub common_votes: f64,
    /// Common votes as a share of everything `a` received.
    pub share_of_a: f64,
    pub share_of_b: f64,
}

impl Election {
    /// Every ordered pair of distinct candidates whose common votes exceed
    /// `threshold`, in registry order.
    pub fn overlaps(&self, threshold: f64) -> Vec<OverlapRow> {
        let candidates = self.candidates();
        let priors: Vec<Vec<f64>> = candidates.iter().map(|c| c.prior_candidates()).collect();
        let vote_counts: Vec<f64> = candidates.iter().map(|c| to_f64(c.vote_count())).collect();

        (0..candidates.len())
            .permutations(2)
            .filter_map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let common_votes = priors[a][b] + priors[b][a];
                if common_votes <= threshold {
                    return None;
                }

                Some(OverlapRow {
                    candidate_a: candidates[a].id().to_string(),
                    name_a: candidates[a].name().to_string(),
                    candidate_b: candidates[b].id().to_string(),
                    name_b: candidates[b].name().to_string(),
                    common_votes,
                    share_of_a: share(common_votes, vote_counts[a]),
                    share_of_b: share(common_votes, vote_counts[b]),
                })
            })
            .collect()
    }
}

fn share(common_votes: f64, vote_count: f64) -> f64 {
    if vote_count == 0.0 {
        0.0
    } else {
        common_votes / vote_count
    }
}
