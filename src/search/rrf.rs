//! Reciprocal Rank Fusion (RRF) algorithm.
//!
//! Combines multiple ranked lists into a single fused ranking.
//! Based on: Cormack, Clarke, Buettcher (2009) - "Reciprocal Rank Fusion
//! outperforms Condorcet and individual Rank Learning Methods"

use std::collections::HashMap;

/// Configuration for RRF algorithm.
#[derive(Debug, Clone, Copy)]
pub struct RrfConfig {
    /// The k parameter controls how much weight is given to lower-ranked items.
    /// Higher k values give more weight to items ranked lower in the lists.
    /// Default is 60, which is the value recommended in the original paper.
    pub k: u32,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self { k: 60 }
    }
}

impl RrfConfig {
    /// Creates a new RRF config with the specified k value.
    #[must_use]
    pub const fn new(k: u32) -> Self {
        Self { k }
    }
}

/// Performs Reciprocal Rank Fusion on multiple ranked lists of chunk ids.
///
/// The RRF score for each item is calculated as:
/// `score(d) = Σ 1 / (k + rank(d))`
///
/// where the sum is over all ranked lists that contain item d, and `rank`
/// is 1-indexed.
///
/// # Arguments
///
/// * `ranked_lists` - Slice of ranked lists, where each list contains chunk
///   ids ordered by relevance (most relevant first).
/// * `config` - RRF configuration (k parameter).
///
/// # Returns
///
/// A vector of (`chunk_id`, `rrf_score`) tuples, sorted by score descending.
///
/// # Examples
///
/// ```
/// use ragcore::search::{reciprocal_rank_fusion, RrfConfig};
///
/// let list1 = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let list2 = vec!["c".to_string(), "a".to_string(), "b".to_string()];
///
/// let config = RrfConfig::new(60);
/// let fused = reciprocal_rank_fusion(&[&list1, &list2], &config);
///
/// assert!(!fused.is_empty());
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn reciprocal_rank_fusion(ranked_lists: &[&[String]], config: &RrfConfig) -> Vec<(String, f64)> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    let mut order: HashMap<&str, usize> = HashMap::new();

    for list in ranked_lists {
        for (rank, item_id) in list.iter().enumerate() {
            let rrf_score = 1.0 / f64::from(config.k + (rank as u32) + 1);
            let next_index = order.len();
            order.entry(item_id.as_str()).or_insert(next_index);
            *scores.entry(item_id.as_str()).or_insert(0.0) += rrf_score;
        }
    }

    let mut results: Vec<(String, f64)> = scores
        .into_iter()
        .map(|(id, score)| (id.to_string(), score))
        .collect();
    results.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| order[a.0.as_str()].cmp(&order[b.0.as_str()]))
    });

    results
}

/// Performs weighted RRF where each list has a weight.
///
/// Useful when one retrieval method should be given more importance than
/// another.
///
/// # Returns
///
/// A vector of (`chunk_id`, `weighted_rrf_score`) tuples, sorted by score descending.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn weighted_rrf(ranked_lists: &[(&[String], f64)], config: &RrfConfig) -> Vec<(String, f64)> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    let mut order: HashMap<&str, usize> = HashMap::new();

    for (list, weight) in ranked_lists {
        for (rank, item_id) in list.iter().enumerate() {
            let rrf_score = weight / f64::from(config.k + (rank as u32) + 1);
            let next_index = order.len();
            order.entry(item_id.as_str()).or_insert(next_index);
            *scores.entry(item_id.as_str()).or_insert(0.0) += rrf_score;
        }
    }

    let mut results: Vec<(String, f64)> = scores
        .into_iter()
        .map(|(id, score)| (id.to_string(), score))
        .collect();
    results.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| order[a.0.as_str()].cmp(&order[b.0.as_str()]))
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_rrf_single_list() {
        let list = ids(&["1", "2", "3"]);
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list], &config);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "1");
        assert!(results[0].1 > results[1].1);
        assert!(results[1].1 > results[2].1);
    }

    #[test]
    fn test_rrf_multiple_lists() {
        let list1 = ids(&["1", "2", "3"]);
        let list2 = ids(&["3", "2", "1"]);
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list1, &list2], &config);

        assert_eq!(results.len(), 3);
        let present: std::collections::HashSet<&str> =
            results.iter().map(|(id, _)| id.as_str()).collect();
        assert!(present.contains("1"));
        assert!(present.contains("2"));
        assert!(present.contains("3"));
    }

    #[test]
    fn test_rrf_disjoint_lists() {
        let list1 = ids(&["1", "2"]);
        let list2 = ids(&["3", "4"]);
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list1, &list2], &config);

        assert_eq!(results.len(), 4);
        let score1 = results.iter().find(|(id, _)| id == "1").unwrap().1;
        let score3 = results.iter().find(|(id, _)| id == "3").unwrap().1;
        assert!((score1 - score3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rrf_empty_lists() {
        let list1: Vec<String> = vec![];
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list1], &config);
        assert!(results.is_empty());
    }

    #[test]
    fn test_rrf_k_parameter() {
        let list = ids(&["1", "2"]);
        let config_low_k = RrfConfig::new(1);
        let config_high_k = RrfConfig::new(100);

        let results_low = reciprocal_rank_fusion(&[&list], &config_low_k);
        let results_high = reciprocal_rank_fusion(&[&list], &config_high_k);

        let diff_low = results_low[0].1 - results_low[1].1;
        let diff_high = results_high[0].1 - results_high[1].1;

        assert!(diff_low > diff_high);
    }

    #[test]
    fn test_weighted_rrf() {
        let list1 = ids(&["1", "2"]);
        let list2 = ids(&["2", "1"]);
        let config = RrfConfig::new(60);

        let results = weighted_rrf(&[(&list1, 2.0), (&list2, 1.0)], &config);

        assert_eq!(results[0].0, "1");
    }

    #[test]
    fn test_rrf_score_formula() {
        let list = ids(&["1"]);
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list], &config);

        let expected = 1.0 / 61.0;
        assert!((results[0].1 - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rrf_combined_score() {
        let list1 = ids(&["1"]);
        let list2 = ids(&["1"]);
        let config = RrfConfig::new(60);

        let results = reciprocal_rank_fusion(&[&list1, &list2], &config);

        let expected = 2.0 / 61.0;
        assert!((results[0].1 - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn tied_scores_break_ties_by_first_seen_insertion_order() {
        let list_a = ids(&["x", "y"]);
        let list_b = ids(&["y", "x"]);
        let config = RrfConfig::new(60);

        for _ in 0..20 {
            let results = reciprocal_rank_fusion(&[&list_a, &list_b], &config);
            assert!((results[0].1 - results[1].1).abs() < f64::EPSILON);
            assert_eq!(results[0].0, "x");
            assert_eq!(results[1].0, "y");
        }
    }

    #[test]
    fn weighted_rrf_tied_scores_break_ties_by_first_seen_insertion_order() {
        let list_a = ids(&["x", "y"]);
        let list_b = ids(&["y", "x"]);
        let config = RrfConfig::new(60);

        for _ in 0..20 {
            let results = weighted_rrf(&[(&list_a, 1.0), (&list_b, 1.0)], &config);
            assert!((results[0].1 - results[1].1).abs() < f64::EPSILON);
            assert_eq!(results[0].0, "x");
            assert_eq!(results[1].0, "y");
        }
    }

    #[test]
    fn test_rrf_config_default() {
        let config = RrfConfig::default();
        assert_eq!(config.k, 60);
    }
}
