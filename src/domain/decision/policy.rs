//! Reuse candidate selection

use std::collections::BTreeSet;

use super::ReuseCandidate;
use crate::domain::image::ImageIdentity;
use crate::domain::similarity::SimilarityMatrix;

/// Picks the best cached substitute for `requested`
///
/// Candidates are the cached images of another article whose pair with
/// `requested` is defined in the matrix and scores at least `threshold`.
/// Undefined pairs never qualify. The highest score wins; ties go to the
/// smallest identity.
pub fn select_reuse_candidate(
    matrix: &SimilarityMatrix,
    requested: &ImageIdentity,
    threshold: i32,
    cached: &BTreeSet<ImageIdentity>,
) -> Option<ReuseCandidate> {
    let mut best: Option<ReuseCandidate> = None;

    // BTreeSet iterates in ascending order, so only a strictly greater score
    // may replace the current best.
    for candidate in cached {
        if candidate.same_article(requested) {
            continue;
        }

        if !matrix.is_defined(requested, candidate) {
            continue;
        }

        let score = matrix.score(requested, candidate);
        if i32::from(score) < threshold {
            continue;
        }

        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(ReuseCandidate {
                id: candidate.clone(),
                score,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::CategoryKey;

    fn id(s: &str) -> ImageIdentity {
        ImageIdentity::new(s).unwrap()
    }

    fn cached(ids: &[&str]) -> BTreeSet<ImageIdentity> {
        ids.iter().map(|s| id(s)).collect()
    }

    fn example_matrix() -> SimilarityMatrix {
        SimilarityMatrix::builder(CategoryKey::new("shop", "shoes"))
            .with_score(id("1_1"), id("1_2"), 1)
            .unwrap()
            .with_score(id("1_1"), id("2_1"), 3)
            .unwrap()
            .with_score(id("1_2"), id("2_1"), 2)
            .unwrap()
            .build()
    }

    #[test]
    fn test_reuse_at_threshold() {
        let matrix = example_matrix();
        let result = select_reuse_candidate(&matrix, &id("2_1"), 3, &cached(&["1_1"]));
        assert_eq!(
            result,
            Some(ReuseCandidate {
                id: id("1_1"),
                score: 3
            })
        );
    }

    #[test]
    fn test_no_candidate_above_threshold() {
        let matrix = example_matrix();
        assert_eq!(
            select_reuse_candidate(&matrix, &id("2_1"), 4, &cached(&["1_1"])),
            None
        );
    }

    #[test]
    fn test_empty_cache_yields_none() {
        let matrix = example_matrix();
        assert_eq!(
            select_reuse_candidate(&matrix, &id("2_1"), 0, &BTreeSet::new()),
            None
        );
    }

    #[test]
    fn test_highest_score_wins() {
        let matrix = example_matrix();
        let result = select_reuse_candidate(&matrix, &id("2_1"), 1, &cached(&["1_1", "1_2"]));
        assert_eq!(result.map(|c| c.id), Some(id("1_1")));
    }

    #[test]
    fn test_ties_break_to_smallest_identity() {
        let matrix = SimilarityMatrix::builder(CategoryKey::new("shop", "hats"))
            .with_score(id("5_1"), id("9_1"), 3)
            .unwrap()
            .with_score(id("5_1"), id("3_1"), 3)
            .unwrap()
            .with_score(id("5_1"), id("7_1"), 3)
            .unwrap()
            .build();

        let result = select_reuse_candidate(&matrix, &id("5_1"), 2, &cached(&["9_1", "7_1", "3_1"]));
        assert_eq!(result.map(|c| c.id), Some(id("3_1")));
    }

    #[test]
    fn test_same_article_is_never_a_candidate() {
        let matrix = example_matrix();
        let result = select_reuse_candidate(&matrix, &id("1_2"), 0, &cached(&["1_1", "1_2"]));
        assert_eq!(result, None);
    }

    #[test]
    fn test_undefined_pair_is_never_a_candidate() {
        let matrix = example_matrix();
        let result = select_reuse_candidate(&matrix, &id("2_1"), 0, &cached(&["8_1"]));
        assert_eq!(result, None);

        let empty = SimilarityMatrix::builder(CategoryKey::new("shop", "shoes")).build();
        assert_eq!(
            select_reuse_candidate(&empty, &id("2_1"), -3, &cached(&["77_1"])),
            None
        );
    }

    #[test]
    fn test_zero_threshold_accepts_defined_zero_score() {
        let matrix = SimilarityMatrix::builder(CategoryKey::new("shop", "shoes"))
            .with_score(id("2_1"), id("5_1"), 0)
            .unwrap()
            .build();

        let result = select_reuse_candidate(&matrix, &id("2_1"), 0, &cached(&["5_1", "8_1"]));
        assert_eq!(
            result,
            Some(ReuseCandidate {
                id: id("5_1"),
                score: 0
            })
        );
    }

    #[test]
    fn test_candidates_shrink_as_threshold_rises() {
        let matrix = example_matrix();
        let held = cached(&["1_1", "1_2"]);
        let mut previous_found = true;

        for threshold in 0..=5 {
            let found = select_reuse_candidate(&matrix, &id("2_1"), threshold, &held).is_some();
            assert!(previous_found || !found, "threshold {} reopened candidates", threshold);
            previous_found = found;
        }
    }
}
