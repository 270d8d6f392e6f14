//! Weighted score fusion of dense and keyword results.

use std::collections::HashMap;

use crate::traits::FaqHit;

/// Divide every score by the largest one so each source lands in `0..=1`.
///
/// Sources on different scales (cosine vs. BM25) become comparable. A list
/// whose best score is not positive is left untouched.
pub fn normalize_scores(hits: &mut [FaqHit]) {
    let max = hits.iter().map(|h| h.score).fold(f32::MIN, f32::max);
    if max > 0.0 {
        for hit in hits.iter_mut() {
            hit.score /= max;
        }
    }
}

/// Merge two ranked lists into one, scoring each record as
/// `dense_weight * dense + keyword_weight * keyword`.
///
/// A record missing from one source contributes 0 for that source. Ties are
/// broken by record ID so the order is stable.
pub fn weighted_fusion(
    dense: &[FaqHit],
    keyword: &[FaqHit],
    dense_weight: f32,
    keyword_weight: f32,
    limit: usize,
) -> Vec<FaqHit> {
    let mut dense = dense.to_vec();
    let mut keyword = keyword.to_vec();
    normalize_scores(&mut dense);
    normalize_scores(&mut keyword);

    let mut merged: HashMap<u64, FaqHit> = HashMap::new();
    for (hits, weight) in [(dense, dense_weight), (keyword, keyword_weight)] {
        for hit in hits {
            let contribution = hit.score * weight;
            merged
                .entry(hit.id)
                .and_modify(|existing| existing.score += contribution)
                .or_insert(FaqHit {
                    score: contribution,
                    ..hit
                });
        }
    }

    let mut results: Vec<FaqHit> = merged.into_values().collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: u64, score: f32) -> FaqHit {
        FaqHit {
            id,
            question: format!("q{id}"),
            answer: format!("a{id}"),
            score,
        }
    }

    #[test]
    fn normalize_divides_by_max() {
        let mut hits = vec![hit(1, 4.0), hit(2, 2.0)];
        normalize_scores(&mut hits);
        assert!((hits[0].score - 1.0).abs() < f32::EPSILON);
        assert!((hits[1].score - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn normalize_leaves_non_positive_lists() {
        let mut hits = vec![hit(1, 0.0), hit(2, -1.0)];
        normalize_scores(&mut hits);
        assert_eq!(hits[1].score, -1.0);
    }

    #[test]
    fn fusion_rewards_agreement() {
        let dense = vec![hit(1, 0.9), hit(2, 0.8)];
        let keyword = vec![hit(2, 12.0), hit(3, 6.0)];

        let fused = weighted_fusion(&dense, &keyword, 0.7, 0.3, 10);
        let ids: Vec<u64> = fused.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        // 0.7 * (0.8 / 0.9) + 0.3 * 1.0
        assert!((fused[0].score - (0.7 * 0.8 / 0.9 + 0.3)).abs() < 1e-5);
    }

    #[test]
    fn fusion_respects_limit() {
        let dense = vec![hit(1, 1.0), hit(2, 0.5), hit(3, 0.25)];
        assert_eq!(weighted_fusion(&dense, &[], 0.7, 0.3, 2).len(), 2);
    }

    #[test]
    fn ties_break_by_id() {
        let dense = vec![hit(9, 1.0), hit(4, 1.0)];
        let fused = weighted_fusion(&dense, &[], 1.0, 0.0, 10);
        assert_eq!(fused[0].id, 4);
        assert_eq!(fused[1].id, 9);
    }
}
