//! Keyword-overlap similarity between articles.
//!
//! Candidates are scored by how many normalized keywords they share with
//! the target, with citation count as the tie-breaker. When fewer than
//! `limit` candidates share anything, the result is padded with randomly
//! drawn articles that were not already selected. Padding makes the output
//! non-deterministic unless the caller supplies a seeded random source.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::RankError;
use crate::keywords::normalize;
use crate::models::{ArticleRecord, SimilarityScore};

/// Score one candidate against the target's keyword set.
pub fn score(target_keywords: &BTreeSet<String>, candidate: &ArticleRecord) -> SimilarityScore {
    let candidate_keywords = normalize(candidate.keywords.as_deref());
    SimilarityScore {
        shared_keyword_count: target_keywords.intersection(&candidate_keywords).count(),
        citation_count: candidate.citations(),
    }
}

/// Articles most similar to `target_id`, at most `limit` of them.
///
/// The target itself is never returned. Fails with
/// [`RankError::NotFound`] when no article has `target_id`.
pub fn similar<R: Rng + ?Sized>(
    target_id: i64,
    corpus: &[ArticleRecord],
    limit: usize,
    rng: &mut R,
) -> Result<Vec<ArticleRecord>, RankError> {
    let target = corpus
        .iter()
        .find(|a| a.id == target_id)
        .ok_or(RankError::NotFound(target_id))?;
    let target_keywords = normalize(target.keywords.as_deref());

    let mut ranked: Vec<(SimilarityScore, &ArticleRecord)> = Vec::new();
    let mut rest: Vec<&ArticleRecord> = Vec::new();
    for candidate in corpus.iter().filter(|a| a.id != target_id) {
        let s = score(&target_keywords, candidate);
        if s.shared_keyword_count > 0 {
            ranked.push((s, candidate));
        } else {
            rest.push(candidate);
        }
    }

    // Stable: equal scores keep corpus order.
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out: Vec<ArticleRecord> = ranked
        .into_iter()
        .take(limit)
        .map(|(_, a)| a.clone())
        .collect();

    if out.len() < limit {
        let needed = limit - out.len();
        rest.shuffle(rng);
        debug!(
            target_id,
            ranked = out.len(),
            filler = needed.min(rest.len()),
            "padding similar articles with random filler"
        );
        out.extend(rest.into_iter().take(needed).cloned());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn art(id: i64, kw: Option<&str>, citations: i64) -> ArticleRecord {
        let mut a = ArticleRecord::new(id, format!("article {}", id));
        a.keywords = kw.map(str::to_string);
        a.citation_count = citations;
        a
    }

    fn ids(v: &[ArticleRecord]) -> Vec<i64> {
        v.iter().map(|a| a.id).collect()
    }

    #[test]
    fn ranked_then_filler() {
        let corpus = vec![
            art(1, Some("Mars"), 0),
            art(2, Some("mars, dust"), 3),
            art(3, Some("MARS"), 5),
            art(4, Some("ocean"), 100),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let out = similar(1, &corpus, 3, &mut rng).unwrap();
        assert_eq!(ids(&out), vec![3, 2, 4]);
    }

    #[test]
    fn shared_count_outranks_citations() {
        let corpus = vec![
            art(1, Some("a, b, c"), 0),
            art(2, Some("a"), 500),
            art(3, Some("a; b"), 1),
            art(4, Some("a, b, c"), 0),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let out = similar(1, &corpus, 3, &mut rng).unwrap();
        assert_eq!(ids(&out), vec![4, 3, 2]);
    }

    #[test]
    fn truncates_to_limit() {
        let corpus = vec![
            art(1, Some("x"), 0),
            art(2, Some("x"), 1),
            art(3, Some("x"), 2),
            art(4, Some("x"), 3),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let out = similar(1, &corpus, 2, &mut rng).unwrap();
        assert_eq!(ids(&out), vec![4, 3]);
    }

    #[test]
    fn target_without_keywords_gets_only_filler() {
        let corpus = vec![
            art(1, None, 0),
            art(2, Some("x"), 1),
            art(3, Some("y"), 2),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let out = similar(1, &corpus, 5, &mut rng).unwrap();
        let mut got = ids(&out);
        got.sort();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn filler_is_reproducible_with_same_seed() {
        let corpus: Vec<ArticleRecord> = (1..=20).map(|i| art(i, Some("z"), 0)).collect();
        let mut target = corpus.clone();
        target[0].keywords = Some("unique".into());
        let a = similar(1, &target, 5, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = similar(1, &target, 5, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn never_returns_target_or_duplicates() {
        let corpus: Vec<ArticleRecord> = (1..=8)
            .map(|i| art(i, Some(if i % 2 == 0 { "even" } else { "odd" }), i))
            .collect();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = similar(2, &corpus, 7, &mut rng).unwrap();
            assert_eq!(out.len(), 7);
            assert!(out.iter().all(|a| a.id != 2));
            let mut got = ids(&out);
            got.sort();
            got.dedup();
            assert_eq!(got.len(), 7);
        }
    }

    #[test]
    fn unknown_target_is_not_found() {
        let corpus = vec![art(1, Some("x"), 0)];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            similar(42, &corpus, 3, &mut rng).unwrap_err(),
            RankError::NotFound(42)
        );
    }
}
