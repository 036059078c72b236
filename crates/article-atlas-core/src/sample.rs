//! Random sampling of the corpus.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::ArticleRecord;

/// Shuffle a copy of `corpus` and return its first `limit` entries along
/// with the corpus size. The input slice is left untouched.
pub fn sample<R: Rng + ?Sized>(
    corpus: &[ArticleRecord],
    limit: usize,
    rng: &mut R,
) -> (Vec<ArticleRecord>, usize) {
    if corpus.is_empty() {
        return (Vec::new(), 0);
    }
    let mut shuffled = corpus.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(limit);
    (shuffled, corpus.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus(n: i64) -> Vec<ArticleRecord> {
        (1..=n).map(|i| ArticleRecord::new(i, format!("article {}", i))).collect()
    }

    #[test]
    fn returns_limit_and_total() {
        let c = corpus(10);
        let (items, total) = sample(&c, 4, &mut StdRng::seed_from_u64(5));
        assert_eq!(items.len(), 4);
        assert_eq!(total, 10);
        let mut ids: Vec<i64> = items.iter().map(|a| a.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn limit_larger_than_corpus_returns_everything() {
        let c = corpus(3);
        let (items, total) = sample(&c, 10, &mut StdRng::seed_from_u64(5));
        assert_eq!(items.len(), 3);
        assert_eq!(total, 3);
    }

    #[test]
    fn source_is_not_mutated() {
        let c = corpus(6);
        let before = c.clone();
        let _ = sample(&c, 6, &mut StdRng::seed_from_u64(11));
        assert_eq!(c, before);
    }

    #[test]
    fn empty_corpus() {
        let (items, total) = sample(&[], 5, &mut StdRng::seed_from_u64(0));
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }
}
