// Property tests for title deduplication
// Author: kelexine (https://github.com/kelexine)

use headline_cache::models::{Category, FeedQuery, UpstreamPayload};
use headline_cache::news::{normalize, FallbackSynthesizer, TitleRegistry};
use proptest::prelude::*;
use std::collections::HashSet;

fn title() -> impl Strategy<Value = String> {
    // Few distinct words so collisions, case and padding variants are common
    (
        prop::sample::select(vec!["Copa", "copa", "Mercado", "Chuva", "Eleição"]),
        prop::sample::select(vec!["", " ", "  "]),
        prop::sample::select(vec!["hoje", "HOJE", "amanhã"]),
    )
        .prop_map(|(a, pad, b)| format!("{pad}{a} {b}{pad}"))
}

proptest! {
    #[test]
    fn filter_new_never_repeats_across_batches(
        batches in prop::collection::vec(prop::collection::vec(title(), 0..12), 1..6)
    ) {
        let registry = TitleRegistry::new();
        let mut seen = HashSet::new();

        for batch in batches {
            let kept = registry.filter_new(batch, |t| t.as_str());
            for t in kept {
                prop_assert!(seen.insert(normalize(&t)), "{t:?} surfaced twice");
            }
        }
        prop_assert_eq!(registry.len(), seen.len());
    }

    #[test]
    fn filter_new_keeps_first_occurrence_order(batch in prop::collection::vec(title(), 0..20)) {
        let registry = TitleRegistry::new();
        let kept = registry.filter_new(batch.clone(), |t| t.as_str());

        let mut seen = HashSet::new();
        let expected: Vec<String> = batch
            .into_iter()
            .filter(|t| seen.insert(normalize(t)))
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn synthetic_batches_avoid_used_titles(
        used in prop::collection::vec(title(), 0..10),
        calls in 1usize..6,
        category in prop::sample::select(Category::ALL.to_vec()),
    ) {
        let registry = TitleRegistry::new();
        for t in &used {
            registry.admit(t);
        }
        let synthesizer = FallbackSynthesizer::new(10);

        for _ in 0..calls {
            let batch = synthesizer.synthesize(category, Some("copa"), &registry);
            prop_assert!(!batch.is_empty());
            for article in batch {
                prop_assert!(registry.admit(&article.title), "reused {:?}", article.title);
            }
        }
    }
}

#[test]
fn test_cache_key_stable_for_equal_queries() {
    let a = FeedQuery::search("copa", "BUSCA").with_max(10);
    let b = FeedQuery::search("copa", "OUTRO").with_max(10);
    assert_eq!(a.cache_key(), b.cache_key());
}

#[test]
fn test_payload_drops_untitled_articles() {
    let payload = UpstreamPayload::from_body(r#"{"articles": [{"title": ""}, {"title": "X"}]}"#).unwrap();
    assert_eq!(payload.articles.len(), 1);
}
