// Property tests for weight renormalization and selection

use proptest::prelude::*;
use subreddit_gallery::{choose_category, choose_image, CategoryRegistry, ReplaySource};

const TOLERANCE: f64 = 1e-9;

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..40)
}

proptest! {
    #[test]
    fn adds_keep_total_at_one(names in names()) {
        let mut registry = CategoryRegistry::new();

        for name in &names {
            registry.add_category(name.as_str());

            prop_assert!((registry.total_weight() - 1.0).abs() < TOLERANCE);
            let expected = 1.0 / registry.count() as f64;
            prop_assert!((registry.weight(name).unwrap() - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn removal_changes_count_only_when_present(
        names in names(),
        target in "[a-z]{1,8}",
    ) {
        let mut registry = CategoryRegistry::with_categories(names.iter().map(String::as_str));
        let before = registry.count();
        let present = registry.contains(&target);

        registry.remove_category(&target);

        if present {
            prop_assert_eq!(registry.count(), before - 1);
            prop_assert!(!registry.contains(&target));
        } else {
            prop_assert_eq!(registry.count(), before);
        }
    }

    #[test]
    fn removal_keeps_total_at_one(names in names(), pick in any::<prop::sample::Index>()) {
        let mut registry = CategoryRegistry::with_categories(names.iter().map(String::as_str));
        let existing = registry.names();
        let target = pick.get(&existing).clone();

        registry.remove_category(&target);

        if registry.is_empty() {
            prop_assert_eq!(registry.total_weight(), 0.0);
        } else {
            prop_assert!((registry.total_weight() - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn weights_never_negative(
        names in names(),
        pins in prop::collection::vec((any::<prop::sample::Index>(), -1.0f64..2.0), 0..20),
    ) {
        let mut registry = CategoryRegistry::with_categories(names.iter().map(String::as_str));
        let existing = registry.names();

        for (index, weight) in pins {
            registry.normalize_weight_around(index.get(&existing).as_str(), weight);
        }

        prop_assert!(registry.iter().all(|c| c.weight >= 0.0));
    }

    #[test]
    fn selection_is_a_member(names in names(), draw in 0.0f64..1.0) {
        let mut registry = CategoryRegistry::with_categories(names.iter().map(String::as_str));
        let mut draws = ReplaySource::new(vec![draw]);

        if let Some(name) = choose_category(&registry, &mut draws) {
            prop_assert!(registry.contains(name));
        }

        let first = registry.names()[0].clone();
        registry.set_images(&first, vec!["a".into(), "b".into(), "c".into()]);
        let url = choose_image(&registry, &first, &mut draws).unwrap();
        prop_assert!(["a", "b", "c"].contains(&url));
    }
}
