//! Selection invariant tests: the "all standards" sentinel is present
//! exactly when every individual standard is selected.

use std::sync::Arc;

use secaudit_core::{SelectionSet, StandardCatalog, ALL_STANDARDS};

/// Deterministic sequence of catalog entries (linear congruential walk).
fn toggle_sequence(entries: &[String], len: usize, seed: u64) -> Vec<String> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            entries[((x >> 33) as usize) % entries.len()].clone()
        })
        .collect()
}

#[test]
fn test_invariant_holds_after_every_toggle() {
    let catalog = StandardCatalog::default();
    let entries: Vec<String> = catalog.entries().map(str::to_string).collect();

    for seed in 0..50 {
        let mut set = SelectionSet::new(Arc::new(catalog.clone()));
        for standard in toggle_sequence(&entries, 200, seed) {
            set.toggle(&standard);
            assert!(
                set.invariant_holds(),
                "invariant broken after toggling {standard:?} (seed {seed}): {:?}",
                set.selected()
            );
        }
    }
}

#[test]
fn test_sentinel_toggle_is_set_all_then_clear() {
    let catalog = StandardCatalog::default();
    let mut set = SelectionSet::new(Arc::new(catalog.clone()));

    set.toggle(ALL_STANDARDS);
    let expected: Vec<String> = catalog.entries().map(str::to_string).collect();
    assert_eq!(set.selected(), expected);

    set.toggle(ALL_STANDARDS);
    assert!(set.is_empty());
}

#[test]
fn test_sentinel_toggle_from_partial_selects_all() {
    let catalog = StandardCatalog::new(["GDPR", "HIPAA", "PCI DSS"]).unwrap();
    let mut set = SelectionSet::new(Arc::new(catalog));

    set.toggle("HIPAA");
    set.toggle(ALL_STANDARDS);
    assert_eq!(set.len(), 4);
    assert!(set.is_selected("GDPR"));
    assert!(set.is_selected(ALL_STANDARDS));
}

#[test]
fn test_selecting_each_individual_implies_sentinel() {
    let catalog = StandardCatalog::default();
    let mut set = SelectionSet::new(Arc::new(catalog.clone()));

    for standard in catalog.standards() {
        assert!(!set.is_selected(ALL_STANDARDS));
        set.toggle(standard);
    }
    assert!(set.is_selected(ALL_STANDARDS));

    set.toggle(&catalog.standards()[0]);
    assert!(!set.is_selected(ALL_STANDARDS));
    assert_eq!(set.len(), catalog.standards().len() - 1);
}
