//! Assertions over instances and mutations.

use crate::instance::Instance;
use crate::mutator::Mutation;

/// Asserts that the selection sits at its recorded offset in the URL.
pub fn assert_selection_consistent(instance: &Instance) {
    assert!(
        instance.selection_is_valid(),
        "Selection '{}' not found at {:?} in '{}'",
        instance.selection,
        instance.selection_start,
        instance.url
    );
}

/// Asserts a mutation's URL and selection, and that the instance agrees.
pub fn assert_mutation(mutation: &Mutation, instance: &Instance, url: &str, selection: &str) {
    assert_eq!(mutation.url, url, "Unexpected mutated URL");
    assert_eq!(mutation.selection, selection, "Unexpected mutated selection");
    assert_eq!(instance.url, mutation.url, "Instance URL was not committed");
    assert_eq!(
        instance.selection, mutation.selection,
        "Instance selection was not committed"
    );
}

/// Asserts that a failed action left the instance unchanged.
pub fn assert_untouched(before: &Instance, after: &Instance) {
    assert_eq!(
        before, after,
        "Instance changed although the action failed"
    );
}
