//! Action dispatch.
//!
//! Instances browsing a precomputed list move through it; every other
//! instance has its URL rewritten in place.

use tracing::trace;

use crate::errors::MutationError;
use crate::instance::{Action, Instance};
use crate::mutator::{Mutation, UrlMutator};
use crate::sequence;

/// Performs `action` on the instance.
pub fn perform(action: Action, instance: &mut Instance) -> Result<Mutation, MutationError> {
    if instance.uses_url_list() {
        trace!(index = ?instance.urls_current_index, "Dispatching to URL list");
        sequence::step(action, instance)
    } else {
        UrlMutator::apply(action, instance)
    }
}
