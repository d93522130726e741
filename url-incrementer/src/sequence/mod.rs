//! Precomputed URL lists.
//!
//! [`precompute`] builds the list an instance browses in custom list,
//! toolkit, auto and shuffle modes. It works on a copy, so the caller's
//! instance keeps its position. [`step`] then moves through the list.

mod shuffle;

pub use shuffle::shuffle;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::MutationError;
use crate::instance::{Action, Instance, ToolkitTool, UrlEntry};
use crate::mutator::{Mutation, UrlMutator};
use crate::transform::{parse_numeric, Direction, TransformParams, MAX_SAFE_INTEGER};

/// A precomputed list and its starting cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Precomputed {
    /// The URLs in browsing order.
    pub urls: Vec<UrlEntry>,
    /// Starting position; `None` is before the first entry.
    pub current_index: Option<usize>,
}

impl Precomputed {
    /// Stores the list and cursor on the instance.
    pub fn install(self, instance: &mut Instance) {
        instance.urls = self.urls;
        instance.urls_current_index = self.current_index;
    }
}

/// Whether a numeric selection has reached either bound.
fn at_numeric_bound(selection: &str, params: &TransformParams) -> bool {
    params
        .base
        .radix()
        .and_then(|radix| parse_numeric(selection, radix).ok())
        .is_some_and(|value| value == 0 || value >= MAX_SAFE_INTEGER)
}

/// Whether any selection a whole-URL step touches has reached a bound.
///
/// In multi mode that is every active part, each read with its own params.
fn stepped_parts_at_bound(instance: &Instance) -> bool {
    if instance.multi_enabled {
        instance
            .multi
            .range(1..=instance.multi_count)
            .any(|(_, part)| at_numeric_bound(&part.selection, &part.params))
    } else {
        at_numeric_bound(&instance.selection, &instance.params)
    }
}

/// Steps a copy of the instance `limit` times, recording each URL.
fn build_urls<R: Rng + ?Sized>(
    instance: &Instance,
    direction: Direction,
    limit: usize,
    rng: &mut R,
) -> Vec<UrlEntry> {
    let mut work = instance.clone();
    let mut limit = limit;
    let mut urls = Vec::new();

    if work.toolkit_enabled && work.toolkit_tool == ToolkitTool::GenerateLinks && limit > 0 {
        urls.push(UrlEntry::new(&work.url, &work.selection));
        limit -= 1;
    }

    for _ in 0..limit {
        match UrlMutator::apply(Action::new(direction, None), &mut work) {
            Ok(mutation) => urls.push(UrlEntry::new(mutation.url, mutation.selection)),
            Err(error) => {
                debug!(%direction, %error, built = urls.len(), "Stopped building URLs");
                break;
            }
        }
        if stepped_parts_at_bound(&work) {
            break;
        }
    }

    if work.shuffle_urls {
        shuffle(&mut urls, rng);
    }
    urls
}

fn build_custom_urls<R: Rng + ?Sized>(instance: &Instance, rng: &mut R) -> Vec<UrlEntry> {
    let mut urls: Vec<UrlEntry> = if instance.auto_repeat_count > 0 && !instance.urls.is_empty() {
        instance.urls.clone()
    } else {
        instance
            .custom_url_list
            .iter()
            .map(UrlEntry::literal)
            .collect()
    };
    if instance.shuffle_urls {
        shuffle(&mut urls, rng);
    }
    urls
}

/// Precomputes the instance's URL list using the thread-local RNG.
#[must_use]
pub fn precompute(instance: &Instance) -> Precomputed {
    precompute_with_rng(instance, &mut rand::thread_rng())
}

/// Precomputes the instance's URL list.
///
/// Custom lists take precedence, then toolkit generation, then auto mode,
/// then shuffle mode. Instances with none of these modes get an empty list.
pub fn precompute_with_rng<R: Rng + ?Sized>(instance: &Instance, rng: &mut R) -> Precomputed {
    let precomputed = if instance.custom_urls {
        Precomputed {
            urls: build_custom_urls(instance, rng),
            current_index: None,
        }
    } else if instance.toolkit_enabled {
        Precomputed {
            urls: build_urls(
                instance,
                instance.toolkit_action,
                instance.toolkit_quantity as usize,
                rng,
            ),
            current_index: None,
        }
    } else if instance.shuffle_urls && instance.auto_enabled {
        Precomputed {
            urls: build_urls(instance, instance.auto_action, instance.auto_times as usize, rng),
            current_index: None,
        }
    } else if instance.shuffle_urls {
        let half = instance.shuffle_limit.div_ceil(2);
        let mut work = instance.clone();
        work.shuffle_urls = false;
        let decrements = build_urls(&work, Direction::Decrement, half, rng);
        let increments = build_urls(&work, Direction::Increment, half, rng);

        let current_index = decrements.len();
        let mut urls = Vec::with_capacity(decrements.len() + 1 + increments.len());
        urls.extend(decrements);
        urls.push(UrlEntry::new(&instance.url, &instance.selection));
        urls.extend(increments);
        shuffle(&mut urls, rng);

        Precomputed {
            urls,
            current_index: Some(current_index),
        }
    } else {
        Precomputed::default()
    };

    debug!(
        urls = precomputed.urls.len(),
        current_index = ?precomputed.current_index,
        "Precomputed URLs"
    );
    precomputed
}

/// Moves through the instance's precomputed list.
///
/// The cursor moves forward when auto mode is off and the action is an
/// increment, or when the action matches the auto action; otherwise it moves
/// backward. It is clamped to the list and never wraps.
pub fn step(action: Action, instance: &mut Instance) -> Result<Mutation, MutationError> {
    let len = instance.urls.len();
    if len == 0 {
        return Err(MutationError::EmptyUrlList);
    }

    let direction = action.direction();
    let forward = (!instance.auto_enabled && direction == Direction::Increment)
        || direction == instance.auto_action;
    let index = match (forward, instance.urls_current_index) {
        (true, None) => 0,
        (true, Some(i)) => (i + 1).min(len - 1),
        (false, None) => 0,
        (false, Some(i)) => i.saturating_sub(1).min(len - 1),
    };
    instance.urls_current_index = Some(index);

    let entry = instance.urls[index].clone();
    let keeps_start = !entry.selection.is_empty()
        && instance.selection_start.is_some_and(|start| {
            entry.url.get(start..start + entry.selection.len()) == Some(entry.selection.as_str())
        });
    if !keeps_start {
        instance.selection_start = None;
    }
    instance.url.clone_from(&entry.url);
    instance.selection.clone_from(&entry.selection);

    debug!(index, len, url = %entry.url, "Stepped through URL list");
    Ok(Mutation {
        url: entry.url,
        selection: entry.selection,
    })
}
