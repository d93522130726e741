//! Rewriting an instance's URL.
//!
//! [`UrlMutator::apply`] transforms the instance's selection (or one or all of
//! its multi parts) and splices the result back into the URL. Edits are made
//! on working copies and committed only when every step succeeded, so a
//! failed action leaves the instance exactly as it was.
//!
//! The [`error_skip`] submodule wraps an action in a bounded loop that keeps
//! advancing while the new URL answers with a configured error status.

mod error_skip;

#[cfg(feature = "http-probe")]
pub use error_skip::{ProbeConfig, ReqwestProbe};
pub use error_skip::{
    apply_with_error_skip, ErrorCode, ErrorCodeSet, ErrorSkipReport, HeadProbe, ProbeResponse,
    SkipOutcome, SkippedUrl,
};

#[cfg(test)]
pub use error_skip::MockHeadProbe;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::errors::MutationError;
use crate::instance::{Action, Instance, MultiPart};
use crate::transform::{transform, Direction, TransformParams};

/// The URL and selection an action produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// The new URL.
    pub url: String,
    /// The new selection (the last edited part in multi mode).
    pub selection: String,
}

/// A spliced URL and the replacement text.
struct Spliced {
    url: String,
    selection: String,
}

fn splice(
    url: &str,
    selection: &str,
    start: usize,
    direction: Direction,
    params: &TransformParams,
) -> Result<Spliced, MutationError> {
    if selection.is_empty() {
        return Err(MutationError::NoSelection);
    }
    let end = start + selection.len();
    if url.get(start..end) != Some(selection) {
        return Err(MutationError::SelectionMismatch {
            selection: selection.to_string(),
            start,
        });
    }

    let replacement = transform(direction, selection, params)?;
    let mut out = String::with_capacity(url.len() + replacement.len());
    out.push_str(&url[..start]);
    out.push_str(&replacement);
    out.push_str(&url[end..]);
    Ok(Spliced {
        url: out,
        selection: replacement,
    })
}

/// Moves an offset that lies after an edit whose text changed length.
fn shift_offset(offset: usize, old_len: usize, new_len: usize) -> usize {
    if new_len >= old_len {
        offset + (new_len - old_len)
    } else {
        offset.saturating_sub(old_len - new_len)
    }
}

/// Working copy of the multi-part state.
struct MultiWork {
    url: String,
    parts: BTreeMap<u8, MultiPart>,
    last: Option<(String, usize)>,
}

impl MultiWork {
    fn new(instance: &Instance) -> Self {
        Self {
            url: instance.url.clone(),
            parts: instance.multi.clone(),
            last: None,
        }
    }

    fn step(&mut self, direction: Direction, part: u8, active: u8) -> Result<(), MutationError> {
        if part == 0 || part > active {
            return Err(MutationError::UnknownPart(part));
        }
        let entry = self.parts.get(&part).ok_or(MutationError::UnknownPart(part))?;
        let start = entry.selection_start;
        let old_len = entry.selection.len();
        let spliced = splice(&self.url, &entry.selection, start, direction, &entry.params)?;
        let new_len = spliced.selection.len();

        if new_len != old_len {
            for (_, other) in self
                .parts
                .range_mut(1..=active)
                .filter(|(idx, other)| **idx != part && other.selection_start > start)
            {
                other.selection_start = shift_offset(other.selection_start, old_len, new_len);
            }
        }
        if let Some(entry) = self.parts.get_mut(&part) {
            entry.selection.clone_from(&spliced.selection);
        }

        debug!(part, selection = %spliced.selection, "Stepped multi part");
        self.url = spliced.url;
        self.last = Some((spliced.selection, start));
        Ok(())
    }
}

/// Applies actions to instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlMutator;

impl UrlMutator {
    /// Applies `action` to the instance's URL.
    ///
    /// With multi mode on, `part: Some(n)` steps part `n` and `part: None`
    /// steps parts `1..=multi_count` in order. Otherwise the main selection
    /// is stepped.
    pub fn apply(action: Action, instance: &mut Instance) -> Result<Mutation, MutationError> {
        let direction = action.direction();
        let result = if instance.multi_enabled {
            Self::apply_multi(direction, action.part(), instance)
        } else {
            Self::apply_single(direction, instance)
        };

        match &result {
            Ok(mutation) => debug!(%direction, url = %mutation.url, "Applied action"),
            Err(error) => warn!(%direction, url = %instance.url, %error, "Action left URL unchanged"),
        }
        result
    }

    fn apply_single(
        direction: Direction,
        instance: &mut Instance,
    ) -> Result<Mutation, MutationError> {
        let start = instance.selection_start.ok_or(MutationError::NoSelection)?;
        let spliced = splice(
            &instance.url,
            &instance.selection,
            start,
            direction,
            &instance.params,
        )?;

        instance.url.clone_from(&spliced.url);
        instance.selection.clone_from(&spliced.selection);
        Ok(Mutation {
            url: spliced.url,
            selection: spliced.selection,
        })
    }

    fn apply_multi(
        direction: Direction,
        part: Option<u8>,
        instance: &mut Instance,
    ) -> Result<Mutation, MutationError> {
        let active = instance.multi_count;
        let mut work = MultiWork::new(instance);
        match part {
            Some(part) => work.step(direction, part, active)?,
            None => {
                for part in 1..=active {
                    work.step(direction, part, active)?;
                }
            }
        }

        let (selection, start) = work.last.ok_or(MutationError::NoSelection)?;
        instance.url.clone_from(&work.url);
        instance.multi = work.parts;
        instance.selection.clone_from(&selection);
        instance.selection_start = Some(start);
        Ok(Mutation {
            url: work.url,
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decimal() -> TransformParams {
        TransformParams::new(1)
    }

    fn multi_instance(url: &str, parts: &[(&str, usize, TransformParams)]) -> Instance {
        let mut instance = Instance::default();
        instance.url = url.to_string();
        for (selection, start, params) in parts {
            instance.add_multi_part(MultiPart::new(*selection, *start, params.clone()));
        }
        instance
    }

    #[test]
    fn test_single_increment() {
        let mut instance = Instance::with_selection("http://x.com/page/9", "9", 18, decimal());
        let mutation = UrlMutator::apply(Action::increment(), &mut instance).unwrap();

        assert_eq!(mutation.url, "http://x.com/page/10");
        assert_eq!(instance.url, "http://x.com/page/10");
        assert_eq!(instance.selection, "10");
        assert!(instance.selection_is_valid());
    }

    #[test]
    fn test_single_decrement_keeps_suffix() {
        let mut instance = Instance::with_selection("http://x.com/p10.html", "10", 14, decimal());
        UrlMutator::apply(Action::decrement(), &mut instance).unwrap();
        assert_eq!(instance.url, "http://x.com/p9.html");
    }

    #[test]
    fn test_failed_transform_leaves_instance_untouched() {
        let params = TransformParams::new(1)
            .with_base(crate::transform::Base::Date("yyyy-mm-dd".to_string()));
        let mut instance = Instance::with_selection("http://x.com/abc", "abc", 13, params);
        let before = instance.clone();

        let result = UrlMutator::apply(Action::increment(), &mut instance);
        assert!(matches!(result, Err(MutationError::Transform(_))));
        assert_eq!(instance, before);
    }

    #[test]
    fn test_stale_selection_rejected() {
        let mut instance = Instance::with_selection("http://x.com/5", "7", 13, decimal());
        let result = UrlMutator::apply(Action::increment(), &mut instance);
        assert!(matches!(result, Err(MutationError::SelectionMismatch { .. })));
        assert_eq!(instance.url, "http://x.com/5");
    }

    #[test]
    fn test_multi_part_shift() {
        // Part 1 grows by two characters; part 2 must move with it.
        let mut instance = multi_instance(
            "http://x.com/9/a/5",
            &[("9", 13, TransformParams::new(100)), ("5", 17, decimal())],
        );

        UrlMutator::apply(Action::Increment { part: Some(1) }, &mut instance).unwrap();

        assert_eq!(instance.url, "http://x.com/109/a/5");
        assert_eq!(instance.multi[&1].selection, "109");
        assert_eq!(instance.multi[&2].selection_start, 19);
        assert_eq!(instance.multi[&2].selection, "5");
    }

    #[test]
    fn test_multi_part_before_is_not_shifted() {
        let mut instance = multi_instance(
            "http://x.com/3/a/99",
            &[("3", 13, decimal()), ("99", 17, decimal())],
        );

        UrlMutator::apply(Action::Increment { part: Some(2) }, &mut instance).unwrap();

        assert_eq!(instance.url, "http://x.com/3/a/100");
        assert_eq!(instance.multi[&1].selection_start, 13);
    }

    #[test]
    fn test_multi_all_parts() {
        let mut instance = multi_instance(
            "http://x.com/9/a/9",
            &[("9", 13, decimal()), ("9", 17, decimal())],
        );

        let mutation = UrlMutator::apply(Action::increment(), &mut instance).unwrap();

        assert_eq!(mutation.url, "http://x.com/10/a/10");
        assert_eq!(instance.multi[&2].selection_start, 18);
        assert_eq!(instance.selection, "10");
        assert_eq!(instance.selection_start, Some(18));
        assert!(instance.selection_is_valid());
    }

    #[test]
    fn test_multi_all_parts_commits_nothing_on_failure() {
        let roman = TransformParams::new(1).with_base(crate::transform::Base::Roman);
        let mut instance = multi_instance(
            "http://x.com/9/a/9",
            &[("9", 13, decimal()), ("9", 17, roman)],
        );
        let before = instance.clone();

        assert!(UrlMutator::apply(Action::increment(), &mut instance).is_err());
        assert_eq!(instance, before);
    }

    #[test]
    fn test_multi_unknown_part() {
        let mut instance = multi_instance("http://x.com/1", &[("1", 13, decimal())]);
        assert_eq!(
            UrlMutator::apply(Action::Increment { part: Some(3) }, &mut instance),
            Err(MutationError::UnknownPart(3))
        );
    }

    #[test]
    fn test_shift_offset() {
        assert_eq!(shift_offset(20, 1, 3), 22);
        assert_eq!(shift_offset(20, 3, 1), 18);
        assert_eq!(shift_offset(20, 2, 2), 20);
    }
}
