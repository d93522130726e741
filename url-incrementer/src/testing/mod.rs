//! Test doubles and helpers for incrementer code.
//!
//! This module provides:
//! - A scripted [`HeadProbe`](crate::mutator::HeadProbe) for error-skip runs
//! - A static [`Document`](crate::links::Document) for link inference
//! - Assertions over instances and mutations

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_mutation, assert_selection_consistent, assert_untouched};
pub use fixtures::{numbered_instance, StaticDocument};
pub use mocks::{ProbeCall, ScriptedProbe};
