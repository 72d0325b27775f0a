//! # Path Stepping Protocol
//!
//! Every nested entity (a type, a nested attribute object, a whole schema)
//! implements [`ApplyStep`]: given one [`Step`], return the immediately
//! nested entity it selects or a [`StepError`] naming the step kind and the
//! entity kind. [`walk_path`] resolves a whole [`Path`] by applying steps
//! left to right and stops at the first failure.

use crate::error::{PathResolutionError, StepError};
use crate::path::{Path, Step};

/// One level of descent into a nested entity.
pub trait ApplyStep {
    /// Entity produced by a successful step.
    type Output;

    /// Apply a single step.
    fn apply_step(&self, step: &Step) -> Result<Self::Output, StepError>;
}

/// Resolve `path` against `root`.
///
/// On failure the error carries the failed step, the steps after it, and
/// the full path.
pub fn walk_path<T>(root: T, path: &Path) -> Result<T, PathResolutionError>
where
    T: ApplyStep<Output = T>,
{
    let mut current = root;
    for (index, step) in path.steps().iter().enumerate() {
        current = current
            .apply_step(step)
            .map_err(|source| PathResolutionError {
                step: step.clone(),
                remaining: Path::from_steps(path.steps()[index + 1..].to_vec()),
                path: path.clone(),
                source,
            })?;
    }
    Ok(current)
}
