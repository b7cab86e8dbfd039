// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The result type of a single step in a fallback chain.
//!
//! Every capability lookup is a chain of attempts. Each attempt either finds a
//! value, finds nothing, or fails while trying. Both of the latter hand control
//! to the next attempt; the chain only collapses to an "unknown" answer once
//! every step is exhausted.

use std::fmt;

/// Outcome of one probe step.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    /// The step produced a value.
    Found(T),
    /// The step had nothing to look at.
    NotFound,
    /// The step tried and failed (inaccessible member, wrong type, host error).
    Failed(String),
}

impl<T> Probe<T> {
    /// Builds a `Failed` outcome from anything displayable.
    pub fn failed(reason: impl fmt::Display) -> Self {
        Probe::Failed(reason.to_string())
    }

    /// Returns `true` for `Found`.
    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }

    /// Converts into an `Option`, discarding the miss reason.
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(value) => Some(value),
            Probe::NotFound | Probe::Failed(_) => None,
        }
    }

    /// Maps the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Found(value) => Probe::Found(f(value)),
            Probe::NotFound => Probe::NotFound,
            Probe::Failed(reason) => Probe::Failed(reason),
        }
    }

    /// Chains a dependent step that only runs on `Found`.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Probe<U>) -> Probe<U> {
        match self {
            Probe::Found(value) => f(value),
            Probe::NotFound => Probe::NotFound,
            Probe::Failed(reason) => Probe::Failed(reason),
        }
    }

    /// Runs the next fallback unless this step found something.
    ///
    /// A failure is not sticky: the fallback's outcome replaces it, so a later
    /// `NotFound` hides an earlier `Failed`. Use [`Probe::trace_miss`] before
    /// chaining if the reason matters for diagnostics.
    pub fn or_else(self, f: impl FnOnce() -> Probe<T>) -> Probe<T> {
        match self {
            Probe::Found(value) => Probe::Found(value),
            Probe::NotFound | Probe::Failed(_) => f(),
        }
    }

    /// Returns the found value or `default`.
    pub fn unwrap_or(self, default: T) -> T {
        self.found().unwrap_or(default)
    }

    /// Logs a miss at trace level, tagged with `step`, and passes the outcome through.
    pub fn trace_miss(self, step: &str) -> Self {
        match &self {
            Probe::NotFound => log::trace!("probe step '{step}': nothing found"),
            Probe::Failed(reason) => log::trace!("probe step '{step}' failed: {reason}"),
            Probe::Found(_) => {}
        }
        self
    }
}

impl<T> From<Option<T>> for Probe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Probe::Found(v),
            None => Probe::NotFound,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Probe<T> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(v) => Probe::Found(v),
            Err(e) => Probe::failed(e),
        }
    }
}
