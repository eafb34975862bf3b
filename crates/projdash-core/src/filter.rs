//! Filter engine: predicate criteria applied to a [`Dataset`] to produce a
//! borrowed [`FilteredView`].
//!
//! Filtering never mutates the dataset, preserves source row order, and is
//! deterministic: the same dataset and criteria always yield the same view.
//! Project-level metrics are computed over the filtered view, not the full
//! dataset (see [`crate::metrics`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Dataset, TaskRecord};

/// Inclusive date range applied to a task's planned span
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A task matches when its whole planned span lies inside the range
    /// (start >= range start and end <= range end), not on mere overlap.
    pub fn contains_span(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Filter criteria for task views.
///
/// An empty `categories` set matches *no* rows: a category multi-select
/// with nothing ticked yields an empty table, not the full dataset. Callers
/// that want "no category filter" must pass every category explicitly (see
/// [`FilterCriteria::for_dataset`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Categories to match; empty set matches none
    pub categories: BTreeSet<String>,
    /// Case-insensitive substring match on the task name; empty matches all
    pub name_pattern: String,
    /// Inclusive date range on the task span; `None` applies no constraint
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria selecting every category present in the dataset, with no
    /// name or date constraint. The usual starting point for adapters.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            categories: dataset.categories().into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a category to the selection
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Set the task-name search pattern
    pub fn search(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = pattern.into();
        self
    }

    /// Restrict to tasks whose span lies within [start, end]
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// Does a single task satisfy every predicate?
    pub fn matches(&self, task: &TaskRecord) -> bool {
        if !self.categories.contains(&task.category) {
            return false;
        }
        if !self.name_pattern.is_empty() {
            let name = task.name.to_lowercase();
            if !name.contains(&self.name_pattern.to_lowercase()) {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains_span(task.start, task.end) {
                return false;
            }
        }
        true
    }
}

/// A subset of a [`Dataset`] matching some criteria.
///
/// Holds references into the borrowed dataset, so creating a view never
/// copies or mutates records and the view is always a subset of its source.
#[derive(Clone, Debug)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    tasks: Vec<&'a TaskRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The dataset this view was taken from
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Iterate matching tasks in source row order
    pub fn iter(&self) -> impl Iterator<Item = &'a TaskRecord> + '_ {
        self.tasks.iter().copied()
    }

    /// Re-apply criteria to this view's rows. Used by adapters that narrow
    /// an existing selection; filtering by the same criteria is idempotent.
    pub fn refine(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        FilteredView {
            dataset: self.dataset,
            tasks: self
                .tasks
                .iter()
                .copied()
                .filter(|task| criteria.matches(task))
                .collect(),
        }
    }
}

impl Dataset {
    /// Apply filter criteria, producing a view over the matching subset
    pub fn filter(&self, criteria: &FilterCriteria) -> FilteredView<'_> {
        FilteredView {
            dataset: self,
            tasks: self.iter().filter(|task| criteria.matches(task)).collect(),
        }
    }

    /// A view over every row, bypassing category selection
    pub fn view_all(&self) -> FilteredView<'_> {
        FilteredView {
            dataset: self,
            tasks: self.iter().collect(),
        }
    }
}
