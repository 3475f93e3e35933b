//! Filter criteria and single-field updates.

use serde::{Deserialize, Serialize};

/// Optional criteria applied to a job listing.
///
/// Every criterion is inactive when unset. String criteria are also
/// inactive when blank, so a cleared text field never filters anything out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilters {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact skill match.
    pub skill: Option<String>,
    /// Lower salary bound, compared against the salary midpoint.
    pub min_salary: Option<f64>,
    /// Upper salary bound, compared against the salary midpoint.
    pub max_salary: Option<f64>,
    /// Whitespace-separated keywords; any one of them must appear.
    pub keywords: Option<String>,
}

/// One field change applied through [`JobFilters::apply_update`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    /// Replace or clear the category criterion.
    Category(Option<String>),
    /// Replace or clear the skill criterion.
    Skill(Option<String>),
    /// Replace or clear the lower salary bound.
    MinSalary(Option<f64>),
    /// Replace or clear the upper salary bound.
    MaxSalary(Option<f64>),
    /// Replace or clear the keyword criterion.
    Keywords(Option<String>),
}

impl JobFilters {
    /// Set the category criterion.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the skill criterion.
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// Set both salary bounds; either may be `None`.
    #[must_use]
    pub fn with_salary_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    /// Set the keyword criterion.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Return a copy with one field replaced.
    #[must_use]
    pub fn apply_update(mut self, update: FilterUpdate) -> Self {
        match update {
            FilterUpdate::Category(value) => self.category = value,
            FilterUpdate::Skill(value) => self.skill = value,
            FilterUpdate::MinSalary(value) => self.min_salary = value,
            FilterUpdate::MaxSalary(value) => self.max_salary = value,
            FilterUpdate::Keywords(value) => self.keywords = value,
        }
        self
    }

    /// Returns `true` when no criterion is active.
    ///
    /// ```
    /// use job_filter::JobFilters;
    ///
    /// assert!(JobFilters::default().is_empty());
    /// assert!(JobFilters::default().with_category("  ").is_empty());
    /// assert!(!JobFilters::default().with_skill("Rust").is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_category().is_none()
            && self.active_skill().is_none()
            && !self.has_salary_bounds()
            && self.keyword_terms().is_empty()
    }

    pub(crate) fn active_category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    pub(crate) fn active_skill(&self) -> Option<&str> {
        non_blank(self.skill.as_deref())
    }

    pub(crate) const fn has_salary_bounds(&self) -> bool {
        self.min_salary.is_some() || self.max_salary.is_some()
    }

    /// Lower-cased keyword terms; empty when the criterion is inactive.
    pub(crate) fn keyword_terms(&self) -> Vec<String> {
        self.keywords
            .as_deref()
            .map(|raw| raw.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
