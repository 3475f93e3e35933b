//! Applying [`JobFilters`] to job listings.

use crate::filters::JobFilters;
use crate::salary::salary_midpoint;

/// Read access to the job fields that filtering inspects.
pub trait FilterableJob {
    /// Job title.
    fn title(&self) -> &str;
    /// Free-text job description.
    fn description(&self) -> &str;
    /// Category the job was posted under.
    fn category(&self) -> &str;
    /// Primary skill the job asks for.
    fn skill(&self) -> &str;
    /// Free-text salary package.
    fn salary(&self) -> &str;
}

impl JobFilters {
    /// Returns `true` when `job` satisfies every active criterion.
    pub fn matches<J: FilterableJob + ?Sized>(&self, job: &J) -> bool {
        if self.active_category().is_some_and(|category| job.category() != category) {
            return false;
        }
        if self.active_skill().is_some_and(|skill| job.skill() != skill) {
            return false;
        }
        if self.has_salary_bounds() && !self.salary_in_range(job.salary()) {
            return false;
        }

        let terms = self.keyword_terms();
        if terms.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {} {}",
            job.title(),
            job.description(),
            job.skill(),
            job.category()
        )
        .to_lowercase();
        terms.iter().any(|term| haystack.contains(term.as_str()))
    }

    fn salary_in_range(&self, raw: &str) -> bool {
        // Unreadable packages carry no figure to compare, so bounds keep them.
        let Some(salary) = salary_midpoint(raw) else {
            return true;
        };
        if self.min_salary.is_some_and(|min| salary < min) {
            return false;
        }
        !self.max_salary.is_some_and(|max| salary > max)
    }
}

/// Return the jobs that satisfy `filters`, preserving input order.
///
/// With no active criteria the result equals the input.
pub fn filter_jobs<J>(jobs: &[J], filters: &JobFilters) -> Vec<J>
where
    J: FilterableJob + Clone,
{
    if filters.is_empty() {
        return jobs.to_vec();
    }
    jobs.iter()
        .filter(|job| filters.matches(*job))
        .cloned()
        .collect()
}
