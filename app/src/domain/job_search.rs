//! Stateful filtering over a loaded job list.

use job_filter::{FilterUpdate, FilterableJob, JobFilters, filter_jobs};

use super::Job;

/// Current filters plus the jobs they let through.
#[derive(Debug, Clone)]
pub struct JobSearch<J = Job> {
    jobs: Vec<J>,
    filters: JobFilters,
    filtered: Vec<J>,
}

impl<J: FilterableJob + Clone> JobSearch<J> {
    /// Start with no filters; every job is visible.
    pub fn new(jobs: Vec<J>) -> Self {
        Self {
            filtered: jobs.clone(),
            jobs,
            filters: JobFilters::default(),
        }
    }

    /// Active filters.
    pub const fn filters(&self) -> &JobFilters {
        &self.filters
    }

    /// Jobs passing the active filters, in load order.
    pub fn filtered(&self) -> &[J] {
        &self.filtered
    }

    /// Replace the job list and re-run the active filters.
    pub fn replace_jobs(&mut self, jobs: Vec<J>) -> &[J] {
        self.jobs = jobs;
        self.refilter()
    }

    /// Re-run filtering, first adopting `filters` when given.
    pub fn apply(&mut self, filters: Option<JobFilters>) -> &[J] {
        if let Some(filters) = filters {
            self.filters = filters;
        }
        self.refilter()
    }

    /// Change one criterion and re-run filtering.
    pub fn update(&mut self, update: FilterUpdate) -> &[J] {
        self.filters = std::mem::take(&mut self.filters).apply_update(update);
        self.refilter()
    }

    /// Drop every criterion.
    pub fn reset(&mut self) -> &[J] {
        self.filters = JobFilters::default();
        self.refilter()
    }

    fn refilter(&mut self) -> &[J] {
        self.filtered = filter_jobs(&self.jobs, &self.filters);
        &self.filtered
    }
}
