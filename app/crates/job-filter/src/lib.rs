//! Pure filtering primitives for job listings.
//!
//! This crate is independent of the client's domain types: anything that
//! implements [`FilterableJob`] can be filtered. Filtering is synchronous,
//! deterministic, and free of side effects.
//!
//! # Overview
//!
//! - [`JobFilters`] holds the optional criteria (category, skill, salary
//!   bounds, keywords).
//! - [`filter_jobs`] applies them to a slice of jobs.
//! - [`salary_midpoint`] extracts a comparable number from free-text salary
//!   packages such as `"$50k-$70k"`.
//!
//! # Example
//!
//! ```
//! use job_filter::{FilterableJob, JobFilters, filter_jobs};
//!
//! #[derive(Clone)]
//! struct Listing {
//!     title: &'static str,
//!     category: &'static str,
//! }
//!
//! impl FilterableJob for Listing {
//!     fn title(&self) -> &str { self.title }
//!     fn description(&self) -> &str { "" }
//!     fn category(&self) -> &str { self.category }
//!     fn skill(&self) -> &str { "" }
//!     fn salary(&self) -> &str { "" }
//! }
//!
//! let jobs = vec![
//!     Listing { title: "Backend engineer", category: "Engineering" },
//!     Listing { title: "Account manager", category: "Sales" },
//! ];
//! let filters = JobFilters::default().with_category("Sales");
//!
//! let matched = filter_jobs(&jobs, &filters);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].title, "Account manager");
//! ```

mod filters;
mod matcher;
mod salary;

pub use filters::{FilterUpdate, JobFilters};
pub use matcher::{FilterableJob, filter_jobs};
pub use salary::salary_midpoint;
