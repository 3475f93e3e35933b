//! Job applications tracked by job-seekers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApplicationId, JobId, UserId};

/// Where an application stands. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Submitted, no response yet.
    #[default]
    Applied,
    /// Under initial review.
    Screening,
    /// Interviewing.
    Interview,
    /// Offer received.
    Offer,
    /// Turned down by the company.
    Rejected,
    /// Withdrawn by the applicant.
    Withdrawn,
}

/// A tracked application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    /// Backend-issued identifier.
    pub id: ApplicationId,
    /// Owning job-seeker.
    pub user_id: UserId,
    /// Job applied for.
    pub job_id: JobId,
    /// Job title at the time of applying.
    pub job_title: String,
    /// Company name at the time of applying.
    pub company: String,
    /// Current status.
    pub status: ApplicationStatus,
    /// When the application was recorded.
    #[serde(rename = "appliedDate")]
    pub applied_at: DateTime<Utc>,
    /// When the application last changed.
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    /// Scheduled interview, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Recruiter or hiring-manager name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Recruiter or hiring-manager email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl JobApplication {
    /// Merge `update` into this application, stamping `last_updated`.
    pub fn apply_update(&mut self, update: &ApplicationUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(interview_date) = update.interview_date {
            self.interview_date = Some(interview_date);
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(contact_name) = &update.contact_name {
            self.contact_name = Some(contact_name.clone());
        }
        if let Some(contact_email) = &update.contact_email {
            self.contact_email = Some(contact_email.clone());
        }
        self.last_updated = now;
    }
}

/// Fields supplied when tracking a new application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    /// Job applied for.
    pub job_id: JobId,
    /// Job title.
    pub job_title: String,
    /// Company name.
    pub company: String,
    /// Initial status; [`ApplicationStatus::Applied`] when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    /// Scheduled interview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl NewApplication {
    /// Minimal application for `job_id`.
    pub fn new(job_id: JobId, job_title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            job_id,
            job_title: job_title.into(),
            company: company.into(),
            status: None,
            interview_date: None,
            notes: None,
            contact_name: None,
            contact_email: None,
        }
    }

    /// Build the stored record once the backend has issued an id.
    #[must_use]
    pub fn into_application(
        self,
        id: ApplicationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> JobApplication {
        JobApplication {
            id,
            user_id,
            job_id: self.job_id,
            job_title: self.job_title,
            company: self.company,
            status: self.status.unwrap_or_default(),
            applied_at: now,
            last_updated: now,
            interview_date: self.interview_date,
            notes: self.notes,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
        }
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    /// New interview date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    /// Replacement notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Replacement contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Replacement contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// Count of applications per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    /// All applications.
    pub total: usize,
    /// [`ApplicationStatus::Applied`].
    pub applied: usize,
    /// [`ApplicationStatus::Screening`].
    pub screening: usize,
    /// [`ApplicationStatus::Interview`].
    pub interview: usize,
    /// [`ApplicationStatus::Offer`].
    pub offer: usize,
    /// [`ApplicationStatus::Rejected`].
    pub rejected: usize,
    /// [`ApplicationStatus::Withdrawn`].
    pub withdrawn: usize,
}

impl ApplicationStats {
    /// Tally `applications`.
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a JobApplication>) -> Self {
        let mut stats = Self::default();
        for application in applications {
            stats.record(application.status);
        }
        stats
    }

    /// Count one more application in `status`.
    pub fn record(&mut self, status: ApplicationStatus) {
        self.total += 1;
        *self.counter(status) += 1;
    }

    /// Count one fewer application in `status`.
    pub fn forget(&mut self, status: ApplicationStatus) {
        self.total = self.total.saturating_sub(1);
        let counter = self.counter(status);
        *counter = counter.saturating_sub(1);
    }

    /// Move one application from `from` to `to`.
    pub fn transition(&mut self, from: ApplicationStatus, to: ApplicationStatus) {
        if from == to {
            return;
        }
        let old = self.counter(from);
        *old = old.saturating_sub(1);
        *self.counter(to) += 1;
    }

    /// Number of applications in `status`.
    #[must_use]
    pub const fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Applied => self.applied,
            ApplicationStatus::Screening => self.screening,
            ApplicationStatus::Interview => self.interview,
            ApplicationStatus::Offer => self.offer,
            ApplicationStatus::Rejected => self.rejected,
            ApplicationStatus::Withdrawn => self.withdrawn,
        }
    }

    const fn counter(&mut self, status: ApplicationStatus) -> &mut usize {
        match status {
            ApplicationStatus::Applied => &mut self.applied,
            ApplicationStatus::Screening => &mut self.screening,
            ApplicationStatus::Interview => &mut self.interview,
            ApplicationStatus::Offer => &mut self.offer,
            ApplicationStatus::Rejected => &mut self.rejected,
            ApplicationStatus::Withdrawn => &mut self.withdrawn,
        }
    }
}
