//! Job postings and the form companies fill in to create them.

use chrono::{DateTime, Utc};
use job_filter::FilterableJob;
use serde::{Deserialize, Serialize};

use super::{JobId, UserId};

/// A job posted by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Backend-issued identifier.
    pub id: JobId,
    /// Job title.
    #[serde(rename = "jobTitle")]
    pub title: String,
    /// Free-text description.
    #[serde(rename = "jobDesc")]
    pub description: String,
    /// Category chosen from the fixed list.
    pub category: String,
    /// Primary skill chosen from the fixed list.
    pub skill: String,
    /// Required experience, free text.
    pub experience: String,
    /// Salary package, free text such as `"$50k-$70k"`.
    #[serde(rename = "salaryPackage")]
    pub salary: String,
    /// Company display name.
    pub company: String,
    /// Company account that posted the job.
    pub posted_by: UserId,
    /// Display name of the poster.
    #[serde(default)]
    pub poster_name: String,
    /// Creation time; absent while the backend has not stamped it yet.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Overwrite the editable fields with `draft`.
    pub fn apply_draft(&mut self, draft: &JobDraft) {
        self.title.clone_from(&draft.title);
        self.description.clone_from(&draft.description);
        self.category.clone_from(&draft.category);
        self.skill.clone_from(&draft.skill);
        self.experience.clone_from(&draft.experience);
        self.salary.clone_from(&draft.salary);
        self.company.clone_from(&draft.company);
    }
}

impl FilterableJob for Job {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn skill(&self) -> &str {
        &self.skill
    }

    fn salary(&self) -> &str {
        &self.salary
    }
}

/// Sort jobs newest first; unstamped jobs go last.
pub fn sort_newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Editable job fields as entered in the posting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    /// Job title.
    #[serde(rename = "jobTitle")]
    pub title: String,
    /// Free-text description.
    #[serde(rename = "jobDesc")]
    pub description: String,
    /// Category.
    pub category: String,
    /// Primary skill.
    pub skill: String,
    /// Required experience.
    pub experience: String,
    /// Salary package.
    #[serde(rename = "salaryPackage")]
    pub salary: String,
    /// Company display name.
    pub company: String,
}

/// Validation failures for [`JobDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobDraftValidationError {
    /// A required field was blank.
    #[error("{field} is required")]
    MissingField {
        /// Form field name.
        field: &'static str,
    },
}

impl JobDraft {
    /// Check that every field is filled in.
    pub fn validate(&self) -> Result<(), JobDraftValidationError> {
        let fields = [
            ("job title", &self.title),
            ("job description", &self.description),
            ("category", &self.category),
            ("skill", &self.skill),
            ("experience", &self.experience),
            ("salary package", &self.salary),
            ("company", &self.company),
        ];
        match fields.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(JobDraftValidationError::MissingField { field }),
            None => Ok(()),
        }
    }
}

/// Payload for creating a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    /// Form contents.
    #[serde(flatten)]
    pub draft: JobDraft,
    /// Posting company.
    pub posted_by: UserId,
    /// Display name of the poster.
    pub poster_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> JobDraft {
        JobDraft {
            title: "Backend Engineer".to_owned(),
            description: "Build APIs".to_owned(),
            category: "Engineering".to_owned(),
            skill: "Rust".to_owned(),
            experience: "3 years".to_owned(),
            salary: "50k-70k".to_owned(),
            company: "Acme".to_owned(),
        }
    }

    fn job(id: &str, created_at: Option<i64>) -> Job {
        Job {
            id: JobId::new(id).expect("valid id"),
            title: String::new(),
            description: String::new(),
            category: String::new(),
            skill: String::new(),
            experience: String::new(),
            salary: String::new(),
            company: String::new(),
            posted_by: UserId::new("c1").expect("valid id"),
            poster_name: String::new(),
            created_at: created_at.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        }
    }

    #[rstest]
    fn complete_drafts_validate(draft: JobDraft) {
        assert_eq!(draft.validate(), Ok(()));
    }

    #[rstest]
    fn first_blank_field_is_reported(mut draft: JobDraft) {
        draft.skill = "  ".to_owned();
        draft.company = String::new();
        assert_eq!(
            draft.validate(),
            Err(JobDraftValidationError::MissingField { field: "skill" })
        );
    }

    #[rstest]
    fn jobs_use_the_backend_field_names() {
        let parsed: Job = serde_json::from_value(serde_json::json!({
            "id": "j1",
            "jobTitle": "Designer",
            "jobDesc": "Draw",
            "category": "Design",
            "skill": "Figma",
            "experience": "1 year",
            "salaryPackage": "40k",
            "company": "Acme",
            "postedBy": "c1",
            "createdAt": "2026-01-05T10:00:00Z"
        }))
        .expect("job parses");
        assert_eq!(parsed.title, "Designer");
        assert_eq!(parsed.salary, "40k");
        assert_eq!(parsed.poster_name, "");
    }

    #[rstest]
    fn new_job_flattens_the_draft(draft: JobDraft) {
        let new_job = NewJob {
            draft,
            posted_by: UserId::new("c1").expect("valid id"),
            poster_name: "Acme HR".to_owned(),
        };
        let value = serde_json::to_value(&new_job).expect("serialise");
        assert_eq!(value["jobTitle"], "Backend Engineer");
        assert_eq!(value["postedBy"], "c1");
    }

    #[rstest]
    fn newest_first_puts_unstamped_jobs_last() {
        let mut jobs = vec![job("a", Some(10)), job("b", None), job("c", Some(20))];
        sort_newest_first(&mut jobs);
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[rstest]
    fn apply_draft_keeps_identity(draft: JobDraft) {
        let mut existing = job("a", Some(10));
        existing.apply_draft(&draft);
        assert_eq!(existing.id.as_str(), "a");
        assert_eq!(existing.title, "Backend Engineer");
    }
}
