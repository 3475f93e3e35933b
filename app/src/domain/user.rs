//! Account roles and job-seeker profiles.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Posts jobs.
    Company,
    /// Browses and applies for jobs.
    Jobseeker,
}

impl UserType {
    /// Stable string form stored in the session.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Jobseeker => "jobseeker",
        }
    }

    /// Parse the stored string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "company" => Some(Self::Company),
            "jobseeker" => Some(Self::Jobseeker),
            _ => None,
        }
    }
}

/// Job-seeker profile as used for recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Free-text biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Skills in the order the user listed them.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-text experience summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Hosted profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}
