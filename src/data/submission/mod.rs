use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod db;

pub static SUBMISSION_COLLECTION_NAME: &str = "submissions";

/// Review state of a submission. `Pending` is the only non-terminal state;
/// unknown strings are rejected at deserialization.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Completed,
    Rejected,
}

impl SubmissionStatus {
    const ALL: [SubmissionStatus; 3] = [
        SubmissionStatus::Pending,
        SubmissionStatus::Completed,
        SubmissionStatus::Rejected,
    ];

    pub fn is_terminal(self) -> bool {
        self != SubmissionStatus::Pending
    }

    /// A record keeps its status or moves out of `Pending`; terminal states
    /// are immutable.
    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        self == next || !self.is_terminal()
    }

    /// Statuses a stored record may hold for a replace into `self` to be
    /// allowed.
    pub fn allowed_sources(self) -> Vec<SubmissionStatus> {
        Self::ALL
            .iter()
            .copied()
            .filter(|source| source.can_transition_to(self))
            .collect()
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "Pending"),
            SubmissionStatus::Completed => write!(f, "Completed"),
            SubmissionStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A solution handed in for an assignment. `assignment_id` is a recorded
/// reference; the store does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub user_email: String,
    pub doc_link: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub status: SubmissionStatus,
}
