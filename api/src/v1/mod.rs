mod page;
mod problem;

pub use page::{PagedResult, DEFAULT_PAGE_SIZE};
pub use problem::ValidationProblem;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub subject: String,
    pub description: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body of create and update.
///
/// Missing or `null` text fields decode as empty strings so they surface as
/// validation errors rather than decoding errors.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoDraft {
    #[serde(default, deserialize_with = "string_or_null")]
    #[garde(custom(not_blank))]
    pub subject: String,
    #[serde(default, deserialize_with = "string_or_null")]
    #[garde(custom(not_blank))]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub done: Option<bool>,
}

impl TodoDraft {
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
            done: None,
        }
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Unset is treated as not done.
    pub fn is_done(&self) -> bool {
        self.done == Some(true)
    }
}

fn not_blank(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }

    Ok(())
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
