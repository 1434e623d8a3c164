//! Client-side record filtering.
//!
//! # Responsibility
//! - Match records against an optional free-text query and education value.
//! - Provide the empty-state message shown for a filtered view.
//!
//! # Invariants
//! - Matching is case-insensitive substring search.
//! - Blank filter values count as absent.
//! - Filtering preserves relative order and is idempotent.

use crate::model::user::UserRecord;

const EMPTY_FILTERED_MESSAGE: &str = "No users match filters.";
const EMPTY_UNFILTERED_MESSAGE: &str = "No users to show.";

/// Filter applied to the cached collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Searched in names, mobile, address and interests.
    pub query: Option<String>,
    /// Searched in the education field.
    pub education: Option<String>,
}

impl UserFilter {
    pub fn new(query: Option<String>, education: Option<String>) -> Self {
        Self { query, education }
    }

    /// Returns whether any non-blank filter value is set.
    pub fn is_active(&self) -> bool {
        self.normalized_query().is_some() || self.normalized_education().is_some()
    }

    /// Returns whether `user` passes every active filter.
    pub fn matches(&self, user: &UserRecord) -> bool {
        if let Some(education) = self.normalized_education() {
            if !user.education.to_lowercase().contains(&education) {
                return false;
            }
        }

        match self.normalized_query() {
            Some(query) => search_haystack(user).contains(&query),
            None => true,
        }
    }

    /// Returns the matching records in their original order.
    pub fn apply(&self, users: &[UserRecord]) -> Vec<UserRecord> {
        if !self.is_active() {
            return users.to_vec();
        }
        users
            .iter()
            .filter(|user| self.matches(user))
            .cloned()
            .collect()
    }

    /// Message for an empty result, depending on whether filters were applied.
    pub fn empty_message(&self) -> &'static str {
        if self.is_active() {
            EMPTY_FILTERED_MESSAGE
        } else {
            EMPTY_UNFILTERED_MESSAGE
        }
    }

    fn normalized_query(&self) -> Option<String> {
        normalize(self.query.as_deref())
    }

    fn normalized_education(&self) -> Option<String> {
        normalize(self.education.as_deref())
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn search_haystack(user: &UserRecord) -> String {
    format!(
        "{} {} {} {} {}",
        user.first_name,
        user.last_name,
        user.mobile,
        user.address,
        user.interests.join(" ")
    )
    .to_lowercase()
}
