//! User record domain model.
//!
//! # Responsibility
//! - Define the canonical person record persisted in the collection.
//! - Define the creation payload and the typed partial-update patch.
//!
//! # Invariants
//! - `id` is assigned by the repository and never rewritten afterwards.
//! - `availability_date` is persisted in canonical `DD-MM-YYYY` form.
//! - `UserPatch` carries no `id`, so merging can never change identity.

use serde::{Deserialize, Serialize};

/// Repository-assigned record identifier.
///
/// Derived from an epoch-millisecond clock reading at creation time.
pub type UserId = i64;

/// Canonical persisted person record.
///
/// Serialized with camelCase keys to keep the stored JSON shape stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub education: String,
    /// Ordered tags; duplicates are not rejected at this layer.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Canonical `DD-MM-YYYY` date.
    #[serde(default)]
    pub availability_date: String,
}

impl UserRecord {
    /// Builds a record from creation fields and an assigned id.
    pub fn from_new(id: UserId, fields: NewUser) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            mobile: fields.mobile,
            address: fields.address,
            age: fields.age,
            gender: fields.gender,
            education: fields.education,
            interests: fields.interests,
            availability_date: fields.availability_date,
        }
    }

    /// Merges every `Some` field of `patch` over this record.
    ///
    /// Fields left as `None` keep their current values. `id` is untouched.
    pub fn apply_patch(&mut self, patch: &UserPatch) {
        merge_field(&mut self.first_name, &patch.first_name);
        merge_field(&mut self.last_name, &patch.last_name);
        merge_field(&mut self.mobile, &patch.mobile);
        merge_field(&mut self.address, &patch.address);
        merge_field(&mut self.age, &patch.age);
        merge_field(&mut self.gender, &patch.gender);
        merge_field(&mut self.education, &patch.education);
        merge_field(&mut self.interests, &patch.interests);
        merge_field(&mut self.availability_date, &patch.availability_date);
    }

    /// Full display name, `first last`, trimmed when one side is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Creation payload: every record field except `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub address: String,
    pub age: u32,
    pub gender: String,
    pub education: String,
    pub interests: Vec<String>,
    pub availability_date: String,
}

/// Partial update for an existing record.
///
/// `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub interests: Option<Vec<String>>,
    pub availability_date: Option<String>,
}

impl UserPatch {
    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<NewUser> for UserPatch {
    /// Full replacement of every non-id field, as an edit form submits it.
    fn from(value: NewUser) -> Self {
        Self {
            first_name: Some(value.first_name),
            last_name: Some(value.last_name),
            mobile: Some(value.mobile),
            address: Some(value.address),
            age: Some(value.age),
            gender: Some(value.gender),
            education: Some(value.education),
            interests: Some(value.interests),
            availability_date: Some(value.availability_date),
        }
    }
}

fn merge_field<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, UserPatch, UserRecord};

    fn sample() -> UserRecord {
        UserRecord::from_new(
            7,
            NewUser {
                first_name: "Ann".to_string(),
                last_name: "Smith".to_string(),
                age: 30,
                interests: vec!["Music".to_string()],
                availability_date: "15-03-2030".to_string(),
                ..NewUser::default()
            },
        )
    }

    #[test]
    fn apply_patch_only_touches_specified_fields() {
        let mut record = sample();
        record.apply_patch(&UserPatch {
            last_name: Some("Lee".to_string()),
            age: Some(31),
            ..UserPatch::default()
        });

        assert_eq!(record.id, 7);
        assert_eq!(record.first_name, "Ann");
        assert_eq!(record.last_name, "Lee");
        assert_eq!(record.age, 31);
        assert_eq!(record.interests, vec!["Music".to_string()]);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).expect("record should serialize");
        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["availabilityDate"], "15-03-2030");
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn missing_optional_fields_deserialize_to_defaults() {
        let record: UserRecord =
            serde_json::from_str(r#"{"id":1,"firstName":"Bo"}"#).expect("partial record parses");
        assert_eq!(record.first_name, "Bo");
        assert!(record.interests.is_empty());
        assert_eq!(record.age, 0);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        assert!(!UserPatch::from(NewUser::default()).is_empty());
    }
}
