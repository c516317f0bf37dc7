//! Roster records and the raw payload shapes they arrive in.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Text field that reads `null` or a non-string value as empty.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        _ => Ok(String::new()),
    }
}

/// Optional field that reads a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Option<T>>(value).ok().flatten())
}

/// One person in the roster. `username` is the subject identifier that
/// ratings and comments attach to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub username: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub job_title: String,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub department_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_manager: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub direct_reports: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
}

impl Record {
    pub fn new(username: impl Into<String>, full_name: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            job_title: job_title.into(),
            department_name: None,
            level: None,
            is_manager: None,
            direct_reports: None,
            photo_url: None,
        }
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department_name = Some(department.into());
        self
    }
}

/// A roster payload as served by a source: either a category bundle
/// (`{ "employees": [...] }`) or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RosterPayload {
    Bundle { employees: Vec<Value> },
    List(Vec<Value>),
}

impl RosterPayload {
    fn into_entries(self) -> Vec<Value> {
        match self {
            RosterPayload::Bundle { employees } => employees,
            RosterPayload::List(entries) => entries,
        }
    }

    /// Map raw entries into records. Unknown fields are dropped; absent,
    /// `null` or mistyped optionals are defaulted. Only entries without a
    /// usable `username` are skipped and counted.
    pub fn into_records(self) -> (Vec<Record>, usize) {
        let mut skipped = 0;
        let records = self
            .into_entries()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Record>(entry) {
                Ok(record) if !record.username.trim().is_empty() => Some(record),
                _ => {
                    skipped += 1;
                    None
                }
            })
            .collect();
        (records, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_and_bare_array_both_parse() {
        let bundle: RosterPayload = serde_json::from_str(
            r#"{"category":"vp","total_count":1,"employees":[{"username":"ann","full_name":"Ann","job_title":"VP"}]}"#,
        )
        .unwrap();
        let list: RosterPayload =
            serde_json::from_str(r#"[{"username":"bob","full_name":"Bob","job_title":"SDE"}]"#).unwrap();

        let (bundle_records, _) = bundle.into_records();
        let (list_records, _) = list.into_records();
        assert_eq!(bundle_records[0].username, "ann");
        assert_eq!(list_records[0].username, "bob");
    }

    #[test]
    fn mapping_drops_unknown_fields_and_skips_invalid_entries() {
        let payload: RosterPayload = serde_json::from_str(
            r#"[
                {"username":"ann","job_title":"Director","level":3,"badge_color":"red"},
                {"full_name":"No Username"},
                {"username":"cy"}
            ]"#,
        )
        .unwrap();

        let (records, skipped) = payload.into_records();
        assert_eq!(skipped, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Some(3));
        assert_eq!(records[1].job_title, "");
        assert_eq!(records[1].department_name, None);

        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("badge_color").is_none());
    }

    #[test]
    fn null_and_mistyped_fields_default_instead_of_dropping_the_entry() {
        let payload: RosterPayload = serde_json::from_str(
            r#"[
                {"username":"a","full_name":"A","job_title":null,"level":5},
                {"username":"b","full_name":null,"job_title":"SDE","level":"5"},
                {"username":"c","full_name":"C","job_title":"VP","department_name":7,"is_manager":null},
                {"username":"  ","full_name":"Blank"},
                {"username":null,"full_name":"Null"}
            ]"#,
        )
        .unwrap();

        let (records, skipped) = payload.into_records();
        assert_eq!(skipped, 2);
        let usernames: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(usernames, vec!["a", "b", "c"]);

        assert_eq!(records[0].job_title, "");
        assert_eq!(records[0].level, Some(5));
        assert_eq!(records[1].full_name, "");
        assert_eq!(records[1].level, None);
        assert_eq!(records[2].department_name, None);
        assert_eq!(records[2].is_manager, None);
    }
}
