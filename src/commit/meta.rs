use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Name of the metadata file stored alongside each commit's files.
pub const COMMIT_META_FILE: &str = "commit.json";

/// Metadata persisted as `commit.json` inside each commit directory.
///
/// Serialized as compact JSON with `message` before `date`, e.g.
/// `{"message":"first","date":"2024-05-01T09:30:00.125Z"}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommitMeta {
    pub message: String,

    #[serde(with = "iso8601_millis")]
    pub date: DateTime<Utc>,
}

impl CommitMeta {
    /// Create metadata stamped with the current time.
    ///
    /// The timestamp is truncated to milliseconds, the precision of the
    /// persisted form, so a freshly created value equals its round trip.
    pub fn now<S: Into<String>>(message: S) -> CommitMeta {
        CommitMeta {
            message: message.into(),
            date: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<CommitMeta> {
        serde_json::from_slice(bytes)
    }

    /// The commit date in its persisted text form.
    pub fn date_string(&self) -> String {
        iso8601_millis::format(&self.date)
    }
}

mod iso8601_millis {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub(crate) fn format(date: &DateTime<Utc>) -> String {
        date.format(FORMAT).to_string()
    }

    pub(super) fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn persisted_form() {
        let meta = CommitMeta {
            message: "first".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
                + chrono::Duration::milliseconds(125),
        };

        let json = meta.to_json().unwrap();
        assert_eq!(
            std::str::from_utf8(&json).unwrap(),
            r#"{"message":"first","date":"2024-05-01T09:30:00.125Z"}"#
        );

        assert_eq!(CommitMeta::from_json(&json).unwrap(), meta);
    }

    #[test]
    fn fresh_meta_round_trips_exactly() {
        let meta = CommitMeta::now("with \"quotes\" and\nnewlines");
        let json = meta.to_json().unwrap();
        assert_eq!(CommitMeta::from_json(&json).unwrap(), meta);
    }

    #[test]
    fn empty_message_is_allowed() {
        let meta = CommitMeta::now("");
        let back = CommitMeta::from_json(&meta.to_json().unwrap()).unwrap();
        assert_eq!(back.message, "");
    }

    #[test]
    fn reads_javascript_iso_strings() {
        let json = br#"{"message":"m","date":"2023-11-14T22:13:20.000Z"}"#;
        let meta = CommitMeta::from_json(json).unwrap();
        assert_eq!(meta.date_string(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn rejects_bad_date() {
        let json = br#"{"message":"m","date":"yesterday"}"#;
        assert!(CommitMeta::from_json(json).is_err());
    }

    #[test]
    fn rejects_missing_message() {
        let json = br#"{"date":"2023-11-14T22:13:20.000Z"}"#;
        assert!(CommitMeta::from_json(json).is_err());
    }
}
