//! Recording URL and folder derivation

use super::{MediaConfig, MediaError};
use crate::record::{TypedRecord, Value};
use chrono::Datelike;
use std::path::PathBuf;
use url::Url;

/// Recordings of one call and the folder they belong in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPlan {
    pub folder: PathBuf,
    pub urls: Vec<Url>,
}

pub struct MediaLocator {
    config: MediaConfig,
}

impl MediaLocator {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Talk recordings take precedence over voicemail; `None` when the call
    /// has neither.
    pub fn locate(&self, record: &TypedRecord) -> Result<Option<MediaPlan>, MediaError> {
        let talk = tokens(record, "call_records")?;
        let voicemail = tokens(record, "voice_mail_records")?;

        let (base, tokens, prefix) = if !talk.is_empty() {
            let outbound = record.string("direction") == Some("out");
            (&self.config.talk_base_url, talk, if outbound { "out_" } else { "" })
        } else if !voicemail.is_empty() {
            (&self.config.voicemail_base_url, voicemail, "vm_")
        } else {
            return Ok(None);
        };

        let communication_id = record.integer("communication_id").ok_or_else(|| MediaError::Record {
            field: "communication_id",
            reason: "expected an integer".to_string(),
        })?;
        let started = record.timestamp("start_time").ok_or_else(|| MediaError::Record {
            field: "start_time",
            reason: "expected a timestamp".to_string(),
        })?;

        let urls = tokens
            .iter()
            .map(|token| recording_url(base, communication_id, token))
            .collect::<Result<Vec<_>, _>>()?;

        let folder = self
            .config
            .root
            .join(format!("{:04}", started.year()))
            .join(format!("{:02}", started.month()))
            .join(format!("{:02}", started.day()))
            .join(format!("{prefix}{communication_id}"));

        Ok(Some(MediaPlan { folder, urls }))
    }
}

/// `<base>/<communication_id>/<token>/`
fn recording_url(base: &Url, communication_id: i64, token: &str) -> Result<Url, MediaError> {
    let joined = format!(
        "{}/{}/{}/",
        base.as_str().trim_end_matches('/'),
        communication_id,
        urlencoding::encode(token)
    );
    Ok(Url::parse(&joined)?)
}

/// Recording tokens stored under `field`; null counts as none
fn tokens(record: &TypedRecord, field: &'static str) -> Result<Vec<String>, MediaError> {
    let items = match record.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Opaque(serde_json::Value::Array(items))) => items,
        Some(other) => {
            return Err(MediaError::Record {
                field,
                reason: format!("expected an array, got {}", other.kind()),
            })
        },
    };

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| MediaError::Record {
                field,
                reason: format!("expected string tokens, got {item}"),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::FieldCatalog;
    use crate::transform::transform;
    use serde_json::json;
    use std::path::Path;

    fn locator() -> MediaLocator {
        MediaLocator::new(MediaConfig::new("/media").unwrap())
    }

    fn call(direction: &str, talk: serde_json::Value, voicemail: serde_json::Value) -> TypedRecord {
        let catalog = FieldCatalog::builder()
            .group(&[
                "id",
                "communication_id",
                "start_time",
                "direction",
                "call_records",
                "voice_mail_records",
            ])
            .build();
        let row = json!({
            "id": 1,
            "communication_id": 42,
            "start_time": "2024-03-01 10:00:00",
            "direction": direction,
            "call_records": talk,
            "voice_mail_records": voicemail,
        });
        transform(&catalog, &row).unwrap()
    }

    #[test]
    fn test_inbound_talk_recording() {
        let plan = locator().locate(&call("in", json!(["abc"]), json!([]))).unwrap().unwrap();

        assert!(plan.folder.ends_with(Path::new("2024/03/01/42")));
        assert_eq!(plan.folder, Path::new("/media/2024/03/01/42"));
        assert_eq!(
            plan.urls,
            vec![Url::parse("https://app.uiscom.ru/system/media/talk/42/abc/").unwrap()]
        );
    }

    #[test]
    fn test_outbound_talk_recording_is_prefixed() {
        let plan = locator()
            .locate(&call("out", json!(["abc", "def"]), json!([])))
            .unwrap()
            .unwrap();

        assert!(plan.folder.ends_with(Path::new("2024/03/01/out_42")));
        assert_eq!(plan.urls.len(), 2);
        assert!(plan.urls[1].as_str().ends_with("/talk/42/def/"));
    }

    #[test]
    fn test_voicemail_used_when_no_talk() {
        let plan = locator().locate(&call("in", json!([]), json!(["vm1"]))).unwrap().unwrap();

        assert!(plan.folder.ends_with(Path::new("2024/03/01/vm_42")));
        assert!(plan.urls[0].as_str().ends_with("/voice_mail/42/vm1/"));
    }

    #[test]
    fn test_talk_wins_over_voicemail() {
        let plan = locator()
            .locate(&call("in", json!(["abc"]), json!(["vm1"])))
            .unwrap()
            .unwrap();
        assert_eq!(plan.urls.len(), 1);
        assert!(plan.urls[0].as_str().contains("/talk/"));
    }

    #[test]
    fn test_no_recordings() {
        assert!(locator().locate(&call("in", json!([]), json!([]))).unwrap().is_none());
        assert!(locator().locate(&call("in", json!(null), json!(null))).unwrap().is_none());
    }

    #[test]
    fn test_non_string_token_is_an_error() {
        let err = locator().locate(&call("in", json!([1]), json!([]))).unwrap_err();
        assert!(matches!(err, MediaError::Record { field: "call_records", .. }));
    }
}
