//! Field catalogs for the data API reports
//!
//! A catalog is the ordered set of field names requested from a report and
//! then required in every returned row. Catalogs are assembled once from the
//! field groups below and never change afterwards.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// One response field identifier
///
/// The name doubles as a typing hint: `*time` fields carry timestamps and
/// `*duration` fields carry second counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Field(&'static str);

impl Field {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_time(&self) -> bool {
        self.0.ends_with("time")
    }

    pub fn is_duration(&self) -> bool {
        self.0.ends_with("duration")
    }
}

impl std::borrow::Borrow<str> for Field {
    fn borrow(&self) -> &str {
        self.0
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Ordered, duplicate-free list of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<Field>,
}

impl FieldCatalog {
    pub fn builder() -> FieldCatalogBuilder {
        FieldCatalogBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.as_str() == name)
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }
}

/// Builds a [`FieldCatalog`]; a repeated name keeps its first position
#[derive(Debug, Default)]
pub struct FieldCatalogBuilder {
    fields: Vec<Field>,
    seen: HashSet<&'static str>,
}

impl FieldCatalogBuilder {
    pub fn field(mut self, name: &'static str) -> Self {
        if self.seen.insert(name) {
            self.fields.push(Field::new(name));
        }
        self
    }

    pub fn group(self, names: &[&'static str]) -> Self {
        names.iter().copied().fold(self, |builder, name| builder.field(name))
    }

    pub fn build(self) -> FieldCatalog {
        FieldCatalog {
            fields: self.fields,
        }
    }
}

// ============================================================================
// Calls report field groups
// ============================================================================

/// Core call parameters
pub const CALLS_PARAMETERS: &[&str] = &[
    "id",
    "start_time",
    "finish_time",
    "finish_reason",
    "direction",
    "cpn_region_id",
    "cpn_region_name",
];

/// Scenario operations and communication details
pub const CALLS_SCENARIO_OPERATIONS: &[&str] = &[
    "scenario_operations",
    "id",
    "name",
    "source",
    "is_lost",
    "communication_number",
    "communication_page_url",
    "contact_phone_number",
    "communication_id",
    "communication_type",
    "wait_duration",
    "total_wait_duration",
    "lost_call_processing_duration",
    "talk_duration",
    "clean_talk_duration",
    "total_duration",
    "postprocess_duration",
    "call_records",
    "wav_call_records",
    "full_record_file_link",
    "voice_mail_records",
    "virtual_phone_number",
    "ua_client_id",
    "ym_client_id",
    "sale_date",
    "sale_cost",
    "is_transfer",
    "search_query",
    "search_engine",
    "referrer_domain",
    "referrer",
    "entrance_page",
    "gclid",
    "yclid",
    "ymclid",
    "ef_id",
    "channel",
];

/// Attached tags
pub const CALLS_TAGS: &[&str] = &[
    "tags",
    "tag_name",
    "tag_id",
    "tag_change_time",
    "tag_type",
    "tag_user_id",
    "tag_user_login",
    "tag_employee_id",
    "tag_employee_full_name",
];

/// Employees that took part in the call
pub const CALLS_EMPLOYEES: &[&str] = &[
    "employees",
    "employee_id",
    "employee_full_name",
    "is_answered",
    "is_talked",
];

pub const CALLS_LAST_ANSWERED_EMPLOYEE: &[&str] = &[
    "last_answered_employee_id",
    "last_answered_employee_full_name",
    "last_answered_employee_rating",
];

pub const CALLS_FIRST_ANSWERED_EMPLOYEE: &[&str] =
    &["first_answered_employee_id", "first_answered_employee_full_name"];

pub const CALLS_FIRST_TALKED_EMPLOYEE: &[&str] =
    &["first_talked_employee_id", "first_talked_employee_full_name"];

pub const CALLS_SCENARIO: &[&str] = &["scenario_name", "scenario_id"];

pub const CALLS_SITE: &[&str] = &["site_domain_name", "site_id"];

pub const CALLS_CAMPAIGN: &[&str] = &["campaign_name", "campaign_id", "visit_other_campaign"];

pub const CALLS_VISITOR: &[&str] = &[
    "visitor_id",
    "person_id",
    "visitor_type",
    "visitor_session_id",
    "visits_count",
    "visitor_first_campaign_id",
    "visitor_first_campaign_name",
    "visitor_city",
    "visitor_region",
    "visitor_country",
    "visitor_device",
];

pub const CALLS_VISITOR_PROPERTIES: &[&str] =
    &["visitor_custom_properties", "property_name", "property_value"];

pub const CALLS_SEGMENTS: &[&str] = &["segments", "segment_id", "segment_name"];

pub const CALLS_CALL_API: &[&str] = &["call_api_request_id", "call_api_external_id"];

/// Address book contact
pub const CALLS_CONTACT: &[&str] = &["contact_id", "contact_full_name"];

pub const CALLS_UTM: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_term",
    "utm_content",
    "utm_campaign",
];

pub const CALLS_OPENSTAT: &[&str] = &[
    "openstat_ad",
    "openstat_campaign",
    "openstat_service",
    "openstat_source",
];

pub const CALLS_ATTRIBUTES: &[&str] = &["attributes"];

pub const CALLS_EXTENDED_UTM: &[&str] = &[
    "eq_utm_source",
    "eq_utm_medium",
    "eq_utm_term",
    "eq_utm_content",
    "eq_utm_campaign",
    "eq_utm_referrer",
    "eq_utm_expid",
];

/// Extra call fields the sync needs for persistence and media lookup.
///
/// `wav_call_records` is always empty and `full_record_file_link` points at a
/// merged recording, so neither is requested.
pub const CALLS_SYNC_EXTRAS: &[&str] = &[
    "communication_id",
    "call_records",
    "voice_mail_records",
    "virtual_phone_number",
    "source",
    "is_lost",
    "contact_phone_number",
];

// ============================================================================
// Call legs report field groups
// ============================================================================

pub const CALL_LEGS_PARAMETERS: &[&str] = &[
    "id",
    "call_session_id",
    "call_records",
    "wav_call_records",
    "start_time",
    "connect_time",
    "duration",
    "total_duration",
    "finish_reason",
    "finish_reason_description",
    "virtual_phone_number",
    "calling_phone_number",
    "called_phone_number",
    "direction",
    "is_transfered",
    "is_operator",
    "employee_id",
    "employee_full_name",
    "employee_phone_number",
    "employee_rating",
    "scenario_id",
    "scenario_name",
    "is_coach",
    "release_cause_code",
    "release_cause_description",
    "is_failed",
    "is_talked",
    "contact_id",
    "contact_full_name",
    "contact_phone_number",
    "action_id",
    "action_name",
    "group_id",
    "group_name",
];

static CALLS_CATALOG: LazyLock<FieldCatalog> = LazyLock::new(|| {
    FieldCatalog::builder()
        .group(CALLS_PARAMETERS)
        .group(CALLS_FIRST_ANSWERED_EMPLOYEE)
        .group(CALLS_LAST_ANSWERED_EMPLOYEE)
        .group(CALLS_SCENARIO)
        .group(CALLS_FIRST_TALKED_EMPLOYEE)
        .group(CALLS_SYNC_EXTRAS)
        .build()
});

static CALL_LEGS_CATALOG: LazyLock<FieldCatalog> =
    LazyLock::new(|| FieldCatalog::builder().group(CALL_LEGS_PARAMETERS).build());

/// Fields requested from `get.calls_report`
pub fn calls_catalog() -> &'static FieldCatalog {
    &CALLS_CATALOG
}

/// Fields requested from `get.call_legs_report`
pub fn call_legs_catalog() -> &'static FieldCatalog {
    &CALL_LEGS_CATALOG
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_first_occurrence() {
        let catalog = FieldCatalog::builder()
            .group(&["id", "name"])
            .group(&["source", "id", "name"])
            .build();

        let names: Vec<_> = catalog.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "source"]);
    }

    #[test]
    fn test_scenario_operations_group_dedupes_against_parameters() {
        let catalog = FieldCatalog::builder()
            .group(CALLS_PARAMETERS)
            .group(CALLS_SCENARIO_OPERATIONS)
            .build();
        assert_eq!(catalog.iter().filter(|f| f.as_str() == "id").count(), 1);
        assert_eq!(catalog.as_slice()[0].as_str(), "id");
    }

    #[test]
    fn test_suffix_hints() {
        assert!(Field::new("start_time").is_time());
        assert!(Field::new("total_duration").is_duration());
        assert!(!Field::new("comment").is_time());
        assert!(!Field::new("duration_seconds").is_duration());
    }

    #[test]
    fn test_calls_catalog_order_and_content() {
        let catalog = calls_catalog();
        let names: Vec<_> = catalog.iter().map(|f| f.as_str()).collect();

        assert_eq!(&names[..CALLS_PARAMETERS.len()], CALLS_PARAMETERS);
        assert_eq!(names.last(), Some(&"contact_phone_number"));
        for required in ["communication_id", "call_records", "voice_mail_records", "scenario_id"] {
            assert!(catalog.contains(required), "missing {required}");
        }
        assert!(!catalog.contains("wav_call_records"));
    }

    #[test]
    fn test_call_legs_catalog_matches_group() {
        let catalog = call_legs_catalog();
        assert_eq!(catalog.len(), CALL_LEGS_PARAMETERS.len());
        assert!(catalog.contains("total_duration"));
    }

    #[test]
    fn test_field_serializes_as_plain_string() {
        let json = serde_json::to_value(calls_catalog().as_slice()).unwrap();
        assert_eq!(json[0], "id");
    }
}
