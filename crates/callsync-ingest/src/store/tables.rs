//! Column mappings of the report tables; must agree with `migrations/`

use super::{Column, ColumnKind::*, Table};

pub const CALLS_TABLE: Table = Table {
    name: "calls",
    columns: &[
        Column::new("id", BigInt),
        Column::new("communication_id", BigInt),
        Column::new("start_time", Timestamp),
        Column::new("finish_time", Timestamp),
        Column::new("finish_reason", Text),
        Column::new("direction", Text),
        Column::new("is_lost", Boolean),
        Column::new("virtual_phone_number", Text),
        Column::new("contact_phone_number", Text),
        Column::new("first_answered_employee_id", BigInt),
        Column::new("first_answered_employee_full_name", Text),
        Column::new("first_talked_employee_id", BigInt),
        Column::new("first_talked_employee_full_name", Text),
        Column::new("last_answered_employee_id", BigInt),
        Column::new("last_answered_employee_full_name", Text),
        Column::new("scenario_id", BigInt),
        Column::new("scenario_name", Text),
        Column::new("source", Text),
    ],
};

pub const CALL_LEGS_TABLE: Table = Table {
    name: "call_legs",
    columns: &[
        Column::new("id", BigInt),
        Column::new("call_session_id", BigInt),
        Column::new("start_time", Timestamp),
        Column::new("connect_time", Timestamp),
        Column::new("duration", Interval),
        Column::new("total_duration", Interval),
        Column::new("finish_reason", Text),
        Column::new("finish_reason_description", Text),
        Column::new("virtual_phone_number", Text),
        Column::new("calling_phone_number", Text),
        Column::new("called_phone_number", Text),
        Column::new("direction", Text),
        Column::new("is_transfered", Boolean),
        Column::new("is_operator", Boolean),
        Column::new("is_coach", Boolean),
        Column::new("is_failed", Boolean),
        Column::new("is_talked", Boolean),
        Column::new("employee_id", BigInt),
        Column::new("employee_full_name", Text),
        Column::new("employee_phone_number", Text),
        Column::new("scenario_id", BigInt),
        Column::new("scenario_name", Text),
        Column::new("release_cause_code", BigInt),
        Column::new("release_cause_description", Text),
        Column::new("contact_id", BigInt),
        Column::new("contact_full_name", Text),
        Column::new("contact_phone_number", Text),
        Column::new("action_id", BigInt),
        Column::new("action_name", Text),
        Column::new("group_id", BigInt),
        Column::new("group_name", Text),
    ],
};
