//! Data API client
//!
//! The data API is a JSON-RPC 2.0 service. [`RpcTransport`] is the seam
//! between the sync pipeline and the wire: [`HttpTransport`] talks to the real
//! endpoint, tests substitute their own implementation.

pub mod filter;
pub mod http;

pub use filter::{Filter, FilterCondition};
pub use http::HttpTransport;

use crate::catalog::FieldCatalog;
use async_trait::async_trait;
use callsync_common::time::format_datetime;
use chrono::NaiveDateTime;
use serde_json::json;
use thiserror::Error;

/// Method names used by the sync
pub mod methods {
    pub const GET_ACCOUNT: &str = "get.account";
    pub const GET_CALLS_REPORT: &str = "get.calls_report";
    pub const GET_CALL_LEGS_REPORT: &str = "get.call_legs_report";
    pub const GET_EMPLOYEE_STAT: &str = "get.employee_stat";
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("remote error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
}

/// Generic remote procedure call
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Call `method` and return its `result` member
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;
}

/// Known data API endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Uiscom,
    Comagic,
    Custom(String),
}

impl Target {
    pub fn url(&self) -> &str {
        match self {
            Target::Uiscom => "https://dataapi.uiscom.ru/v2.0",
            Target::Comagic => "https://dataapi.comagic.ru/v2.0",
            Target::Custom(url) => url,
        }
    }
}

impl std::str::FromStr for Target {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "uiscom" => Target::Uiscom,
            "comagic" => Target::Comagic,
            _ => Target::Custom(s.to_string()),
        })
    }
}

/// Parameters of one bounded report request
#[derive(Debug, Clone, Copy)]
pub struct ReportQuery<'a> {
    pub date_from: NaiveDateTime,
    pub date_till: NaiveDateTime,
    pub limit: u32,
    pub offset: u32,
    pub fields: &'a FieldCatalog,
    /// Report on behalf of another user of the account
    pub user_id: Option<u64>,
    pub filter: Option<&'a Filter>,
}

impl<'a> ReportQuery<'a> {
    /// First `limit` rows of `[date_from, date_till)` with `fields`
    pub fn new(
        date_from: NaiveDateTime,
        date_till: NaiveDateTime,
        limit: u32,
        fields: &'a FieldCatalog,
    ) -> Self {
        Self {
            date_from,
            date_till,
            limit,
            offset: 0,
            fields,
            user_id: None,
            filter: None,
        }
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_filter(mut self, filter: &'a Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    fn params(&self, access_token: &str) -> serde_json::Value {
        let mut params = json!({
            "access_token": access_token,
            "date_from": format_datetime(self.date_from),
            "date_till": format_datetime(self.date_till),
            "limit": self.limit,
            "offset": self.offset,
            "fields": self.fields.as_slice(),
        });
        if let Some(user_id) = self.user_id {
            params["user_id"] = json!(user_id);
        }
        if let Some(filter) = self.filter {
            params["filter"] = json!(filter);
        }
        params
    }
}

/// Data API client that forwards a static access token
pub struct DataApiClient<T = HttpTransport> {
    transport: T,
    access_token: String,
}

impl<T: RpcTransport> DataApiClient<T> {
    pub fn new(transport: T, access_token: impl Into<String>) -> Self {
        Self {
            transport,
            access_token: access_token.into(),
        }
    }

    /// Account the token belongs to; useful to check a token before syncing
    pub async fn get_account(&self) -> Result<serde_json::Value, RpcError> {
        self.transport
            .call(methods::GET_ACCOUNT, json!({ "access_token": self.access_token }))
            .await
    }

    pub async fn get_calls_report(
        &self,
        query: ReportQuery<'_>,
    ) -> Result<serde_json::Value, RpcError> {
        self.report(methods::GET_CALLS_REPORT, query).await
    }

    pub async fn get_call_legs_report(
        &self,
        query: ReportQuery<'_>,
    ) -> Result<serde_json::Value, RpcError> {
        self.report(methods::GET_CALL_LEGS_REPORT, query).await
    }

    /// Employee status statistics; `only_default_statuses` drops custom statuses
    pub async fn get_employee_stat(
        &self,
        query: ReportQuery<'_>,
        only_default_statuses: bool,
    ) -> Result<serde_json::Value, RpcError> {
        let mut params = query.params(&self.access_token);
        params["only_default_statuses_in_stats"] = json!(only_default_statuses);
        self.transport.call(methods::GET_EMPLOYEE_STAT, params).await
    }

    /// Issue a report request for any report method
    pub async fn report(
        &self,
        method: &str,
        query: ReportQuery<'_>,
    ) -> Result<serde_json::Value, RpcError> {
        let params = query.params(&self.access_token);

        tracing::debug!(
            method,
            fields = query.fields.len(),
            limit = query.limit,
            "Requesting report"
        );

        self.transport.call(method, params).await
    }
}
