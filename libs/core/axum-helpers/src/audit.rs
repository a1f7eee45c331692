//! Audit logging for security-relevant events.
//!
//! Events are emitted on the `audit` tracing target so the logging backend can
//! route them separately.
//!
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new(Some(user.email.clone()), "review.delete", Some(format!("review:{id}")), AuditOutcome::Success)
//!     .with_ip(extract_ip_from_headers(&headers))
//!     .log();
//! ```

use crate::auth::AuthEvent;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    /// Caller was authenticated but not allowed
    Denied,
}

/// Structured audit record; build with the `with_*` methods, then `.log()`.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Actor, if known
    pub user_id: Option<String>,
    /// e.g. "auth.sign_in", "review.update"
    pub action: String,
    /// e.g. "product:42"
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Emit on the `audit` target.
    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id,
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            timestamp = %self.timestamp,
            details = ?self.details,
            "audit event"
        );
    }
}

impl From<&AuthEvent> for AuditEvent {
    fn from(event: &AuthEvent) -> Self {
        match event {
            AuthEvent::SignedIn { user, ip } => AuditEvent::new(
                Some(user.subject_id.clone()),
                "auth.sign_in",
                None,
                AuditOutcome::Success,
            )
            .with_ip(ip.clone())
            .with_details(serde_json::json!({ "email": user.email })),
            AuthEvent::Rejected { reason, ip } => {
                AuditEvent::new(None, "auth.sign_in", None, AuditOutcome::Failure)
                    .with_ip(ip.clone())
                    .with_details(serde_json::json!({ "reason": reason }))
            }
        }
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));
        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.0.0.1"));

        headers.remove("x-forwarded-for");
        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.9.9.9"));
    }

    #[test]
    fn test_auth_events_map_to_audit_records() {
        let signed_in = AuthEvent::SignedIn {
            user: AuthUser {
                subject_id: "uid-1".into(),
                email: "ada@example.com".into(),
            },
            ip: Some("10.0.0.1".into()),
        };
        let audit = AuditEvent::from(&signed_in);
        assert_eq!(audit.user_id.as_deref(), Some("uid-1"));
        assert_eq!(audit.outcome, AuditOutcome::Success);
        assert_eq!(audit.ip_address.as_deref(), Some("10.0.0.1"));

        let rejected = AuthEvent::Rejected {
            reason: "Token has expired".into(),
            ip: None,
        };
        let audit = AuditEvent::from(&rejected);
        assert_eq!(audit.outcome, AuditOutcome::Failure);
        assert_eq!(audit.details.unwrap()["reason"], "Token has expired");
    }
}
