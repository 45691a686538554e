//! Pay-rate change notifications: a BambooHR compensation webhook becomes a
//! Slack message comparing the new rate with the one it replaced.

pub mod domain;
pub mod history;
pub mod message;
pub mod router;
pub mod service;

pub use domain::{ChangedEmployee, CompensationChange, CompensationWebhook};
pub use history::{previous_pay_rate, CompensationRecord};
pub use message::{build_notice, ChangeKind, NoticeMetadata, PayRateNotice};
pub use router::compensation_router;
pub use service::{NoticeDelivery, PayRateNotifier};

#[derive(Debug, thiserror::Error)]
pub enum CompensationError {
    #[error("invalid compensation webhook: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("compensation webhook lists no employees")]
    NoEmployees,
    #[error("compensation webhook entry has no employee id")]
    MissingEmployeeId,
}
