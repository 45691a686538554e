//! Notion hiring request pages pushed to TeamTailor as requisitions.

pub mod draft;
pub mod payload;
pub mod service;

pub use draft::RequisitionDraft;
pub use payload::{iso_country, requisition_payload};
pub use service::{PreparedRequisition, RequisitionError, RequisitionSync, SyncOutcome};
