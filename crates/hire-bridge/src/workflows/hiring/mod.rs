//! Hire-to-employee provisioning: a TeamTailor "Hired" webhook becomes a
//! BambooHR employee with the candidate's documents attached.
//!
//! Requisition lookup, list-field loading and employee creation abort a run.
//! Every other step degrades to a [`StepWarning`] on the report.

pub mod domain;
pub mod payload;
pub mod picklist;
pub mod router;
pub mod salary;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateSnapshot, EmployeeSummary, HireEvent, ProvisioningReport, ProvisioningStep,
    StepWarning, UploadedFile,
};
pub use picklist::{PicklistField, PicklistOption};
pub use router::hiring_router;
pub use service::{HireProvisioningService, ProvisioningError, ProvisioningSettings};
