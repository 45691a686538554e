//! Glue between TeamTailor (applicant tracking), BambooHR (HR records) and
//! Notion (workspace pages).
//!
//! The centrepiece is [`workflows::hiring`], which turns a "Hired" webhook
//! from the ATS into a BambooHR employee with its documents attached.

pub mod config;
pub mod error;
pub mod integrations;
pub mod telemetry;
pub mod workflows;
