//! Goods classification review for export licence cases.
//!
//! Caseworkers assess each product line of an application against the control list,
//! and the outcome is folded back into the shared catalog good. Legacy free-text
//! report summaries can be mapped onto the structured prefix/subject taxonomy in bulk.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
