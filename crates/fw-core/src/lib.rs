//! # fw-core
//!
//! Core types and error types for flightwatch.
//!
//! This crate provides the foundational types shared across all flightwatch crates:
//! - Tracked entity snapshots (reports and report phases) and the `TrackedEntity` trait
//! - Status enums with lifecycle transitions and terminal markers
//! - SLA budget tables, override maps, and the fixed severity thresholds
//! - Cross-cutting error types
//! - Evaluation, scan statistics, report, and alert payload types

pub mod alert;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
pub mod sla;
