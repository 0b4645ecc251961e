//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules of the composter: scheduler
//! orchestration, settings mutation, history and telemetry. All interaction
//! with hardware and storage happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
