//! Flight-Crew Rest Requirement Engine
//!
//! This crate computes the minimum rest a crew member needs between two
//! duties under the EASA and operator (OMA) flight-time-limitation rules,
//! and checks the rest actually scheduled against it.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
