//! Revenue allocation and distribution engine for a collecting society.
//!
//! This crate splits the licence fees collected from paying parties across
//! the artists of the creations those parties used, and produces the
//! distribution, allocation and journal records for each run.

#![warn(missing_docs)]

pub mod allocation;
pub mod api;
pub mod config;
pub mod distribution;
pub mod error;
pub mod models;
pub mod rounding;
