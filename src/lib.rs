//! Failure exemption and reporting for file formatting pipelines.
//!
//! A [`format_group::FormatGroup`] applies ordered [`step::Step`]s to ordered
//! [`target::Target`]s. Step failures are captured, matched against the
//! group's [`exemption::ExemptionPolicy`], collected into a
//! [`report::GroupReport`], rendered by [`report::ReportFormatter`] and
//! reduced to a [`task::TaskState`] by [`task::TaskOutcomeAggregator`].

#[macro_use]
extern crate log;

pub use error::{Error, Result};

pub mod cli;
pub mod config;
mod diff;
pub mod env;
mod error;
pub mod exemption;
pub mod files;
pub mod format_group;
pub mod glob;
mod group_options;
mod logger;
pub mod report;
pub mod step;
pub mod target;
pub mod task;
mod trace;
