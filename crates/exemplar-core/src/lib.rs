//! Core library for the exemplar toolkit.
//!
//! Turns a registry of example contracts into standalone, runnable projects:
//!
//! - [`registry`]: the validated manifest tables and settings
//! - [`assembler`]: template copies, unit placement, dependency relocation and
//!   descriptor patching
//! - [`docs`]: markdown documentation mined from the units themselves
//! - [`scaffold`]: single-example and category project generation
//! - [`batch`]: generate and test many examples in one run
//! - [`updater`]: bump a dependency version across generated projects
//!
//! The registry is loaded once and passed by reference into every component.
//! External build tools are reached only through [`runner::ProjectRunner`].

pub mod assembler;
pub mod batch;
pub mod config;
pub mod docs;
pub mod error;
pub mod registry;
pub mod runner;
pub mod scaffold;
pub mod templates;
pub mod updater;
pub mod version;

#[cfg(test)]
mod fixtures;
