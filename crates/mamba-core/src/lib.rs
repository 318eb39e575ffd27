//! Core infrastructure for the Mamba simulator shell.
//!
//! This crate owns the module lifecycle manager and the small amount of
//! runtime plumbing shared by the world, UI and app crates: an event bus,
//! the drop-down console model, the command system, logging and frame timing.

pub mod bus;
pub mod command;
pub mod console;
pub mod event;
pub mod fps;
pub mod host;
pub mod input;
pub mod logging;
pub mod module;
pub mod registry;
pub mod warning;
