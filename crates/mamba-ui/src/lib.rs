//! Terminal rendering for Mamba.
//!
//! Lays out the shell chrome (top bar, scene view, HUD panels) and the
//! drop-down console. All drawing goes through [`ratatui`]; state lives in
//! [`mamba_core`] and [`mamba_world`].

pub mod console;
pub mod layout;
pub mod scene_view;
pub mod shell;
