//! photobooth library crate.
//!
//! This module exposes the booth components for the binary and for
//! integration testing.

pub mod booth;
pub mod bridge;
pub mod camera;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod event_loop;
pub mod geometry;
pub mod permissions;
pub mod renderer;
pub mod session;
pub mod shoot;
pub mod terminal;
