//! Rockdeb library exports for testing.
//!
//! This module exposes internal components for integration testing.

pub mod cache;
pub mod commands;
pub mod config;
pub mod deps;
pub mod fetch;
pub mod naming;
pub mod pkginfo;
pub mod platform;
