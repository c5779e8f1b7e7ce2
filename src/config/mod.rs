// src/config/mod.rs
//! Configuration module for the AeroNyx Sentinel agent.
//!
//! This module manages agent settings, constants, and default configurations.

pub mod constants;
pub mod defaults;
pub mod settings;

pub use settings::{AgentArgs, AgentConfig, ConfigError};
