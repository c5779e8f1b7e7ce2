// src/command_handler/handlers/mod.rs
// ============================================
// Command handlers module
// ============================================

pub mod execute_ops;
pub mod file_ops;
pub mod info_ops;
pub mod log_ops;
pub mod network_ops;
pub mod power_ops;
pub mod process_ops;
pub mod ssh_ops;
pub mod status_ops;
pub mod system_ops;

// Re-export common utilities for handlers
pub mod common;
