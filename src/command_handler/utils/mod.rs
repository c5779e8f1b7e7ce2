// src/command_handler/utils/mod.rs
// ============================================
// Utility functions for command handling
// ============================================

pub mod logging;
