//! Strand Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Strand crates.

use serde::Deserialize;

/// Configuration for execution limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum number of call frames per fiber
    pub max_call_depth: usize,
    /// Maximum number of values on one fiber's operand stack
    pub max_operand_stack: usize,
}

/// Initial allocation sizes for fibers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Initial operand stack capacity
    pub initial_stack_size: usize,
    /// Initial call frame capacity
    pub initial_frames_capacity: usize,
}

/// Log verbosity, as written in project files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse a level name, case-insensitively. `silent` maps to `Error`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "silent" | "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Compiler,
    Vm,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Lexer, Phase::Parser, Phase::Compiler, Phase::Vm];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Vm => "vm",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("strand::{}", self.as_str())
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_operand_stack: 10240,
        }
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            initial_stack_size: 256,
            initial_frames_capacity: 64,
        }
    }
}
