// src/lib.rs

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;

pub use crate::core::context::{ConfigError, ConfigResult, Context};
pub use crate::core::hooks::LoaderHooks;
pub use crate::core::registry::{Registry, Scope, SharedContext};
pub use crate::core::rule::{Rule, RuleError, RuleKind};
