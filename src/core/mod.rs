// src/core/mod.rs

pub mod context;
pub mod hooks;
pub mod locator;
pub mod paths;
pub mod registry;
pub mod rule;
