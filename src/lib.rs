//! navtree: build and reorder a hierarchical navigation tree.
//!
//! - [`domain`]: ordered forest, node registry, drag-reorder state machine,
//!   and the nested-list value format
//! - [`application`]: the per-instance builder wiring those together
//! - [`cli`]: command-line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
