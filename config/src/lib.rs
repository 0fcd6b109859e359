//! Shared configuration crate holding constants used across the workspace.
//!
//! The `constants` module exposes strongly typed settings so downstream crates
//! avoid sprinkling magic numbers. Example:
//!
//! ```
//! use config::constants::{InterpreterConfig, SCALE_EPSILON};
//!
//! let cfg = InterpreterConfig::default();
//! assert_eq!(cfg.scale_epsilon, SCALE_EPSILON);
//! ```

pub mod constants;

pub use constants::{
    InterpreterConfig, DEFAULT_DETAIL, DEFAULT_OPACITY, MAX_RECURSION_DEPTH, RNG_INCREMENT,
    RNG_MULTIPLIER, SCALE_EPSILON, STACK_GROWTH_BYTES, STACK_RED_ZONE_BYTES,
};
