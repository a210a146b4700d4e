//! Multi-leg option spread selection and validation.
//!
//! [`validator::SpreadValidator`] owns the legs of one spread on one
//! underlying. Strike choice, option construction and quote stability are
//! injected through [`selector::StrikeSelector`], [`factory::OptionFactory`]
//! and [`stability::StabilityTracker`].

pub mod chain;
pub mod config;
pub mod counters;
pub mod error;
pub mod events;
pub mod factory;
pub mod leg;
pub mod option;
pub mod selector;
pub mod stability;
pub mod validator;

pub use error::{ConfigError, SelectionError, SpreadError};
pub use validator::{SpreadValidator, ValidatorState};
