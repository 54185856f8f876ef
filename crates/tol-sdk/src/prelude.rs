//! Prelude 模块
//!
//! ```rust
//! use tol_sdk::prelude::*;
//! ```

pub use tol_future::{Classify, Failure, Promise, PromiseState};
pub use tol_join::{
    DiagnosticLevel, JoinOptions, join_mapping, join_mapping_with, join_sequence,
    join_sequence_with,
};
