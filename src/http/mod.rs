//! Internal HTTP layer for back end communication.
//!
//! This module is `pub(crate)` - it contains implementation details
//! not exposed to library users.

pub(crate) mod common;
pub(crate) mod error_helpers;
pub(crate) mod pipeline;
pub(crate) mod refresh;
pub(crate) mod wire_log;
