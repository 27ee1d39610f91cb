//! Command implementations for the smon CLI.
//!
//! - `hook` - records one agent hook event read from stdin
//! - `view` - the live view, the one-shot frame and directory cleanup

pub(crate) mod hook;
pub(crate) mod view;

pub(crate) use hook::*;
pub(crate) use view::*;
