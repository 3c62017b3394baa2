//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled        |
//! |-----------|-------------------------|
//! | `fetch`   | `Fetch`                 |
//! | `inspect` | `Ls`, `Cat`, `Info`     |
//! | `process` | `Process`               |

pub mod fetch;
pub mod inspect;
pub mod process;

pub use fetch::cmd_fetch;
pub use inspect::{cmd_cat, cmd_info, cmd_ls};
pub use process::cmd_process;
