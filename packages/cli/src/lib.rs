//! Command line front end for `sealjwt`
//!
//! `sealjwt issue` signs a claim set and encrypts it for a relying party;
//! `sealjwt verify` reverses the process and prints the claims.

pub mod commands;
pub mod logging;
pub mod operations;

pub use commands::{Cli, Commands};
pub use operations::{Outcome, load_config, run};
