//! Scripts for compiling, deploying, and verifying the crowdfunding contracts.

#![deny(missing_docs)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod compile;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod types;
pub mod utils;
pub mod verify;
