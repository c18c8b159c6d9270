//! Scripts for deploying the NiftyRoyale contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod migrations;
pub mod networks;
pub mod runner;
pub mod secrets;
pub mod specs;
pub mod transport;
pub mod utils;
pub mod verify;
