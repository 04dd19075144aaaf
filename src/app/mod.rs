//! Application module

pub mod args;
pub mod simulation;
pub mod startup;
