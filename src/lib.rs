#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod agents;
pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod planner;
pub mod prompt;
pub mod providers;
pub mod services;
pub mod store;
pub mod utils;
