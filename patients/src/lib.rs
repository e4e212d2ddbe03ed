#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::cognitive_complexity)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::expect_used)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::print_stdout)]
#![warn(clippy::str_to_string)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::use_self)]
#![warn(clippy::wildcard_imports)]

//! Patient record API of the klinika clinic

pub mod api;
pub mod config;
pub mod data;
pub mod database;
pub mod password;
pub mod service;
pub mod validation;
