#![warn(clippy::cloned_instead_of_copied)]
#![warn(clippy::cognitive_complexity)]
#![warn(clippy::equatable_if_let)]
#![warn(clippy::expect_used)]
#![warn(clippy::manual_let_else)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::print_stdout)]
#![warn(clippy::str_to_string)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::use_self)]
#![warn(clippy::wildcard_imports)]

//! Common components of the klinika patient record services

use std::path::Path;

use tokio::{fs::File, io::AsyncReadExt};

use crate::error::KlResult;

pub mod api;
pub mod database;
pub mod env;
pub mod error;

/// Read the specified file using the `path` provided, returning the contents as a single [String]
/// buffer.
/// # Errors
/// This function will return an error if the file could not be opened or the contents of the file
/// could not be read into a [String] buffer.
pub async fn read_file<P: AsRef<Path> + Send>(path: P) -> KlResult<String> {
    let path = path.as_ref();
    let mut file = match File::open(path).await {
        Ok(inner) => inner,
        Err(error) => return Err(format!("Could not open file, {path:?}. {error}").into()),
    };
    let mut block = String::new();
    file.read_to_string(&mut block).await?;
    Ok(block)
}
