//! Process local implementations of the service traits. Contents are lost when the process
//! exits.

pub mod patients;
pub mod sessions;
pub mod users;
