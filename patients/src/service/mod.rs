pub mod memory;
pub mod patients;
pub mod postgres;
pub mod sessions;
pub mod users;
