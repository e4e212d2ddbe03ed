pub mod patients;
pub mod sessions;
pub mod users;
