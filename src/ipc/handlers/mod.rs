pub mod auth;
pub mod backup_exchange;
pub mod certificates;
pub mod core;
pub mod internships;
pub mod marks;
pub mod projects;
pub mod users;
