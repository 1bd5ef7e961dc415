pub mod appointments;
pub mod barbers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod services;
pub mod time_blocks;
