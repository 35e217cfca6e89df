pub mod energy_data;
pub mod error;
pub mod health;
pub mod movies;
pub mod ref_zones;
pub mod resolution_codes;

pub use error::AppError;
