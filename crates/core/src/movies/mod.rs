mod types;

pub use types::{Movie, MovieInfo, MovieSummary, UpdatedInfo};
