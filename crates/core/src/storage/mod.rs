mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{RangeError, RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use traits::{
    LoadReadingRepository, MovieRepository, ReferenceZoneRepository, ResolutionCodeRepository,
};
pub use types::{ConditionalOutcome, DateTimeRange, TitleRange};
