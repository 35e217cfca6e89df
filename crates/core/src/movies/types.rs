use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A movie keyed by `(year, title)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub year: i32,
    pub title: String,
    #[serde(default)]
    pub info: MovieInfo,
}

/// Nested movie attributes, stored as a single map attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_time_secs: Option<i64>,
}

impl Movie {
    /// Creates a movie with empty info.
    pub fn new(year: i32, title: impl Into<String>) -> Self {
        Self {
            year,
            title: title.into(),
            info: MovieInfo::default(),
        }
    }

    pub fn with_plot(mut self, plot: impl Into<String>) -> Self {
        self.info.plot = Some(plot.into());
        self
    }

    pub fn with_rating(mut self, rating: Decimal) -> Self {
        self.info.rating = Some(rating);
        self
    }

    pub fn with_actors<I, S>(mut self, actors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info.actors = actors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.info.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// The projection returned by title-range queries.
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            year: self.year,
            title: self.title.clone(),
            genres: self.info.genres.clone(),
            lead_actor: self.info.actors.first().cloned(),
        }
    }
}

/// The attributes an update wrote, as returned by the store.
///
/// Fields the update did not touch are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<String>>,
}

/// Year, title, genres and lead actor only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub year: i32,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_actor: Option<String>,
}
