//! Selection predicate, projection, and ordering for the movie query.

use crate::config::{Config, DEFAULT_MIN_RATING, DEFAULT_MIN_VOTES, DEFAULT_MOVIE_LIMIT};
use serde_json::{Value, json};

/// Which movies to load and how many.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieQuery {
    /// Minimum `imdb.rating` (inclusive).
    pub min_rating: f64,
    /// Minimum `imdb.votes` (inclusive).
    pub min_votes: u64,
    /// Only select movies that have a `poster` field.
    pub require_poster: bool,
    /// Maximum number of movies returned.
    pub limit: usize,
}

impl Default for MovieQuery {
    fn default() -> Self {
        Self {
            min_rating: DEFAULT_MIN_RATING,
            min_votes: DEFAULT_MIN_VOTES,
            require_poster: true,
            limit: DEFAULT_MOVIE_LIMIT,
        }
    }
}

impl MovieQuery {
    /// Build the query from the configured thresholds.
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_rating: config.movie_min_rating,
            min_votes: config.movie_min_votes,
            limit: config.movie_limit,
            ..Self::default()
        }
    }

    /// MongoDB filter document for the selection predicate.
    pub fn filter(&self) -> Value {
        let mut filter = json!({
            "imdb.rating": { "$exists": true, "$gte": self.min_rating },
            "imdb.votes": { "$exists": true, "$gte": self.min_votes },
        });
        if self.require_poster
            && let Some(map) = filter.as_object_mut()
        {
            map.insert("poster".into(), json!({ "$exists": true }));
        }
        filter
    }

    /// Projection returning only the fields a [`super::Movie`] is built from.
    pub fn projection(&self) -> Value {
        json!({
            "_id": 0,
            "title": 1,
            "plot": 1,
            "fullplot": 1,
            "genres": 1,
            "imdb.rating": 1,
            "year": 1,
        })
    }

    /// Highest rated first.
    pub fn sort(&self) -> Value {
        json!({ "imdb.rating": -1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_matches_selection_predicate() {
        assert_eq!(
            MovieQuery::default().filter(),
            json!({
                "imdb.rating": { "$exists": true, "$gte": 8.0 },
                "imdb.votes": { "$exists": true, "$gte": 50000 },
                "poster": { "$exists": true }
            })
        );
    }

    #[test]
    fn filter_omits_poster_when_not_required() {
        let query = MovieQuery {
            require_poster: false,
            ..MovieQuery::default()
        };
        assert!(query.filter().get("poster").is_none());
    }

    #[test]
    fn projection_keeps_six_fields_and_drops_id() {
        let projection = MovieQuery::default().projection();
        let map = projection.as_object().expect("object");
        let included: Vec<_> = map
            .iter()
            .filter(|(_, flag)| **flag == json!(1))
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(included.len(), 6);
        assert_eq!(map["_id"], json!(0));
    }

    #[test]
    fn sorts_by_rating_descending() {
        assert_eq!(MovieQuery::default().sort(), json!({ "imdb.rating": -1 }));
    }
}
