//! Prompt assembly for the movie digest.

use crate::movies::Movie;

/// Maximum number of characters of movie listing sent to the model.
pub const PROMPT_BODY_CHAR_BUDGET: usize = 8000;

/// Marker line the model is asked to end every digest with.
pub const DIGEST_SIGN_OFF: &str = "Powered by Movie Digest.";

/// One line per movie, `- "<title>": <description>`, cut to [`PROMPT_BODY_CHAR_BUDGET`].
pub fn build_movie_listing(movies: &[Movie]) -> String {
    let listing = movies
        .iter()
        .map(|movie| format!("- \"{}\": {}", movie.title, movie.description()))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(&listing, PROMPT_BODY_CHAR_BUDGET)
}

/// Wrap a movie listing in the digest instructions.
pub fn build_digest_prompt(listing: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a movie expert. Given the following list of movies from our database, create a summary with:\n\n",
    );
    prompt.push_str("1. A list of the 3 most interesting movies from this database result set.\n");
    prompt.push_str(
        "2. For each, include at least the Title, Genre, and a Brief Description; feel free to add anything else worth noting about a specific movie.\n",
    );
    prompt.push_str(
        "3. If time allowed only 1 of those 3, give that movie's title and the reason to pick it.\n",
    );
    prompt.push_str(&format!("4. End with: \"{DIGEST_SIGN_OFF}\"\n\n"));
    prompt.push_str(
        "IMPORTANT: Only include movies that are listed below. Do not add any movies from your general knowledge.\n\n",
    );
    prompt.push_str("Movies from our database:\n");
    prompt.push_str(listing);
    prompt
}

/// Keep at most `max_chars` characters, never splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, plot: Option<&str>, fullplot: Option<&str>) -> Movie {
        Movie {
            title: title.into(),
            plot: plot.map(Into::into),
            fullplot: fullplot.map(Into::into),
            genres: vec!["Drama".into()],
            rating: Some(8.1),
            year: Some(2000),
        }
    }

    #[test]
    fn listing_uses_best_available_description() {
        let listing = build_movie_listing(&[
            movie("Heat", Some("Cops and robbers."), Some("A long heist epic.")),
            movie("Ran", Some("A warlord divides his realm."), None),
            movie("Stalker", None, None),
        ]);

        assert_eq!(
            listing,
            "- \"Heat\": A long heist epic.\n- \"Ran\": A warlord divides his realm.\n- \"Stalker\": No description."
        );
    }

    #[test]
    fn listing_is_capped_at_char_budget() {
        let long_plot = "x".repeat(3_000);
        let movies: Vec<_> = (0..5)
            .map(|i| movie(&format!("Movie {i}"), None, Some(&long_plot)))
            .collect();

        let listing = build_movie_listing(&movies);
        assert_eq!(listing.chars().count(), PROMPT_BODY_CHAR_BUDGET);
        assert!(listing.starts_with("- \"Movie 0\": "));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn prompt_wraps_listing_with_instructions() {
        let prompt = build_digest_prompt("- \"Heat\": A long heist epic.");
        assert!(prompt.contains("3 most interesting movies"));
        assert!(prompt.contains(DIGEST_SIGN_OFF));
        assert!(prompt.ends_with("Movies from our database:\n- \"Heat\": A long heist epic."));
    }
}
