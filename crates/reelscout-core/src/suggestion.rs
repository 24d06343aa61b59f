//! Maps catalog error messages to a short hint for the user.

/// Returns a hint for `message`. Matching is case-insensitive and purely
/// textual; callers only display the result.
#[must_use]
pub fn error_suggestion(message: &str) -> &'static str {
    let lower = message.to_lowercase();

    if lower.contains("not found") {
        "Try using different keywords or check the movie title spelling."
    } else if lower.contains("api key") || lower.contains("unauthorized") {
        "There's an issue with the API configuration. Check the OMDb API key in your settings."
    } else if lower.contains("network") || lower.contains("fetch") {
        "Please check your internet connection and try again."
    } else if lower.contains("too many results") {
        "Try being more specific with your search terms."
    } else {
        "Please try again later or search for a different movie."
    }
}
