use crate::models::Movie;

/// Maximum number of matches returned for one query
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Queries this short (in characters) return nothing
const MIN_QUERY_CHARS: usize = 2;

/// Incremental title search over the in-memory catalog
///
/// Case-insensitive substring match against `title` or `original_title`,
/// in catalog order, capped at [`MAX_SEARCH_RESULTS`]. Cheap enough to run
/// on every keystroke for catalogs of a few hundred movies.
pub fn search(catalog: &[Movie], query: &str) -> Vec<Movie> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|movie| {
            movie.title.to_lowercase().contains(&needle)
                || movie.original_title.to_lowercase().contains(&needle)
        })
        .take(MAX_SEARCH_RESULTS)
        .cloned()
        .collect()
}
