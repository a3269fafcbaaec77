//! Terminal output for listings.

use comfy_table::{ContentArrangement, Table};
use movierama_core::controllers::{ListingController, ListingState};
use movierama_core::model::{Movie, VoteAction};

const HEADER: [&str; 7] = ["ID", "Title", "Posted by", "When", "Likes", "Hates", "You"];

/// Your relation to a movie: own submission, or the vote you hold.
fn vote_marker(movie: &Movie) -> &'static str {
    if movie.is_same_user {
        "own"
    } else if movie.has_vote(VoteAction::Like) {
        "liked"
    } else if movie.has_vote(VoteAction::Hate) {
        "hated"
    } else {
        ""
    }
}

pub fn movie_row(movie: &Movie) -> Vec<String> {
    vec![
        movie.id.to_string(),
        movie.title.clone(),
        movie.posted_by.clone(),
        movie.time_ago.clone(),
        movie.likes.to_string(),
        movie.hates.to_string(),
        vote_marker(movie).to_string(),
    ]
}

pub fn movies_table(movies: &[Movie]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(HEADER);
    for movie in movies {
        table.add_row(movie_row(movie));
    }
    table.to_string()
}

/// Renders whatever the listing currently holds.
pub fn listing(listing: &ListingController) -> String {
    match listing.state() {
        ListingState::Idle => "Nothing loaded yet.".to_string(),
        ListingState::Loading => "Loading...".to_string(),
        ListingState::Loaded(movies) if movies.is_empty() => "No movies found.".to_string(),
        ListingState::Loaded(movies) => movies_table(movies),
        ListingState::Failed(message) => format!("Could not load movies: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Movie {
        Movie {
            id: 1,
            user_id: 2,
            title: "Heat".to_string(),
            description: String::new(),
            posted_by: "bob".to_string(),
            likes: 3,
            hates: 0,
            user_liked: true,
            user_hated: false,
            is_same_user: false,
            time_ago: "1 hour ago".to_string(),
        }
    }

    #[test]
    fn test_row_shows_counts_and_vote() {
        assert_eq!(
            movie_row(&movie()),
            vec!["1", "Heat", "bob", "1 hour ago", "3", "0", "liked"]
        );
    }

    #[test]
    fn test_table_has_header_and_title() {
        let table = movies_table(&[movie()]);
        assert!(table.contains("Posted by"));
        assert!(table.contains("Heat"));
    }

    #[test]
    fn test_empty_listing_message() {
        let listing = ListingController::site_wide();
        assert_eq!(super::listing(&listing), "Nothing loaded yet.");
    }
}
