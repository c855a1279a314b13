//! Search URL construction for NorBits.

use crate::categories::CategoryMapping;
use crate::indexer::types::SearchQuery;

use super::NorBitsSettings;

/// Build the `browse.php` URL for a search.
///
/// The site has no paging, so one URL answers the whole query. An IMDb id
/// takes precedence over the free-text term; TV searches carry the episode
/// marker in the term.
pub(super) fn build_search_url(
    base_url: &str,
    settings: &NorBitsSettings,
    categories: &CategoryMapping,
    query: &SearchQuery,
) -> String {
    let search_term = match (query.full_imdb_id(), query.search_term()) {
        (Some(imdb_id), _) => format!("imdbsearch={}", imdb_id),
        (None, Some(term)) => format!("search={}", urlencoding::encode(&term)),
        (None, None) => "search=".to_string(),
    };

    let mut parameters = vec![
        ("incldead", "1"),
        ("fullsearch", if settings.use_full_search { "1" } else { "0" }),
        ("scenerelease", "0"),
    ];
    if settings.free_leech_only {
        parameters.push(("FL", "1"));
    }

    let mut url = format!("{}browse.php?{}", base_url, search_term);
    for (key, value) in parameters {
        url.push_str(&format!("&{}={}", key, value));
    }

    for token in categories.map_standard_to_tracker(&query.categories) {
        url.push('&');
        url.push_str(&token);
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::norbits::{NorBits, DEFAULT_BASE_URL};
    use crate::indexer::traits::SiteAdapter;
    use crate::indexer::types::{HttpMethod, SearchType};

    fn adapter(use_full_search: bool, free_leech_only: bool) -> NorBits {
        NorBits::new(
            "norbits",
            NorBitsSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                username: "alice".to_string(),
                password: "pw".to_string(),
                two_factor_auth_code: None,
                use_full_search,
                free_leech_only,
            },
        )
        .unwrap()
    }

    fn single_url(adapter: &NorBits, query: &SearchQuery) -> String {
        let requests = adapter.build_search_requests(query);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].encoding, Some("iso-8859-1"));
        requests[0].url.clone()
    }

    #[test]
    fn test_text_search() {
        let url = single_url(&adapter(false, false), &SearchQuery::term("the matrix"));
        assert_eq!(
            url,
            "https://norbits.net/browse.php?search=the%20matrix&incldead=1&fullsearch=0&scenerelease=0"
        );
    }

    #[test]
    fn test_imdb_id_wins_over_text() {
        let query = SearchQuery {
            search_type: SearchType::Movie,
            term: Some("the matrix".to_string()),
            imdb_id: Some("tt0133093".to_string()),
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, false), &query);
        assert!(url.contains("imdbsearch=tt0133093"));
        assert!(!url.contains("search=the"));
        assert!(!url.contains("?search="));
    }

    #[test]
    fn test_tv_episode_search() {
        let query = SearchQuery {
            search_type: SearchType::Tv,
            term: Some("Lykkeland".to_string()),
            season: Some(3),
            episode: Some("1".to_string()),
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, false), &query);
        assert!(url.starts_with("https://norbits.net/browse.php?search=Lykkeland%20S03E01&"));

        let season_only = SearchQuery {
            episode: None,
            ..query.clone()
        };
        let url = single_url(&adapter(false, false), &season_only);
        assert!(url.contains("?search=Lykkeland%20S03&"));
    }

    #[test]
    fn test_tv_imdb_id_wins_over_episode() {
        let query = SearchQuery {
            search_type: SearchType::Tv,
            term: Some("Lykkeland".to_string()),
            imdb_id: Some("TT8879940".to_string()),
            season: Some(3),
            episode: Some("1".to_string()),
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, false), &query);
        assert!(url.contains("?imdbsearch=tt8879940&"));
        assert!(!url.contains("S03"));
    }

    #[test]
    fn test_season_ignored_outside_tv() {
        let query = SearchQuery {
            term: Some("Lykkeland".to_string()),
            season: Some(3),
            episode: Some("1".to_string()),
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, false), &query);
        assert!(url.contains("?search=Lykkeland&"));
    }

    #[test]
    fn test_empty_query_emits_empty_search() {
        let url = single_url(&adapter(false, false), &SearchQuery::default());
        assert!(url.starts_with("https://norbits.net/browse.php?search=&incldead=1"));
    }

    #[test]
    fn test_full_search_and_freeleech_flags() {
        let url = single_url(&adapter(true, true), &SearchQuery::term("x"));
        assert!(url.contains("&fullsearch=1"));
        assert!(url.ends_with("&FL=1"));

        let url = single_url(&adapter(false, false), &SearchQuery::term("x"));
        assert!(!url.contains("FL=1"));
    }

    #[test]
    fn test_categories_appended_last() {
        let query = SearchQuery {
            term: Some("x".to_string()),
            categories: vec![2000, 3000],
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, true), &query);
        assert!(url.ends_with(
            "&FL=1&main_cat[]=1&main_cat[]=5&main_cat[]=7&main_cat[]=8&main_cat[]=40"
        ));
    }

    #[test]
    fn test_unmapped_categories_ignored() {
        let query = SearchQuery {
            term: Some("x".to_string()),
            categories: vec![6000],
            ..SearchQuery::default()
        };
        let url = single_url(&adapter(false, false), &query);
        assert!(!url.contains("main_cat"));
    }
}
