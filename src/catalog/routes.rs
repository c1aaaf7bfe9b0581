//! Storefront route table.

use std::fmt;

use url::form_urlencoded;

use super::slug::slugify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Shop,
    States,
    State(String),
    Collections,
    Collection(String),
    Festivals,
    Festival(String),
    About,
    Contact,
    Cart,
    Search(String),
}

impl Route {
    pub fn state(name: &str) -> Self {
        Route::State(slugify(name))
    }

    pub fn collection(name: &str) -> Self {
        Route::Collection(slugify(name))
    }

    /// Parse a path such as `/states/tamil-nadu` or `/search?q=brass`.
    ///
    /// Trailing slashes are ignored. Returns `None` for unknown paths.
    pub fn parse(path: &str) -> Option<Self> {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["shop"] => Route::Shop,
            ["states"] => Route::States,
            ["states", slug] => Route::State(slug.to_string()),
            ["collections"] => Route::Collections,
            ["collections", slug] => Route::Collection(slug.to_string()),
            ["festivals"] => Route::Festivals,
            ["festivals", slug] => Route::Festival(slug.to_string()),
            ["about"] => Route::About,
            ["contact"] => Route::Contact,
            ["cart"] => Route::Cart,
            ["search"] => {
                let q = query
                    .and_then(|query| {
                        form_urlencoded::parse(query.as_bytes())
                            .find(|(key, _)| key == "q")
                            .map(|(_, value)| value.into_owned())
                    })
                    .unwrap_or_default();
                Route::Search(q)
            }
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Shop => "/shop".to_string(),
            Route::States => "/states".to_string(),
            Route::State(slug) => format!("/states/{}", slug),
            Route::Collections => "/collections".to_string(),
            Route::Collection(slug) => format!("/collections/{}", slug),
            Route::Festivals => "/festivals".to_string(),
            Route::Festival(slug) => format!("/festivals/{}", slug),
            Route::About => "/about".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::Cart => "/cart".to_string(),
            Route::Search(q) => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair("q", q)
                    .finish();
                format!("/search?{}", query)
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/shop/"), Some(Route::Shop));
        assert_eq!(
            Route::parse("/states/tamil-nadu"),
            Some(Route::State("tamil-nadu".to_string()))
        );
        assert_eq!(
            Route::parse("/festivals/diwali-2024"),
            Some(Route::Festival("diwali-2024".to_string()))
        );
        assert_eq!(Route::parse("/cart"), Some(Route::Cart));
    }

    #[test]
    fn test_parse_search_query() {
        assert_eq!(
            Route::parse("/search?q=brass+lamp"),
            Some(Route::Search("brass lamp".to_string()))
        );
        assert_eq!(Route::parse("/search"), Some(Route::Search(String::new())));
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(Route::parse("/admin"), None);
        assert_eq!(Route::parse("/states/a/b"), None);
    }

    #[test]
    fn test_path_round_trip() {
        let routes = [
            Route::Home,
            Route::state("Tamil Nadu"),
            Route::collection("Wood Craft"),
            Route::Search("lamps & bells".to_string()),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route.clone()));
        }
        assert_eq!(Route::state("Tamil Nadu").to_string(), "/states/tamil-nadu");
    }
}
