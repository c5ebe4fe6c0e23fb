use serde::Serialize;
use tokio::sync::watch;

pub const LIST_PATH: &str = "/";
pub const TRANSACTION_PATH: &str = "/transaction/:hash";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "view", content = "hash", rename_all = "camelCase")]
pub enum Route {
    List,
    Transaction(String),
    NotFound(String),
}

pub fn transaction_path(hash: &str) -> String {
    format!("/transaction/{}", hash)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Matches `path` against a `:param` pattern, returning the captured parameters.
fn match_pattern<'a>(pattern: &str, path: &'a str) -> Option<Vec<&'a str>> {
    let pattern_segments = segments(pattern);
    let path_segments = segments(path);
    if pattern_segments.len() != path_segments.len() {
        return None;
    }
    let mut params = Vec::new();
    for (expected, actual) in pattern_segments.iter().zip(path_segments) {
        if expected.starts_with(':') {
            params.push(actual);
        } else if *expected != actual {
            return None;
        }
    }
    Some(params)
}

fn specificity(pattern: &str) -> (usize, usize) {
    let segments = segments(pattern);
    let literals = segments.iter().filter(|s| !s.starts_with(':')).count();
    (segments.len(), literals)
}

/// Resolves a location to the view of the most specific matching pattern.
pub fn resolve(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut patterns = [LIST_PATH, TRANSACTION_PATH];
    patterns.sort_by_key(|p| std::cmp::Reverse(specificity(p)));
    for pattern in patterns {
        if let Some(params) = match_pattern(pattern, path) {
            return match pattern {
                TRANSACTION_PATH => Route::Transaction(params[0].to_string()),
                _ => Route::List,
            };
        }
    }
    Route::NotFound(path.to_string())
}

/// Holds the current location; front ends subscribe to re-render on navigation.
pub struct Router {
    location: watch::Sender<String>,
}

impl Router {
    pub fn new(initial: &str) -> Self {
        let (location, _) = watch::channel(initial.to_string());
        Self { location }
    }

    pub fn navigate(&self, path: &str) -> Route {
        log::info!("Navigating to {}", path);
        self.location.send_replace(path.to_string());
        resolve(path)
    }

    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    pub fn current(&self) -> Route {
        resolve(&self.location.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(LIST_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_routes() {
        assert_eq!(resolve("/"), Route::List);
        assert_eq!(resolve(""), Route::List);
        assert_eq!(
            resolve("/transaction/0xabc"),
            Route::Transaction("0xabc".to_string())
        );
        assert_eq!(
            resolve("/transaction/0xabc/"),
            Route::Transaction("0xabc".to_string())
        );
        assert_eq!(
            resolve("/transaction/0xabc?tab=raw"),
            Route::Transaction("0xabc".to_string())
        );
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(
            resolve("/transaction/"),
            Route::NotFound("/transaction/".to_string())
        );
        assert_eq!(resolve("/other"), Route::NotFound("/other".to_string()));
        assert_eq!(
            resolve("/transaction/0x1/extra"),
            Route::NotFound("/transaction/0x1/extra".to_string())
        );
    }

    #[tokio::test]
    async fn test_navigate_notifies_subscribers() {
        let router = Router::default();
        let mut rx = router.subscribe();
        assert_eq!(router.current(), Route::List);

        let route = router.navigate(&transaction_path("0xfeed"));
        assert_eq!(route, Route::Transaction("0xfeed".to_string()));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "/transaction/0xfeed");
        assert_eq!(router.location(), "/transaction/0xfeed");
        assert_eq!(router.current(), Route::Transaction("0xfeed".to_string()));
    }
}
