//! Cursor-driven pagination over listing endpoints
//!
//! A crawl starts from a [`ListingQuery`] and walks one direction:
//!
//! - forward (no `before` given): follow each page's `after` cursor until a
//!   page has none
//! - backward (`before` given): set `before` to the fullname of the first
//!   child of the page just fetched
//!
//! Either direction ends on an empty page. The first page is always fetched.
//! Nothing is cached between crawls; every call walks from its own query.

use std::future::Future;

use futures_util::stream::{self, Stream};
use tracing::debug;

use crate::error::Result;
use crate::listing::{Listing, ListingQuery, Named};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

struct CrawlState<F> {
    fetch: F,
    query: ListingQuery,
    direction: Direction,
}

/// Lazily fetch pages with `fetch`, one per poll.
///
/// A failed fetch is yielded once and ends the stream.
pub fn crawl<T, F, Fut>(fetch: F, query: ListingQuery) -> impl Stream<Item = Result<Listing<T>>>
where
    T: Named,
    F: FnMut(ListingQuery) -> Fut,
    Fut: Future<Output = Result<Listing<T>>>,
{
    let direction = if query.before.as_deref().is_some_and(|b| !b.is_empty()) {
        Direction::Backward
    } else {
        Direction::Forward
    };

    stream::unfold(
        Some(CrawlState {
            fetch,
            query,
            direction,
        }),
        |state| async move {
            let mut state = state?;
            let page = match (state.fetch)(state.query.clone()).await {
                Ok(page) => page,
                Err(e) => return Some((Err(e), None)),
            };
            let next = next_query(&state.query, state.direction, &page);
            let state = next.map(|query| CrawlState { query, ..state });
            Some((Ok(page), state))
        },
    )
}

/// Query for the page after `page`, or `None` when the crawl is done.
fn next_query<T: Named>(
    query: &ListingQuery,
    direction: Direction,
    page: &Listing<T>,
) -> Option<ListingQuery> {
    if page.is_empty() {
        debug!("empty page, crawl finished");
        return None;
    }
    let mut next = query.clone();
    match direction {
        Direction::Forward => {
            next.after = Some(page.after.clone()?);
        }
        Direction::Backward => {
            let Some(name) = page.children.first().and_then(|c| c.data.name()) else {
                debug!("first child has no name, backward crawl finished");
                return None;
            };
            next.before = Some(name.to_owned());
        }
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::listing::Thing;
    use futures_util::StreamExt;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn page(before: Option<&str>, after: Option<&str>, names: &[&str]) -> Listing {
        Listing {
            before: before.map(str::to_owned),
            after: after.map(str::to_owned),
            children: names
                .iter()
                .map(|n| Thing {
                    kind: "t3".into(),
                    data: json!({ "name": n }),
                })
                .collect(),
        }
    }

    /// Fake listing endpoint: serves `pages` in order and records each query.
    fn scripted(
        pages: Vec<Result<Listing>>,
    ) -> (
        impl FnMut(ListingQuery) -> std::future::Ready<Result<Listing>>,
        Arc<Mutex<Vec<ListingQuery>>>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut pages: VecDeque<_> = pages.into();
        let log = Arc::clone(&seen);
        let fetch = move |query: ListingQuery| {
            log.lock().unwrap().push(query);
            std::future::ready(pages.pop_front().expect("crawl fetched past the script"))
        };
        (fetch, seen)
    }

    fn names(pages: &[Listing]) -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|p| {
                p.children
                    .iter()
                    .filter_map(|c| c.data.name().map(str::to_owned))
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn forward_follows_after_until_absent() {
        let (fetch, seen) = scripted(vec![
            Ok(page(None, Some("c1"), &["x"])),
            Ok(page(None, None, &["y"])),
        ]);

        let pages: Vec<Listing> = crawl(fetch, ListingQuery::new().limit(1))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(names(&pages), vec![vec!["x"], vec!["y"]]);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].after, None);
        assert_eq!(seen[1].after.as_deref(), Some("c1"));
        assert_eq!(seen[1].limit, Some(1));
    }

    #[tokio::test]
    async fn backward_uses_first_child_name_until_empty_page() {
        let (fetch, seen) = scripted(vec![
            Ok(page(Some("b1"), None, &["t3_c", "t3_d"])),
            Ok(page(Some("b2"), None, &["t3_b"])),
            Ok(page(Some("b3"), None, &["t3_a"])),
            Ok(page(None, None, &[])),
        ]);

        let pages: Vec<Listing> = crawl(fetch, ListingQuery::new().before("t3_e"))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(pages.len(), 4);
        assert!(pages[3].is_empty());
        let befores: Vec<Option<String>> =
            seen.lock().unwrap().iter().map(|q| q.before.clone()).collect();
        assert_eq!(
            befores,
            vec![
                Some("t3_e".to_string()),
                Some("t3_c".to_string()),
                Some("t3_b".to_string()),
                Some("t3_a".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn forward_stops_on_empty_page_even_with_cursor() {
        let (fetch, seen) = scripted(vec![Ok(page(None, Some("c1"), &[]))]);
        let pages: Vec<_> = crawl(fetch, ListingQuery::new()).collect().await;
        assert_eq!(pages.len(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn error_is_yielded_once_and_ends_stream() {
        let (fetch, seen) = scripted(vec![
            Ok(page(None, Some("c1"), &["x"])),
            Err(Error::Backend),
        ]);

        let results: Vec<Result<Listing>> = crawl(fetch, ListingQuery::new()).collect().await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Backend)));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn backward_stops_when_first_child_has_no_name() {
        let unnamed = Listing {
            before: None,
            after: None,
            children: vec![Thing {
                kind: "more".into(),
                data: json!({ "count": 3 }),
            }],
        };
        let (fetch, _) = scripted(vec![Ok::<Listing<Value>, Error>(unnamed)]);
        let pages: Vec<_> = crawl(fetch, ListingQuery::new().before("t3_z")).collect().await;
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn each_crawl_starts_from_its_own_query() {
        let script = || {
            vec![
                Ok(page(None, Some("c1"), &["x"])),
                Ok(page(None, None, &["y"])),
            ]
        };
        for _ in 0..2 {
            let (fetch, seen) = scripted(script());
            let pages: Vec<_> = crawl(fetch, ListingQuery::new()).collect().await;
            assert_eq!(pages.len(), 2);
            assert_eq!(seen.lock().unwrap()[0].after, None);
        }
    }
}
