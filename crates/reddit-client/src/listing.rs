//! Listing envelope and query parameters
//!
//! Every paginated endpoint answers with a `Listing` thing:
//! `{"kind": "Listing", "data": {"before", "after", "children": [things]}}`.
//! Children stay generic; by default they are left as raw JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed Reddit object: `kind` (`t1`, `t3`, `Listing`, ...) plus payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

/// One page of a paginated listing.
///
/// `before`/`after` are opaque cursors, only meaningful when passed back to
/// the same listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Listing<T = Value> {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Things that carry a fullname (`t3_abc123`), used as a backward cursor.
pub trait Named {
    fn name(&self) -> Option<&str>;
}

impl Named for Value {
    fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }
}

/// Sort order for subreddit link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    New,
    Hot,
    Random,
    Rising,
    Top,
    Controversial,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::New => "new",
            Sort::Hot => "hot",
            Sort::Random => "random",
            Sort::Rising => "rising",
            Sort::Top => "top",
            Sort::Controversial => "controversial",
        }
    }
}

/// Vote direction for `/api/vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
    Undo,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "1",
            VoteDirection::Down => "-1",
            VoteDirection::Undo => "0",
        }
    }
}

/// Per-user listings under `/user/{name}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserListing {
    Submitted,
    Comments,
    Upvoted,
    Downvoted,
    Hidden,
    Saved,
    Gilded,
    Overview,
}

impl UserListing {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserListing::Submitted => "submitted",
            UserListing::Comments => "comments",
            UserListing::Upvoted => "upvoted",
            UserListing::Downvoted => "downvoted",
            UserListing::Hidden => "hidden",
            UserListing::Saved => "saved",
            UserListing::Gilded => "gilded",
            UserListing::Overview => "overview",
        }
    }
}

/// Query parameters accepted by listing endpoints.
///
/// [`to_pairs`](Self::to_pairs) leaves out `sort`: subreddit listings put it
/// in the path, user listings add it as a query parameter themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub sort: Option<Sort>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub count: Option<u32>,
    pub limit: Option<u32>,
}

impl ListingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Cursor and size pairs in wire order, without `sort`. Absent and empty
    /// values are skipped.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        [
            ("before", self.before.clone()),
            ("after", self.after.clone()),
            ("count", self.count.map(|c| c.to_string())),
            ("limit", self.limit.map(|l| l.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_owned(), v))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_listing_envelope() {
        let body = json!({
            "kind": "Listing",
            "data": {
                "before": null,
                "after": "t3_next",
                "dist": 2,
                "modhash": "",
                "children": [
                    { "kind": "t3", "data": { "name": "t3_a", "title": "first" } },
                    { "kind": "t3", "data": { "name": "t3_b", "title": "second" } }
                ]
            }
        });

        let thing: Thing<Listing> = serde_json::from_value(body).unwrap();
        assert_eq!(thing.kind, "Listing");
        let page = thing.data;
        assert_eq!(page.before, None);
        assert_eq!(page.after.as_deref(), Some("t3_next"));
        assert_eq!(page.children.len(), 2);
        assert_eq!(page.children[0].kind, "t3");
        assert_eq!(page.children[1].data.name(), Some("t3_b"));
    }

    #[test]
    fn decodes_typed_children() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Link {
            name: String,
            title: String,
        }

        let body = json!({
            "before": "t3_prev",
            "after": null,
            "children": [{ "kind": "t3", "data": { "name": "t3_a", "title": "x", "ups": 4 } }]
        });
        let page: Listing<Link> = serde_json::from_value(body).unwrap();
        assert_eq!(page.before.as_deref(), Some("t3_prev"));
        assert_eq!(
            page.children[0].data,
            Link {
                name: "t3_a".into(),
                title: "x".into()
            }
        );
    }

    #[test]
    fn missing_children_is_empty_page() {
        let page: Listing = serde_json::from_value(json!({ "after": null })).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn name_is_none_without_string_name() {
        assert_eq!(json!({ "id": "abc" }).name(), None);
        assert_eq!(json!({ "name": 12 }).name(), None);
    }

    #[test]
    fn query_pairs_skip_absent_values_and_sort() {
        let query = ListingQuery::new().sort(Sort::Top).after("t3_x").limit(25);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("after".to_string(), "t3_x".to_string()),
                ("limit".to_string(), "25".to_string()),
            ]
        );
        assert!(ListingQuery::new().to_pairs().is_empty());
        assert!(ListingQuery::new().before("").to_pairs().is_empty());
    }

    #[test]
    fn enum_wire_values() {
        assert_eq!(Sort::Controversial.as_str(), "controversial");
        assert_eq!(VoteDirection::Down.as_str(), "-1");
        assert_eq!(VoteDirection::Undo.as_str(), "0");
        assert_eq!(UserListing::Overview.as_str(), "overview");
        let sort: Sort = serde_json::from_str("\"rising\"").unwrap();
        assert_eq!(sort, Sort::Rising);
    }
}
