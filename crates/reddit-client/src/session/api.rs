//! Resource API endpoints

use futures_util::Stream;
use serde_json::Value;

use super::{ApiRequest, Session};
use crate::crawl::crawl;
use crate::error::Result;
use crate::listing::{Listing, ListingQuery, Thing, UserListing, VoteDirection};

impl Session {
    /// The authenticated user (`GET /api/v1/me`).
    pub async fn me(&self) -> Result<Value> {
        self.request_json(&ApiRequest::get("/api/v1/me")).await
    }

    /// Vote on a link or comment by fullname.
    pub async fn vote(&self, id: &str, direction: VoteDirection) -> Result<Value> {
        let request = ApiRequest::post("/api/vote").form(vec![
            ("id".to_owned(), id.to_owned()),
            ("dir".to_owned(), direction.as_str().to_owned()),
            ("rank".to_owned(), "2".to_owned()),
        ]);
        self.request_json(&request).await
    }

    /// Links of a subreddit, `/r/{name}[/{sort}]`.
    pub async fn list_subreddit_links(&self, name: &str, query: &ListingQuery) -> Result<Listing> {
        let path = match query.sort {
            Some(sort) => format!("/r/{name}/{}", sort.as_str()),
            None => format!("/r/{name}"),
        };
        self.listing(ApiRequest::get(path).query(query.to_pairs()))
            .await
    }

    /// A link and its comment tree: `(link listing, comment listing)`.
    pub async fn list_link_comments(
        &self,
        subreddit: &str,
        link_id: &str,
    ) -> Result<(Listing, Listing)> {
        let request = ApiRequest::get(format!("/r/{subreddit}/comments/{link_id}"));
        let (links, comments): (Thing<Listing>, Thing<Listing>) =
            self.request_json(&request).await?;
        Ok((links.data, comments.data))
    }

    /// Things by fullname (`t1_…`, `t3_…`, `t5_…`).
    pub async fn get_info(&self, ids: &[&str]) -> Result<Listing> {
        let request =
            ApiRequest::get("/api/info").query(vec![("id".to_owned(), ids.join(","))]);
        self.listing(request).await
    }

    /// Links by fullname (`t3_…`).
    pub async fn get_links(&self, ids: &[&str]) -> Result<Listing> {
        self.get_info(ids).await
    }

    /// One of the per-user listings, `/user/{name}/{kind}`.
    ///
    /// Unlike subreddit listings, `sort` travels as a query parameter here.
    pub async fn list_user(
        &self,
        username: &str,
        kind: UserListing,
        query: &ListingQuery,
    ) -> Result<Listing> {
        let path = format!("/user/{username}/{}", kind.as_str());
        let mut pairs = query.to_pairs();
        if let Some(sort) = query.sort {
            pairs.insert(0, ("sort".to_owned(), sort.as_str().to_owned()));
        }
        self.listing(ApiRequest::get(path).query(pairs)).await
    }

    pub async fn list_user_submitted(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Submitted, query).await
    }

    pub async fn list_user_comments(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Comments, query).await
    }

    pub async fn list_user_upvoted(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Upvoted, query).await
    }

    pub async fn list_user_downvoted(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Downvoted, query).await
    }

    pub async fn list_user_hidden(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Hidden, query).await
    }

    pub async fn list_user_saved(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Saved, query).await
    }

    pub async fn list_user_gilded(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Gilded, query).await
    }

    pub async fn list_user_overview(&self, username: &str, query: &ListingQuery) -> Result<Listing> {
        self.list_user(username, UserListing::Overview, query).await
    }

    /// Page through a subreddit listing; see [`crawl`](crate::crawl::crawl).
    pub fn crawl_subreddit_links<'a>(
        &'a self,
        name: &'a str,
        query: ListingQuery,
    ) -> impl Stream<Item = Result<Listing>> + 'a {
        crawl(
            move |q| async move { self.list_subreddit_links(name, &q).await },
            query,
        )
    }

    /// Page through one of a user's listings.
    pub fn crawl_user<'a>(
        &'a self,
        username: &'a str,
        kind: UserListing,
        query: ListingQuery,
    ) -> impl Stream<Item = Result<Listing>> + 'a {
        crawl(
            move |q| async move { self.list_user(username, kind, &q).await },
            query,
        )
    }

    async fn listing(&self, request: ApiRequest) -> Result<Listing> {
        let thing: Thing<Listing> = self.request_json(&request).await?;
        Ok(thing.data)
    }
}
