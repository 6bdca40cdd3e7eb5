//! # pb-remote-http
//!
//! `RemoteStore` implementation over the discussion service's REST surface.
//!
//! This module implements the data mapping between the service's wire
//! shapes (`_id`, camelCase fields, RFC 3339 timestamps) and the `pb-core`
//! domain models. Mutations carry the caller-supplied bearer token; reads
//! are unauthenticated. A 404 on a single-item fetch maps to `Ok(None)`,
//! never to a transport failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pb_core::{
    Author, Discussion, DiscussionPage, DiscussionQuery, Error, NewDiscussion, NewReply,
    RemoteStore, Reply, Result, VoteDirection,
};

pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// `base_url` is the discussions resource root, e.g.
    /// `https://api.example.com/api/discussions`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        // The service reports failures as {"message": "..."}.
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|b| b.message)
            .unwrap_or_else(|| status.to_string());
        Err(Error::Remote(message))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_discussions(&self, query: &DiscussionQuery) -> Result<DiscussionPage> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("filter", query.sort.as_str().to_string()),
        ];
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if !query.categories.is_empty() {
            params.push(("categories", query.categories.join(",")));
        }

        debug!(sort = query.sort.as_str(), page = query.page, "listing discussions");
        let response = self
            .send(self.client.get(self.url("")).query(&params))
            .await?;
        let page: PageWire = decode(response).await?;
        Ok(page.into())
    }

    async fn get_discussion(&self, id: &str) -> Result<Option<Discussion>> {
        let response = self
            .client
            .get(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Remote(response.status().to_string()));
        }

        let wire: DiscussionWire = decode(response).await?;
        Ok(Some(wire.into()))
    }

    async fn create_discussion(&self, draft: &NewDiscussion, token: &str) -> Result<Discussion> {
        let response = self
            .send(
                self.client
                    .post(self.url(""))
                    .bearer_auth(token)
                    .json(&CreateDiscussionBody::from(draft)),
            )
            .await?;
        let wire: DiscussionWire = decode(response).await?;
        Ok(wire.into())
    }

    async fn vote_discussion(
        &self,
        id: &str,
        direction: VoteDirection,
        token: &str,
    ) -> Result<Discussion> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("/{id}/vote")))
                    .bearer_auth(token)
                    .json(&VoteBody {
                        vote_type: direction,
                    }),
            )
            .await?;
        let wire: DiscussionWire = decode(response).await?;
        Ok(wire.into())
    }

    async fn delete_discussion(&self, id: &str, token: &str) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/{id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }

    async fn list_replies(&self, discussion_id: &str) -> Result<Vec<Reply>> {
        let response = self
            .send(self.client.get(self.url(&format!("/{discussion_id}/replies"))))
            .await?;
        let wire: Vec<ReplyWire> = decode(response).await?;
        Ok(wire.into_iter().map(Reply::from).collect())
    }

    async fn create_reply(
        &self,
        discussion_id: &str,
        draft: &NewReply,
        token: &str,
    ) -> Result<Reply> {
        let response = self
            .send(
                self.client
                    .post(self.url(&format!("/{discussion_id}/replies")))
                    .bearer_auth(token)
                    .json(&CreateReplyBody::from(draft)),
            )
            .await?;
        let wire: ReplyWire = decode(response).await?;
        Ok(wire.into())
    }

    async fn vote_reply(&self, id: &str, direction: VoteDirection, token: &str) -> Result<Reply> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("/replies/{id}/vote")))
                    .bearer_auth(token)
                    .json(&VoteBody {
                        vote_type: direction,
                    }),
            )
            .await?;
        let wire: ReplyWire = decode(response).await?;
        Ok(wire.into())
    }

    async fn delete_reply(&self, id: &str, token: &str) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/replies/{id}")))
                .bearer_auth(token),
        )
        .await?;
        Ok(())
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::Remote(format!("malformed response: {e}")))
}

// ── Wire shapes ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionWire {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    content: String,
    author_id: String,
    author_name: String,
    #[serde(default)]
    author_avatar: String,
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    upvotes: u32,
    downvotes: u32,
    #[serde(default)]
    upvoters: Vec<String>,
    #[serde(default)]
    downvoters: Vec<String>,
    reply_count: u32,
    views: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DiscussionWire> for Discussion {
    fn from(w: DiscussionWire) -> Self {
        Discussion {
            id: w.id,
            title: w.title,
            content: w.content,
            author: Author {
                id: w.author_id,
                name: w.author_name,
                avatar: w.author_avatar,
            },
            category: w.category,
            tags: w.tags,
            images: w.images,
            upvotes: w.upvotes,
            downvotes: w.downvotes,
            upvoters: w.upvoters,
            downvoters: w.downvoters,
            reply_count: w.reply_count,
            views: w.views,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyWire {
    #[serde(rename = "_id")]
    id: String,
    discussion_id: String,
    content: String,
    author_id: String,
    author_name: String,
    #[serde(default)]
    author_avatar: String,
    #[serde(default)]
    images: Vec<String>,
    upvotes: u32,
    downvotes: u32,
    #[serde(default)]
    upvoters: Vec<String>,
    #[serde(default)]
    downvoters: Vec<String>,
    #[serde(default)]
    parent_reply_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReplyWire> for Reply {
    fn from(w: ReplyWire) -> Self {
        Reply {
            id: w.id,
            discussion_id: w.discussion_id,
            content: w.content,
            author: Author {
                id: w.author_id,
                name: w.author_name,
                avatar: w.author_avatar,
            },
            images: w.images,
            upvotes: w.upvotes,
            downvotes: w.downvotes,
            upvoters: w.upvoters,
            downvoters: w.downvoters,
            parent_reply_id: w.parent_reply_id,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageWire {
    discussions: Vec<DiscussionWire>,
    total_discussions: u64,
    total_pages: u32,
    current_page: u32,
}

impl From<PageWire> for DiscussionPage {
    fn from(w: PageWire) -> Self {
        DiscussionPage {
            discussions: w.discussions.into_iter().map(Discussion::from).collect(),
            total_discussions: w.total_discussions,
            total_pages: w.total_pages,
            current_page: w.current_page,
        }
    }
}

#[derive(Serialize)]
struct VoteBody {
    #[serde(rename = "voteType")]
    vote_type: VoteDirection,
}

#[derive(Serialize)]
struct CreateDiscussionBody<'a> {
    title: &'a str,
    content: &'a str,
    category: &'a str,
    tags: &'a [String],
    images: &'a [String],
}

impl<'a> From<&'a NewDiscussion> for CreateDiscussionBody<'a> {
    fn from(d: &'a NewDiscussion) -> Self {
        Self {
            title: &d.title,
            content: &d.content,
            category: &d.category,
            tags: &d.tags,
            images: &d.images,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateReplyBody<'a> {
    content: &'a str,
    images: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_reply_id: Option<&'a str>,
}

impl<'a> From<&'a NewReply> for CreateReplyBody<'a> {
    fn from(r: &'a NewReply) -> Self {
        Self {
            content: &r.content,
            images: &r.images,
            parent_reply_id: r.parent_reply_id.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_discussion_wire_maps_to_domain() {
        let wire: DiscussionWire = serde_json::from_value(json!({
            "_id": "66f0a1",
            "title": "Galaxy S24 Ultra vs iPhone 16 Pro Max",
            "content": "After using both phones for 3 months...",
            "authorId": "u42",
            "authorName": "TechEnthusiast2024",
            "authorAvatar": "https://example.com/a.svg",
            "category": "Comparisons",
            "tags": ["Samsung", "Apple"],
            "images": [],
            "upvotes": 156,
            "downvotes": 12,
            "upvoters": ["u1", "u2"],
            "downvoters": [],
            "replyCount": 43,
            "views": 2341,
            "createdAt": "2025-06-01T10:30:00.000Z",
            "updatedAt": "2025-06-02T08:00:00.000Z"
        }))
        .unwrap();

        let d = Discussion::from(wire);
        assert_eq!(d.id, "66f0a1");
        assert_eq!(d.author.id, "u42");
        assert_eq!(d.author.name, "TechEnthusiast2024");
        assert_eq!(d.net_score(), 144);
        assert_eq!(d.reply_count, 43);
        assert_eq!(d.created_at.to_rfc3339(), "2025-06-01T10:30:00+00:00");
    }

    #[test]
    fn test_reply_wire_handles_null_parent() {
        let wire: ReplyWire = serde_json::from_value(json!({
            "_id": "r9",
            "discussionId": "66f0a1",
            "content": "Great comparison!",
            "authorId": "u7",
            "authorName": "CameraEnthusiast",
            "authorAvatar": "",
            "images": [],
            "upvotes": 23,
            "downvotes": 2,
            "upvoters": [],
            "downvoters": [],
            "parentReplyId": null,
            "createdAt": "2025-06-01T11:00:00.000Z",
            "updatedAt": "2025-06-01T11:00:00.000Z"
        }))
        .unwrap();

        let r = Reply::from(wire);
        assert_eq!(r.parent_reply_id, None);
        assert_eq!(r.net_score(), 21);
    }

    #[test]
    fn test_page_wire_shape() {
        let page: PageWire = serde_json::from_value(json!({
            "discussions": [],
            "totalDiscussions": 45,
            "totalPages": 3,
            "currentPage": 2
        }))
        .unwrap();
        let page = DiscussionPage::from(page);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_request_bodies_match_the_wire() {
        let body = serde_json::to_value(VoteBody {
            vote_type: VoteDirection::Up,
        })
        .unwrap();
        assert_eq!(body, json!({"voteType": "up"}));

        let draft = NewReply {
            content: "Seconded".into(),
            images: vec![],
            parent_reply_id: Some("r1".into()),
        };
        let body = serde_json::to_value(CreateReplyBody::from(&draft)).unwrap();
        assert_eq!(
            body,
            json!({"content": "Seconded", "images": [], "parentReplyId": "r1"})
        );

        // Top-level replies omit the parent key entirely.
        let draft = NewReply {
            content: "Top".into(),
            images: vec![],
            parent_reply_id: None,
        };
        let body = serde_json::to_value(CreateReplyBody::from(&draft)).unwrap();
        assert_eq!(body, json!({"content": "Top", "images": []}));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let store = HttpRemoteStore::new("http://localhost:5001/api/discussions/");
        assert_eq!(
            store.url("/abc/replies"),
            "http://localhost:5001/api/discussions/abc/replies"
        );
    }
}
