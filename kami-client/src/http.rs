use anyhow::Context;
use async_trait::async_trait;

use crate::{
    api::{self, Comment, CommentId, CommentPage, Link, NewComment, Route, TargetId},
    ClientConfig, CommentApi, CreateScope,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Path (relative to the API host) a call goes to
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Endpoint<'a> {
    List(&'a TargetId),
    Create(&'a CreateScope, Route),
    Delete(&'a CommentId),
    Links,
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::List(_) | Endpoint::Links => Method::Get,
            Endpoint::Create(..) => Method::Post,
            Endpoint::Delete(_) => Method::Delete,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::List(t) => format!("comments/ref/{t}"),
            Endpoint::Create(CreateScope::Target(t), Route::Anonymous) => format!("comments/{t}"),
            Endpoint::Create(CreateScope::Reply(p), Route::Anonymous) => {
                format!("comments/reply/{p}")
            }
            Endpoint::Create(CreateScope::Target(t), Route::Owner) => {
                format!("comments/master/comment/{t}")
            }
            Endpoint::Create(CreateScope::Reply(p), Route::Owner) => {
                format!("comments/master/reply/{p}")
            }
            Endpoint::Delete(id) => format!("comments/{id}"),
            Endpoint::Links => String::from("links/all"),
        }
    }
}

/// Comment API over HTTP
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> HttpApi {
        HttpApi {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Every entry of the links page, whatever its state
    pub async fn links(&self) -> anyhow::Result<Vec<Link>> {
        #[derive(serde::Deserialize)]
        struct Links {
            data: Vec<Link>,
        }

        let endpoint = Endpoint::Links;
        let req = self.request(&endpoint);
        let links: Links = self
            .send(&endpoint, req)
            .await?
            .json()
            .await
            .context("parsing links")?;
        Ok(links.data)
    }

    fn url(&self, endpoint: &Endpoint<'_>) -> String {
        format!("{}/{}", self.config.host.trim_end_matches('/'), endpoint.path())
    }

    fn request(&self, endpoint: &Endpoint<'_>) -> reqwest::RequestBuilder {
        let url = self.url(endpoint);
        let req = match endpoint.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };
        match &self.config.token {
            Some(token) => req.bearer_auth(&token.0),
            None => req,
        }
    }

    async fn send(&self, endpoint: &Endpoint<'_>, req: reqwest::RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("sending request to {}", endpoint.path()))?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.bytes().await.context("reading error body")?;
        let err = api::Error::parse(&body)
            .unwrap_or_else(|_| api::Error::Unknown(format!("server answered {status}")));
        tracing::debug!(%status, ?err, path = %endpoint.path(), "request rejected");
        Err(err).with_context(|| format!("calling {}", endpoint.path()))
    }
}

#[async_trait]
impl CommentApi for HttpApi {
    async fn list(
        &mut self,
        target: &TargetId,
        page: Option<u32>,
        size: Option<u32>,
    ) -> anyhow::Result<CommentPage> {
        let endpoint = Endpoint::List(target);
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(size) = size {
            query.push(("size", size));
        }
        let req = self.request(&endpoint).query(&query);
        self.send(&endpoint, req)
            .await?
            .json()
            .await
            .context("parsing comment page")
    }

    async fn create(
        &mut self,
        scope: &CreateScope,
        comment: &NewComment,
        route: Route,
    ) -> anyhow::Result<Comment> {
        if route.is_owner() && self.config.token.is_none() {
            anyhow::bail!("owner route needs an auth token");
        }
        let endpoint = Endpoint::Create(scope, route);
        let req = self.request(&endpoint).json(comment);
        self.send(&endpoint, req)
            .await?
            .json()
            .await
            .context("parsing created comment")
    }

    async fn delete(&mut self, id: &CommentId) -> anyhow::Result<()> {
        let endpoint = Endpoint::Delete(id);
        let req = self.request(&endpoint);
        self.send(&endpoint, req).await?;
        Ok(())
    }
}
