//! HTTP client for the Rundeck REST API.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use tracing::{debug, trace};

use super::error::{Error, Result};
use super::files::{FileResolver, NoFiles};
use super::request::{Body, Operation, Params, Request, RequestContext, build_request};
use super::response::ApiResponse;

/// Sends built requests using one immutable [`RequestContext`].
#[derive(Debug, Clone)]
pub struct Client {
    ctx: RequestContext,
    http: reqwest::Client,
}

impl Client {
    pub fn new(ctx: RequestContext) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("rundeck-cli/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .danger_accept_invalid_certs(!ctx.verify_tls);
        if !ctx.use_proxy {
            builder = builder.no_proxy();
        }

        debug!(
            base_url = %ctx.base_url,
            verify_tls = ctx.verify_tls,
            use_proxy = ctx.use_proxy,
            "creating Rundeck client"
        );
        Ok(Self {
            http: builder.build().map_err(Error::Transport)?,
            ctx,
        })
    }

    /// Build and send one operation.
    pub async fn call(&self, op: &Operation, supplied: Params) -> Result<ApiResponse> {
        self.call_with_files(op, supplied, &NoFiles).await
    }

    /// Like [`Client::call`], resolving upload entry ids through `files`.
    pub async fn call_with_files(
        &self,
        op: &Operation,
        supplied: Params,
        files: &dyn FileResolver,
    ) -> Result<ApiResponse> {
        let request = build_request(op, supplied, &self.ctx, files)?;
        self.send(request).await
    }

    pub async fn send(&self, request: Request) -> Result<ApiResponse> {
        let url = self.ctx.url_for(&request.segments)?;
        // Keys only: the query carries the auth token.
        debug!(
            method = %request.method,
            path = %request.path(),
            params = ?request.query.keys().collect::<Vec<_>>(),
            "sending request"
        );

        let builder = self
            .http
            .request(request.method.clone(), url)
            .query(&request.query.to_query_pairs());

        let builder = match request.body {
            Body::Empty => builder.header(CONTENT_TYPE, "application/json"),
            Body::Json(value) => builder.json(&value),
            Body::Form(pairs) => builder.form(&pairs),
            Body::Multipart {
                field,
                path,
                file_name,
            } => {
                let bytes = std::fs::read(&path)?;
                trace!(file = %path.display(), size = bytes.len(), "attaching script file");
                let part = Part::bytes(bytes).file_name(file_name);
                builder.multipart(Form::new().part(field, part))
            }
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }
        Ok(ApiResponse::from_body(&body))
    }
}

/// reqwest errors embed the request URL, query string included.
fn transport(err: reqwest::Error) -> Error {
    Error::Transport(err.without_url())
}
