use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use nimbus_core::models::{Auditing, CloudProviderRole, ProjectSettings, RoleRequest};
use nimbus_dryrun::transport::{with_cancellation, Body, BoxFuture, Dispatch, Transport};

use crate::client::{Applied, CloudApi};
use crate::error::ApiError;

/// [`CloudApi`] over any [`Transport`].
///
/// Wrapping the transport in a `DryRunTransport` turns every mutating call
/// into [`Applied::Skipped`] without this type knowing about it.
pub struct HttpCloudApi<T> {
    base_url: String,
    transport: T,
    cancel: Option<CancellationToken>,
}

#[derive(Debug, Default, Deserialize)]
struct RoleList {
    #[serde(default)]
    roles: Vec<CloudProviderRole>,
}

impl<T: Transport> HttpCloudApi<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            cancel: None,
        }
    }

    /// Attach `cancel` to every outgoing request.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Dispatch, ApiError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{path}", self.base_url))
            .header(ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let mut req = builder
            .body(Bytes::from(body.unwrap_or_default()))
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if let Some(cancel) = &self.cancel {
            req = with_cancellation(req, cancel);
        }
        Ok(self.transport.round_trip(req).await?)
    }

    /// GET `path`. A 404 means "nothing there" and yields `None`.
    async fn fetch<R: DeserializeOwned>(&self, path: &str) -> Result<Option<R>, ApiError> {
        let resp = self.send(Method::GET, path, None).await?.into_response()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(resp).await.map(Some)
    }

    async fn mutate<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Applied<R>, ApiError> {
        match self.send(method.clone(), path, body).await? {
            Dispatch::Skipped => {
                tracing::debug!(method = %method, path, "request suppressed");
                Ok(Applied::Skipped)
            }
            Dispatch::Response(resp) => decode(resp).await.map(Applied::Done),
        }
    }
}

async fn decode<R: DeserializeOwned>(resp: Response<Body>) -> Result<R, ApiError> {
    let status = resp.status();
    let bytes = resp.into_body().collect().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    // 204 and friends.
    let bytes = if bytes.is_empty() {
        Bytes::from_static(b"null")
    } else {
        bytes
    };
    Ok(serde_json::from_slice(&bytes)?)
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, ApiError> {
    Ok(serde_json::to_vec(body)?)
}

impl<T: Transport> CloudApi for HttpCloudApi<T> {
    fn get_project_settings<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectSettings, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/settings");
            self.fetch(&path).await?.ok_or_else(|| ApiError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: format!("no settings for project {project_id}"),
            })
        })
    }

    fn update_project_settings<'a>(
        &'a self,
        project_id: &'a str,
        settings: &'a ProjectSettings,
    ) -> BoxFuture<'a, Result<Applied<ProjectSettings>, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/settings");
            self.mutate(Method::PATCH, &path, Some(encode(settings)?))
                .await
        })
    }

    fn get_auditing<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Auditing>, ApiError>> {
        Box::pin(async move { self.fetch(&format!("/groups/{project_id}/auditLog")).await })
    }

    fn configure_auditing<'a>(
        &'a self,
        project_id: &'a str,
        auditing: &'a Auditing,
    ) -> BoxFuture<'a, Result<Applied<Auditing>, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/auditLog");
            self.mutate(Method::PATCH, &path, Some(encode(auditing)?))
                .await
        })
    }

    fn list_cloud_provider_roles<'a>(
        &'a self,
        project_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/cloudProviderAccess");
            let list: Option<RoleList> = self.fetch(&path).await?;
            Ok(list.unwrap_or_default().roles)
        })
    }

    fn create_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/cloudProviderAccess");
            self.mutate(Method::POST, &path, Some(encode(request)?))
                .await
        })
    }

    fn authorize_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        role_id: &'a str,
        request: &'a RoleRequest,
    ) -> BoxFuture<'a, Result<Applied<CloudProviderRole>, ApiError>> {
        Box::pin(async move {
            let path = format!("/groups/{project_id}/cloudProviderAccess/{role_id}");
            self.mutate(Method::PATCH, &path, Some(encode(request)?))
                .await
        })
    }

    fn deauthorize_cloud_provider_role<'a>(
        &'a self,
        project_id: &'a str,
        provider_name: &'a str,
        role_id: &'a str,
    ) -> BoxFuture<'a, Result<Applied<()>, ApiError>> {
        Box::pin(async move {
            let path =
                format!("/groups/{project_id}/cloudProviderAccess/{provider_name}/{role_id}");
            let applied: Applied<serde_json::Value> =
                self.mutate(Method::DELETE, &path, None).await?;
            Ok(match applied {
                Applied::Done(_) => Applied::Done(()),
                Applied::Skipped => Applied::Skipped,
            })
        })
    }
}
