use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use http::request::Parts;
use http::uri::PathAndQuery;
use http::{StatusCode, Uri, header};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

use weokto_domain::host::HostResolver;
use weokto_domain::path::tenant_path;
use weokto_domain::tenant::Tenant;

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(
        axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
        MakeUuidRequestId,
    )
}

/// Copy the request id onto the response. Must sit inside [`request_id_layer`].
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(axum::http::HeaderName::from_static(REQUEST_ID_HEADER))
}

/// Tenant resolved from the request host by [`tenant_rewrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTenant(pub Tenant);

impl<S> FromRequestParts<S> for ResolvedTenant
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let resolved = parts.extensions.get::<ResolvedTenant>().copied();
        async move { resolved.ok_or(StatusCode::INTERNAL_SERVER_ERROR) }
    }
}

fn request_host(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

fn rewrite_uri(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_owned(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// Resolve the tenant from the `Host` header and prefix page paths with its namespace.
///
/// The rewrite is internal: the client never sees a redirect. API, build and
/// static paths pass through unchanged. The resolved tenant is always stored
/// in request extensions for [`ResolvedTenant`].
pub async fn tenant_rewrite(
    State(resolver): State<Arc<HostResolver>>,
    mut req: Request,
    next: Next,
) -> Response {
    let tenant = match request_host(&req) {
        Some(host) => resolver.resolve(host),
        None => resolver.default_tenant(),
    };

    if let Some(path) = tenant_path(req.uri().path(), tenant) {
        match rewrite_uri(req.uri(), &path) {
            Some(uri) => {
                tracing::debug!(%tenant, from = %req.uri().path(), to = %path, "rewrite");
                *req.uri_mut() = uri;
            }
            None => tracing::warn!(%tenant, to = %path, "unable to rewrite request uri"),
        }
    }

    req.extensions_mut().insert(ResolvedTenant(tenant));
    next.run(req).await
}

/// Wrap `router` so [`tenant_rewrite`] runs before route matching.
///
/// Middleware added with `Router::layer` sees the request after routing, so
/// the inner router is mounted as the fallback of an outer one.
pub fn with_tenant_rewrite(router: Router, resolver: Arc<HostResolver>) -> Router {
    Router::new()
        .fallback_service(router)
        .layer(from_fn_with_state(resolver, tenant_rewrite))
}
