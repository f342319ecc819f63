//! `/metrics` HTTP exporter.
//!
//! A bare hyper 1 server: one task per connection, HTTP/1 only. `GET
//! /metrics` returns the text exposition of a [`MetricsRegistry`]; any
//! other request gets a 404.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use super::prometheus::MetricsRegistry;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Serves `metrics` on `addr` until the listener fails.
///
/// Meant to be spawned:
///
/// ```ignore
/// tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
/// ```
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                async move { Ok::<_, Infallible>(respond(&req, &metrics)) }
            });
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                tracing::debug!(%peer, "metrics connection closed: {err}");
            }
        });
    }
}

fn respond(req: &Request<Incoming>, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    if req.method() != Method::GET || req.uri().path() != "/metrics" {
        let mut resp = Response::new(Full::new(Bytes::from_static(b"not found")));
        *resp.status_mut() = StatusCode::NOT_FOUND;
        return resp;
    }

    let mut resp = Response::new(Full::new(Bytes::from(metrics.gather_text())));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(TEXT_FORMAT),
    );
    resp
}
