//! Spin HTTP component entry point.

use std::rc::Rc;

use anyhow::anyhow;
use futures::SinkExt;
use spin_sdk::http::{Fields, IncomingRequest, OutgoingResponse, ResponseOutparam};
use spin_sdk::http_component;
use tracing::error;

use edge_sdk::edge_core::{EdgeResponse, Environment, Method, RequestContext};
use edge_sdk::edge_data::{SharedTransport, SpinTransport};
use edge_sdk::edge_observability::init_logging;

use crate::{config, router};

/// Application variables of this component.
struct SpinVariables;

impl Environment for SpinVariables {
    fn var(&self, name: &str) -> Option<String> {
        spin_sdk::variables::get(name).ok()
    }
}

#[http_component]
async fn handle_contact_relay(req: IncomingRequest, response_out: ResponseOutparam) {
    let env = SpinVariables;
    init_logging(&config::logging(&env));

    let ctx = match into_context(req).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "failed to read request");
            let response = EdgeResponse::json_error(500, "failed to read request");
            if let Err(e) = write_response(response, response_out).await {
                error!(error = %e, "failed to write response");
            }
            return;
        }
    };

    let transport: SharedTransport = Rc::new(SpinTransport);
    let (response, pending) = router::handle(&ctx, &env, &transport).await.into_parts();

    if let Err(e) = write_response(response, response_out).await {
        error!(request_id = %ctx.request_id, error = %e, "failed to write response");
    }

    // The caller already has its response; the report only costs us time.
    if let Some(report) = pending {
        report.deliver().await;
    }
}

async fn into_context(req: IncomingRequest) -> anyhow::Result<RequestContext> {
    let mut ctx = RequestContext::new(
        method_of(&req.method()),
        req.path_with_query().unwrap_or_default(),
    );
    for (name, value) in req.headers().entries() {
        ctx = ctx.with_header(name, String::from_utf8_lossy(&value).into_owned());
    }
    let body = req
        .into_body()
        .await
        .map_err(|e| anyhow!("reading request body: {e:?}"))?;
    Ok(ctx.with_body(body).adopt_request_id())
}

fn method_of(method: &spin_sdk::http::Method) -> Method {
    use spin_sdk::http::Method as SpinMethod;

    match method {
        SpinMethod::Get => Method::Get,
        SpinMethod::Post => Method::Post,
        SpinMethod::Put => Method::Put,
        SpinMethod::Delete => Method::Delete,
        SpinMethod::Patch => Method::Patch,
        SpinMethod::Head => Method::Head,
        SpinMethod::Options => Method::Options,
        SpinMethod::Connect => Method::Connect,
        SpinMethod::Trace => Method::Trace,
        SpinMethod::Other(token) => Method::parse(token),
    }
}

async fn write_response(
    response: EdgeResponse,
    response_out: ResponseOutparam,
) -> anyhow::Result<()> {
    let (status, headers, body) = response.into_parts();

    let header_list: Vec<(String, Vec<u8>)> = headers
        .into_iter()
        .map(|(name, value)| (name, value.into_bytes()))
        .collect();
    let fields = Fields::from_list(&header_list).map_err(|e| anyhow!("invalid header: {e:?}"))?;

    let outgoing = OutgoingResponse::new(fields);
    outgoing
        .set_status_code(status)
        .map_err(|()| anyhow!("invalid status code {status}"))?;

    let mut sink = outgoing.take_body();
    response_out.set(outgoing);
    if !body.is_empty() {
        sink.send(body)
            .await
            .map_err(|e| anyhow!("writing response body: {e}"))?;
    }
    Ok(())
}
