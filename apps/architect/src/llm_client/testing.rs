//! Test transports shared by the gateway and wizard tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::errors::GatewayError;
use crate::llm_client::{GenerationRequest, GenerationTransport, LlmResponse};

/// Replays canned outcomes in order and records every request it sees.
pub(crate) struct ScriptedTransport {
    replies: Mutex<Vec<Result<LlmResponse, GatewayError>>>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Result<LlmResponse, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn text(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(LlmResponse::from_text(text))])
    }

    pub(crate) fn texts(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(LlmResponse::from_text(*t))).collect())
    }

    pub(crate) fn failing(error: GatewayError) -> Arc<Self> {
        Self::new(vec![Err(error)])
    }

    pub(crate) fn last_request(&self) -> GenerationRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request sent")
    }

    pub(crate) fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, GatewayError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(GatewayError::TransportFailure("script exhausted".into())))
    }
}

/// Holds its single reply until `release` is called, so a request can be observed in flight.
pub(crate) struct GatedTransport {
    started: Notify,
    release: Notify,
    reply: Mutex<Option<Result<LlmResponse, GatewayError>>>,
}

impl GatedTransport {
    pub(crate) fn new(reply: Result<LlmResponse, GatewayError>) -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            reply: Mutex::new(Some(reply)),
        })
    }

    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl GenerationTransport for GatedTransport {
    async fn generate(&self, _request: &GenerationRequest) -> Result<LlmResponse, GatewayError> {
        self.started.notify_one();
        self.release.notified().await;
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(GatewayError::TransportFailure("reply already taken".into())))
    }
}
