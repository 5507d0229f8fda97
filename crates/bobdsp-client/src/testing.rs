//! Scripted in-memory transport for driving the sync lanes under paused time.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::ClientError;
use crate::transport::{Endpoint, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Json(Value),
    Fail,
    Hang,
}

/// One scripted answer: wait `delay`, then produce `outcome`.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    delay: Duration,
    outcome: Outcome,
}

impl Reply {
    pub(crate) fn json(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Json(value),
        }
    }

    pub(crate) fn fail() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Fail,
        }
    }

    pub(crate) fn hang() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Hang,
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub endpoint: Endpoint,
    pub body: Option<Value>,
    pub at: Instant,
}

/// Answers each request with the next reply queued for its method and
/// endpoint. Requests with nothing queued hang forever.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<HashMap<(Method, Endpoint), VecDeque<Reply>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_get(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.push(Method::Get, endpoint, reply)
    }

    pub(crate) fn on_post(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.push(Method::Post, endpoint, reply)
    }

    fn push(&self, method: Method, endpoint: Endpoint, reply: Reply) -> &Self {
        self.script
            .lock()
            .entry((method, endpoint))
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub(crate) fn count(&self, method: Method, endpoint: Endpoint) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.endpoint == endpoint)
            .count()
    }

    pub(crate) fn posts(&self, endpoint: Endpoint) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == Method::Post && r.endpoint == endpoint)
            .filter_map(|r| r.body.clone())
            .collect()
    }

    async fn answer(&self, method: Method, endpoint: Endpoint, body: Option<Value>) -> Result<Value, ClientError> {
        self.requests.lock().push(Recorded {
            method,
            endpoint,
            body,
            at: Instant::now(),
        });

        let reply = self
            .script
            .lock()
            .get_mut(&(method, endpoint))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(Reply::hang);

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        match reply.outcome {
            Outcome::Json(value) => Ok(value),
            Outcome::Fail => Err(ClientError::ServerError {
                status: 500,
                message: "scripted failure".to_string(),
            }),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, endpoint: Endpoint) -> Result<Value, ClientError> {
        self.answer(Method::Get, endpoint, None).await
    }

    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<Value, ClientError> {
        self.answer(Method::Post, endpoint, Some(body)).await
    }
}

/// A `clients` response with one client `eq` whose `gain` control holds
/// `gain`.
pub(crate) fn clients_doc(client_version: i64, control_version: i64, session: &str, gain: f64) -> Value {
    serde_json::json!({
        "clientVersion": client_version,
        "controlVersion": control_version,
        "sessionId": session,
        "clients": [{
            "name": "eq",
            "plugin": {"label": "eq", "uniqueid": 1},
            "instances": 1,
            "pregain": 1.0,
            "postgain": 1.0,
            "controls": [
                {"name": "gain", "value": gain, "lowerbound": -12.0, "upperbound": 12.0},
                {"name": "bypass", "value": 0, "toggled": true}
            ]
        }]
    })
}
