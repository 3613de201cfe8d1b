//! Scripted `HttpProbe` for unit tests
//!
//! Each endpoint gets a queue of canned outcomes. The last outcome repeats
//! once the queue is drained. Every call is recorded with the (tokio) time
//! it happened so retry timing can be asserted under a paused clock.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

use super::{Endpoint, HttpProbe, ProbeError, ProbeResponse, ProbeResult};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Respond(u16, String),
    Refuse,
}

impl Scripted {
    pub(crate) fn respond(status: u16, body: &str) -> Self {
        Scripted::Respond(status, body.to_string())
    }

    fn to_result(&self, endpoint: &Endpoint) -> ProbeResult<ProbeResponse> {
        match self {
            Scripted::Respond(status, body) => Ok(ProbeResponse::new(*status, body.clone())),
            Scripted::Refuse => Err(ProbeError::Connect {
                url: endpoint.to_string(),
                reason: "Connection refused".into(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedProbe {
    scripts: Mutex<HashMap<u16, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(Endpoint, Instant)>>,
}

impl ScriptedProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the endpoint listening on `port`
    pub(crate) fn on(self, port: u16, outcomes: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(port, outcomes.into_iter().collect());
        self
    }

    pub(crate) fn calls_to(&self, port: u16) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e.port == port)
            .count()
    }

    pub(crate) fn call_times(&self, port: u16) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e.port == port)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn get(&self, endpoint: &Endpoint) -> ProbeResult<ProbeResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), Instant::now()));

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.entry(endpoint.port).or_default();
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match next {
            Some(outcome) => outcome.to_result(endpoint),
            None => Scripted::Refuse.to_result(endpoint),
        }
    }
}
