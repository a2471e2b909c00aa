#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lodestar_client::{FormRequest, Transport};
use lodestar_core::{ServiceInstance, TransportError};

enum Reply {
    Body(String),
    Fail(String),
    Hang,
    Panic(String),
}

/// Replays canned replies in order and records every request it sees.
/// Once the script runs out it answers with the fallback body, or fails.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    requests: Mutex<Vec<FormRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(body: &str) -> Self {
        Self {
            fallback: Some(body.to_string()),
            ..Self::new()
        }
    }

    pub fn reply(self, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Body(body.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    /// The next request never gets an answer.
    pub fn hang(self) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Hang);
        self
    }

    /// The next request panics inside the transport.
    pub fn panic(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Panic(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: FormRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request);
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(message)) => Err(TransportError::new(message)),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Panic(message)) => panic!("{message}"),
            None => match &self.fallback {
                Some(body) => Ok(body.clone()),
                None => Err(TransportError::new("no scripted reply left")),
            },
        }
    }
}

pub const CENTER_URL: &str = "http://registry:8848/nacos/v1/ns/instance";

pub fn orders_instance() -> ServiceInstance {
    ServiceInstance::new("orders", "10.0.0.5", 8080, Duration::from_secs(5))
}
