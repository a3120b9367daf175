use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    errors::{Error, Result},
    transport::Transport,
};

/// Transport used for testing.
///
/// Replies are scripted up front and handed out in order, every sent payload
/// is recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<String>>,
    sent: Mutex<Vec<String>>,
    fail_next_send: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw reply frame.
    pub fn push_response(&self, frame: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(frame.into());
    }

    /// Queue a reply given as json.
    pub fn push_json(&self, frame: Value) {
        self.push_response(frame.to_string());
    }

    /// Make the next `send` fail as if the socket was closed.
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    /// Payloads sent so far.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Payloads sent so far, decoded.
    pub fn sent_json(&self) -> Result<Vec<Value>> {
        self.sent()
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(Error::from))
            .collect()
    }

    pub fn pending_responses(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, payload: String) -> Result<()> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(Error::Transport("broken pipe".into()));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
        Ok(())
    }

    async fn recv(&self) -> Result<String> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| Error::Connect("connection closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_scripted_replies() {
        let transport = MockTransport::new();
        transport.push_json(json!({"id": "query1", "success": true}));
        transport.push_response("not json");

        transport.send("first".to_string()).await.unwrap();
        assert_eq!(
            r#"{"id":"query1","success":true}"#,
            transport.recv().await.unwrap()
        );
        assert_eq!("not json", transport.recv().await.unwrap());
        assert!(matches!(transport.recv().await, Err(Error::Connect(_))));
        assert_eq!(vec!["first".to_string()], transport.sent());
    }

    #[tokio::test]
    async fn test_fail_next_send() {
        let transport = MockTransport::new();
        transport.fail_next_send();

        assert!(matches!(
            transport.send("lost".to_string()).await,
            Err(Error::Transport(_))
        ));
        transport.send("kept".to_string()).await.unwrap();
        assert_eq!(vec!["kept".to_string()], transport.sent());
    }
}
