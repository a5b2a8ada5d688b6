//! Broadcast presenter - the default rendering adapter
//!
//! Streams typed match events over an async-broadcast ring; the host
//! process subscribes and renders them into the room however it likes.
//! Overflow drops the oldest event rather than blocking a match.

use async_broadcast::{broadcast, Receiver, Sender, TrySendError};
use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{PresentError, Presenter};
use crate::domain::view::{Choice, Scoreboard, TableView};

/// Event stream entry for subscribers
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub match_id: String,
    pub user_id: Option<String>,
    /// Additional data fields (flattened into root)
    #[serde(flatten)]
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl MatchEvent {
    pub fn new(event_type: &str, match_id: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            match_id: match_id.to_string(),
            user_id: None,
            data: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn for_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

pub struct BroadcastPresenter {
    sender: Sender<MatchEvent>,
    receiver: Receiver<MatchEvent>,
}

impl BroadcastPresenter {
    pub fn new(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity);
        sender.set_overflow(true);
        Self { sender, receiver }
    }

    /// A fresh subscription to the event stream.
    pub fn subscribe(&self) -> Receiver<MatchEvent> {
        self.receiver.clone()
    }

    fn emit(&self, event: MatchEvent) -> Result<(), PresentError> {
        match self.sender.try_broadcast(event) {
            Ok(None) => Ok(()),
            Ok(Some(_)) => {
                tracing::debug!("event ring full, oldest event dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(PresentError::Closed),
            Err(e) => Err(PresentError::Delivery(format!("{:?}", e))),
        }
    }
}

impl Default for BroadcastPresenter {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Presenter for BroadcastPresenter {
    async fn publish_table(
        &self,
        match_id: &str,
        view: &TableView,
        note: Option<&str>,
    ) -> Result<(), PresentError> {
        self.emit(
            MatchEvent::new("table", match_id).with_data(json!({ "view": view, "note": note })),
        )
    }

    async fn present_choices(
        &self,
        match_id: &str,
        user_id: &str,
        choices: &[Choice],
    ) -> Result<(), PresentError> {
        self.emit(
            MatchEvent::new("choices", match_id)
                .for_user(user_id)
                .with_data(json!({ "choices": choices })),
        )
    }

    async fn publish_scoreboard(
        &self,
        match_id: &str,
        board: &Scoreboard,
    ) -> Result<(), PresentError> {
        self.emit(MatchEvent::new("scoreboard", match_id).with_data(json!({ "board": board })))
    }

    async fn notify(
        &self,
        match_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<(), PresentError> {
        self.emit(
            MatchEvent::new("notice", match_id)
                .for_user(user_id)
                .with_data(json!({ "text": text })),
        )
    }

    async fn announce(&self, match_id: &str, text: &str) -> Result<(), PresentError> {
        self.emit(MatchEvent::new("announcement", match_id).with_data(json!({ "text": text })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::GameKind;

    fn sample_view() -> TableView {
        TableView {
            game: GameKind::War,
            headline: "War - Alice to flip".to_string(),
            table: vec!["A♠".to_string()],
            turn: Some("Alice".to_string()),
            detail: json!({}),
        }
    }

    #[tokio::test]
    async fn test_table_event_reaches_subscriber() {
        let presenter = BroadcastPresenter::new(16);
        let mut events = presenter.subscribe();
        presenter
            .publish_table("m1", &sample_view(), Some("Alice flips A♠"))
            .await
            .unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type, "table");
        assert_eq!(event.match_id, "m1");
        assert_eq!(event.user_id, None);
        assert_eq!(event.data["note"], json!("Alice flips A♠"));
    }

    #[tokio::test]
    async fn test_notice_is_addressed() {
        let presenter = BroadcastPresenter::new(16);
        let mut events = presenter.subscribe();
        presenter.notify("m1", "u2", "not your turn").await.unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type, "notice");
        assert_eq!(event.user_id.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest_instead_of_failing() {
        let presenter = BroadcastPresenter::new(2);
        for i in 0..5 {
            presenter
                .announce("m1", &format!("line {}", i))
                .await
                .unwrap();
        }
        let mut events = presenter.subscribe();
        let event = events.recv().await.unwrap();
        assert_eq!(event.data["text"], json!("line 3"));
    }
}
