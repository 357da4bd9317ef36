use std::sync::Arc;

use api_types::{AttachmentObject, MessageObject};
use async_trait::async_trait;
use gateway::{
    EventType, GatewayAuth, GatewayError, GatewayEventSink, GatewayManager, GatewaySessionStatus,
    GatewayStore,
};

struct FakeStore;

#[async_trait]
impl GatewayStore for FakeStore {
    async fn is_channel_tracked(&self, _discord_channel_id: &str) -> Result<bool, GatewayError> {
        Ok(true)
    }

    async fn upsert_dispatched_message(
        &self,
        message: &MessageObject,
    ) -> Result<MessageObject, GatewayError> {
        Ok(message.clone())
    }

    async fn apply_message_update(
        &self,
        _discord_message_id: &str,
        _content: Option<&str>,
        _edited_timestamp: Option<&str>,
    ) -> Result<Option<MessageObject>, GatewayError> {
        Ok(None)
    }

    async fn delete_dispatched_message(
        &self,
        _discord_message_id: &str,
    ) -> Result<Option<MessageObject>, GatewayError> {
        Ok(None)
    }

    async fn persist_attachment(
        &self,
        _discord_message_id: &str,
        _attachment: &AttachmentObject,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn record_gateway_session(
        &self,
        _user_id: i64,
        _session_id: &str,
        _gateway_url: &str,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn update_gateway_status(
        &self,
        _user_id: i64,
        _status: GatewaySessionStatus,
        _last_sequence: Option<i64>,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}

struct FakeAuth;

#[async_trait]
impl GatewayAuth for FakeAuth {
    async fn access_token_for_user(&self, _user_id: i64) -> Result<String, GatewayError> {
        Ok("fake-token".into())
    }
}

fn test_message(channel_id: &str) -> MessageObject {
    serde_json::from_value(serde_json::json!({
        "id": "1",
        "channel_id": channel_id,
        "author": { "id": "2", "username": "bob", "avatar": null },
        "content": "hi",
        "timestamp": "2024-01-01T00:00:00.000000+00:00",
        "type": 0,
    }))
    .unwrap()
}

#[tokio::test]
async fn broadcast_reaches_only_subscribers_of_that_channel() {
    let manager = GatewayManager::new(
        "wss://gateway.discord.gg".into(),
        Default::default(),
        Arc::new(FakeStore),
        Arc::new(FakeAuth),
    );

    let mut subscribed = manager.subscribe(&["channel-a".to_string()]).await;
    let mut other = manager.subscribe(&["channel-b".to_string()]).await;

    manager
        .broadcast(
            "channel-a",
            gateway::StreamEvent {
                event_type: EventType::Create,
                message: test_message("channel-a"),
                timestamp_ms: 0,
            },
        )
        .await;

    let received = subscribed.receiver.recv().await.expect("event delivered");
    assert_eq!(received.message.channel_id, "channel-a");

    assert!(other.receiver.try_recv().unwrap().is_none());
    let _ = &mut subscribed;
    let _ = &mut other;
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let manager = GatewayManager::new(
        "wss://gateway.discord.gg".into(),
        Default::default(),
        Arc::new(FakeStore),
        Arc::new(FakeAuth),
    );

    let subscription = manager.subscribe(&["channel-a".to_string()]).await;
    manager.unsubscribe("channel-a", subscription.id).await;

    manager
        .broadcast(
            "channel-a",
            gateway::StreamEvent {
                event_type: EventType::Create,
                message: test_message("channel-a"),
                timestamp_ms: 0,
            },
        )
        .await;

    assert!(subscription.receiver.try_recv().unwrap().is_none());
}

#[tokio::test]
async fn subscribe_shares_one_buffer_across_listed_channels() {
    let manager = GatewayManager::new(
        "wss://gateway.discord.gg".into(),
        Default::default(),
        Arc::new(FakeStore),
        Arc::new(FakeAuth),
    );

    let mut subscription = manager
        .subscribe(&["channel-a".to_string(), "channel-b".to_string()])
        .await;

    manager
        .broadcast(
            "channel-a",
            gateway::StreamEvent {
                event_type: EventType::Create,
                message: test_message("channel-a"),
                timestamp_ms: 0,
            },
        )
        .await;
    manager
        .broadcast(
            "channel-b",
            gateway::StreamEvent {
                event_type: EventType::Create,
                message: test_message("channel-b"),
                timestamp_ms: 1,
            },
        )
        .await;

    let first = subscription.receiver.recv().await.expect("event delivered");
    let second = subscription.receiver.recv().await.expect("event delivered");
    assert_eq!(first.message.channel_id, "channel-a");
    assert_eq!(second.message.channel_id, "channel-b");

    manager.unsubscribe("channel-a", subscription.id).await;
    manager.unsubscribe("channel-b", subscription.id).await;
}

#[tokio::test]
async fn cleanup_removes_finished_connections() {
    let manager = GatewayManager::new(
        "wss://127.0.0.1:1".into(),
        Default::default(),
        Arc::new(FakeStore),
        Arc::new(FakeAuth),
    );

    // Dialing an unreachable address fails fast, so the detached task
    // finishes almost immediately and the next sweep should reap it.
    let _ = manager.ensure_connection(1).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    manager
        .cleanup_stale_connections(std::time::Duration::from_secs(120))
        .await;
}
