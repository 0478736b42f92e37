//! Integration tests for [`message_bus::QueueMessageHandler`] over the in-memory bus.

mod common;

use chrono::{Duration, Utc};
use common::{configuration, OrderPlaced, QUEUE};
use message_bus::{
    BusError, CancellationToken, InMemoryBusClient, MessageHandler, QueueMessageHandler,
};

#[tokio::test]
async fn test_send_message_sets_id_and_content_type() {
    let client = InMemoryBusClient::new();
    let handler: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    assert_eq!(handler.entity_path(), QUEUE);

    handler
        .send_message(&OrderPlaced::new("o-1"), &CancellationToken::new())
        .await
        .unwrap();

    let recorded = client.messages(QUEUE).await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].message.message_id, "o-1");
    assert_eq!(recorded[0].message.content_type, "application/json");
    assert_eq!(recorded[0].message.body, br#"{"orderId":"o-1"}"#.to_vec());
    assert_eq!(recorded[0].scheduled_enqueue_time, None);
}

/// **Test: Scheduling returns increasing sequence numbers and records the enqueue time.**
///
/// **Setup:** Handler over the in-memory bus.
/// **Action:** Schedule two messages for different times.
/// **Expected:** Second sequence number is greater; both enqueue times are recorded.
#[tokio::test]
async fn test_schedule_message_returns_increasing_sequence_numbers() {
    let client = InMemoryBusClient::new();
    let handler: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    let cancel = CancellationToken::new();
    let soon = Utc::now() + Duration::minutes(1);
    let later = soon + Duration::hours(1);

    let first = handler
        .schedule_message(&OrderPlaced::new("o-1"), soon, &cancel)
        .await
        .unwrap();
    let second = handler
        .schedule_message(&OrderPlaced::new("o-2"), later, &cancel)
        .await
        .unwrap();
    assert!(second > first);

    let recorded = client.messages(QUEUE).await;
    assert_eq!(recorded[0].scheduled_enqueue_time, Some(soon));
    assert_eq!(recorded[1].scheduled_enqueue_time, Some(later));
    assert_eq!(recorded[1].sequence_number, second);
}

#[tokio::test]
async fn test_cancelled_token_aborts_without_sending() {
    let client = InMemoryBusClient::new();
    let handler: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = handler
        .send_message(&OrderPlaced::new("o-1"), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, BusError::Cancelled);

    let err = handler
        .schedule_message(&OrderPlaced::new("o-2"), Utc::now(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, BusError::Cancelled);

    assert!(client.messages(QUEUE).await.is_empty());
}

#[tokio::test]
async fn test_transport_faults_pass_through() {
    let client = InMemoryBusClient::new();
    let handler: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    client
        .fail_next(BusError::Transport("link detached".to_string()))
        .await;

    let err = handler
        .send_message(&OrderPlaced::new("o-1"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, BusError::Transport("link detached".to_string()));
    assert!(client.messages(QUEUE).await.is_empty());
}

#[tokio::test]
async fn test_close_releases_sender() {
    let client = InMemoryBusClient::new();
    let handler: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    assert_eq!(client.open_senders(), 1);

    handler
        .send_message(&OrderPlaced::new("o-1"), &CancellationToken::new())
        .await
        .unwrap();
    handler.close().await.unwrap();
    assert_eq!(client.open_senders(), 0);

    let reopened: QueueMessageHandler<OrderPlaced> = QueueMessageHandler::new(&configuration(&client));
    reopened
        .send_message(&OrderPlaced::new("o-2"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(client.messages(QUEUE).await.len(), 2);
}

#[tokio::test]
async fn test_handler_usable_as_trait_object() {
    let client = InMemoryBusClient::new();
    let handler: Box<dyn MessageHandler<OrderPlaced>> =
        Box::new(QueueMessageHandler::new(&configuration(&client)));

    handler
        .send_message(&OrderPlaced::new("o-1"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(client.messages(QUEUE).await.len(), 1);
}
