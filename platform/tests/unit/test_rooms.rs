//! Viewer room unit tests

use skydock::models::deployment::ViewerEvent;
use skydock::server::rooms::LogRooms;
use tokio::sync::broadcast::error::TryRecvError;

fn log_event(slug: &str, message: &str) -> ViewerEvent {
    ViewerEvent::Log {
        deployment_id: slug.to_string(),
        message: message.to_string(),
    }
}

fn message_of(event: ViewerEvent) -> String {
    match event {
        ViewerEvent::Log { message, .. } => message,
        other => panic!("expected log event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_events_delivered_in_publish_order() {
    let rooms = LogRooms::new(16);
    let mut rx = rooms.join("alpha").await;

    rooms.publish("alpha", log_event("alpha", "one")).await;
    rooms.publish("alpha", log_event("alpha", "two")).await;
    rooms.publish("alpha", log_event("alpha", "three")).await;

    assert_eq!(message_of(rx.recv().await.unwrap()), "one");
    assert_eq!(message_of(rx.recv().await.unwrap()), "two");
    assert_eq!(message_of(rx.recv().await.unwrap()), "three");
}

#[tokio::test]
async fn test_rooms_are_isolated_by_slug() {
    let rooms = LogRooms::new(16);
    let mut alpha_rx = rooms.join("alpha").await;
    let mut beta_rx = rooms.join("beta").await;

    rooms.publish("beta", log_event("beta", "for beta only")).await;

    assert_eq!(message_of(beta_rx.recv().await.unwrap()), "for beta only");
    assert!(matches!(alpha_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_no_replay_for_late_joiners() {
    let rooms = LogRooms::new(16);

    // Nobody has joined yet: the event is dropped, not buffered
    rooms.publish("alpha", log_event("alpha", "lost")).await;

    let mut rx = rooms.join("alpha").await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    rooms.publish("alpha", log_event("alpha", "seen")).await;
    assert_eq!(message_of(rx.recv().await.unwrap()), "seen");
}

#[tokio::test]
async fn test_repeated_join_receives_each_event_once() {
    let rooms = LogRooms::new(16);
    let mut first = rooms.join("alpha").await;
    let mut second = rooms.join("alpha").await;

    rooms.publish("alpha", log_event("alpha", "only once")).await;

    assert_eq!(message_of(first.recv().await.unwrap()), "only once");
    assert!(matches!(first.try_recv(), Err(TryRecvError::Empty)));

    assert_eq!(message_of(second.recv().await.unwrap()), "only once");
    assert!(matches!(second.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_publish_without_room_is_dropped() {
    let rooms = LogRooms::new(16);

    // No join ever happened for this slug; publishing must not panic
    rooms.publish("ghost", log_event("ghost", "nobody listens")).await;
}
