//! Cross-component integration tests
//!
//! These tests wire the connection registry, the broadcast fan-out, and the
//! board store together without starting a server; mpsc receivers stand in
//! for client sockets.

use std::sync::Arc;

use tokio::sync::mpsc;

use agora_board_service::broadcast::Broadcaster;
use agora_board_service::registry::{ConnectionHandle, ConnectionRegistry};
use agora_board_service::store::{BoardStore, ChatMessage, MemoryStore};
use agora_board_service::websocket::ServerEvent;

struct TestEnvironment {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<Broadcaster>,
    store: Arc<MemoryStore>,
}

fn create_test_environment() -> TestEnvironment {
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = Arc::new(Broadcaster::new(registry.clone()));
    let store = Arc::new(MemoryStore::new());

    TestEnvironment {
        registry,
        broadcaster,
        store,
    }
}

/// Connect a client the way the socket handler does: register, then
/// broadcast `user_joined` with the post-registration presence count.
async fn join(
    env: &TestEnvironment,
    user_id: &str,
) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
    let (tx, rx) = mpsc::channel(32);
    let handle = env.registry.register(user_id.to_string(), tx);

    env.broadcaster
        .broadcast(ServerEvent::UserJoined {
            user_id: user_id.to_string(),
            active_users: env.registry.len(),
        })
        .await;

    (handle, rx)
}

/// Disconnect a client gracefully: deregister, then broadcast `user_left`
/// with the updated presence count.
async fn leave(env: &TestEnvironment, handle: &ConnectionHandle) {
    if env.registry.deregister(handle) {
        env.broadcaster
            .broadcast(ServerEvent::UserLeft {
                user_id: handle.user_id.clone(),
                active_users: env.registry.len(),
            })
            .await;
    }
}

/// Send a chat message the way the receive loop does: append to the log,
/// then broadcast to all members including the sender.
async fn chat(env: &TestEnvironment, handle: &ConnectionHandle, name: &str, text: &str) {
    let message = ChatMessage::new(handle.user_id.clone(), name, text);
    env.store.append_chat(message.clone()).await;
    env.broadcaster
        .broadcast(ServerEvent::ChatMessage { message })
        .await;
}

// =============================================================================
// Presence and chat scenario
// =============================================================================

#[tokio::test]
async fn test_join_leave_chat_scenario() {
    let env = create_test_environment();

    // alice connects, then bob connects
    let (alice, mut alice_rx) = join(&env, "alice").await;
    let (bob, mut bob_rx) = join(&env, "bob").await;

    // alice saw her own join (count 1) and bob's join (count 2)
    match alice_rx.recv().await.unwrap() {
        ServerEvent::UserJoined { user_id, active_users } => {
            assert_eq!(user_id, "alice");
            assert_eq!(active_users, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match alice_rx.recv().await.unwrap() {
        ServerEvent::UserJoined { user_id, active_users } => {
            assert_eq!(user_id, "bob");
            assert_eq!(active_users, 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // bob, already registered before his own join broadcast, saw it too
    match bob_rx.recv().await.unwrap() {
        ServerEvent::UserJoined { user_id, active_users } => {
            assert_eq!(user_id, "bob");
            assert_eq!(active_users, 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // bob disconnects; alice sees user_left with the updated count
    leave(&env, &bob).await;
    match alice_rx.recv().await.unwrap() {
        ServerEvent::UserLeft { user_id, active_users } => {
            assert_eq!(user_id, "bob");
            assert_eq!(active_users, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // alice chats; she receives her own message with her identifier
    chat(&env, &alice, "Alice", "hi").await;
    match alice_rx.recv().await.unwrap() {
        ServerEvent::ChatMessage { message } => {
            assert_eq!(message.message, "hi");
            assert_eq!(message.user_id, "alice");
            assert_eq!(message.name, "Alice");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert_eq!(env.store.chat_count().await, 1);
}

#[tokio::test]
async fn test_stale_session_leave_does_not_evict_replacement() {
    let env = create_test_environment();

    let (old, _old_rx) = join(&env, "alice").await;
    let (new, mut new_rx) = join(&env, "alice").await;

    // Replacement closed the old session but membership stayed at one
    assert_eq!(env.registry.len(), 1);

    // The old session's teardown is a no-op and emits no user_left
    leave(&env, &old).await;
    assert_eq!(env.registry.len(), 1);

    // Drain the join events the new connection saw; no user_left follows
    chat(&env, &new, "Alice", "still here").await;
    loop {
        match new_rx.recv().await.unwrap() {
            ServerEvent::UserLeft { .. } => panic!("stale session must not emit user_left"),
            ServerEvent::ChatMessage { message } => {
                assert_eq!(message.message, "still here");
                break;
            }
            _ => continue,
        }
    }
}

// =============================================================================
// Board events through the fan-out
// =============================================================================

#[tokio::test]
async fn test_thread_and_reply_events_reach_members() {
    let env = create_test_environment();
    let (_alice, mut alice_rx) = join(&env, "alice").await;
    let _ = alice_rx.recv().await; // own join event

    // Create a thread and broadcast it, the way the HTTP handler does
    let thread = env
        .store
        .create_thread(
            "Welcome".to_string(),
            "First post".to_string(),
            "general".to_string(),
        )
        .await;
    env.broadcaster
        .broadcast(ServerEvent::NewThread {
            thread: thread.clone(),
        })
        .await;

    match alice_rx.recv().await.unwrap() {
        ServerEvent::NewThread { thread: t } => {
            assert_eq!(t.id, thread.id);
            assert_eq!(t.title, "Welcome");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // Reply to it
    let reply = env
        .store
        .add_reply(thread.id, "Nice board".to_string(), "bob".to_string())
        .await
        .unwrap();
    env.broadcaster
        .broadcast(ServerEvent::NewReply {
            thread_id: thread.id,
            reply: reply.clone(),
        })
        .await;

    match alice_rx.recv().await.unwrap() {
        ServerEvent::NewReply { thread_id, reply: r } => {
            assert_eq!(thread_id, thread.id);
            assert_eq!(r.id, reply.id);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let stored = env.store.get_thread(thread.id).await.unwrap();
    assert_eq!(stored.replies.len(), 1);
}

// =============================================================================
// Fan-out self-healing
// =============================================================================

#[tokio::test]
async fn test_dead_member_pruned_while_others_keep_receiving() {
    let env = create_test_environment();

    let (_alice, mut alice_rx) = join(&env, "alice").await;
    let (_bob, bob_rx) = join(&env, "bob").await;

    // bob's socket dies without a close frame
    drop(bob_rx);

    let (carol, _carol_rx) = join(&env, "carol").await;

    // The join broadcast already swept bob out
    assert_eq!(env.registry.len(), 2);
    assert!(env.registry.get("bob").is_none());

    chat(&env, &carol, "Carol", "anyone here?").await;

    // alice still receives everything
    let mut saw_chat = false;
    while let Ok(event) = alice_rx.try_recv() {
        if let ServerEvent::ChatMessage { message } = event {
            assert_eq!(message.message, "anyone here?");
            saw_chat = true;
        }
    }
    assert!(saw_chat);
}

#[tokio::test]
async fn test_concurrent_broadcasts_complete() {
    let env = create_test_environment();
    let (listener, mut rx) = join(&env, "listener").await;

    // Drain events in the background so the listener never stalls the fan-out
    let drained = tokio::spawn(async move {
        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        count
    });

    let mut handles = vec![];
    for i in 0..10 {
        let broadcaster = env.broadcaster.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..10 {
                let message =
                    ChatMessage::new(format!("producer-{}", i), "P", format!("{}:{}", i, j));
                broadcaster
                    .broadcast(ServerEvent::ChatMessage { message })
                    .await;
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let stats = env.broadcaster.stats();
    assert_eq!(stats.events_broadcast, 101);
    assert_eq!(stats.total_delivered, 101);
    assert_eq!(stats.total_failed, 0);

    // Dropping every sender closes the channel and ends the drain task;
    // it saw every event
    env.registry.deregister(&listener);
    drop(listener);
    drop(env);
    assert_eq!(drained.await.unwrap(), 101);
}
