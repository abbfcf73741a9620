//! Integration tests for the playback controller
//!
//! Drives the controller with a fake media server and a fake transport,
//! feeding transport events by hand. Timing tests run on a paused clock.

mod common;

use common::{episode, new_player, session_id, settle, stream_url, FakeServer, ServerCall, TransportCall};
use std::time::Duration;
use textcast_core::MediaError;
use textcast_playback::{
    PlaybackError, PlaybackEvent, PlaybackIntent, PlaybackState, TransportEvent,
};
use tokio::sync::mpsc;

fn tick(current_time: f64, duration: f64) -> TransportEvent {
    TransportEvent::Tick {
        current_time,
        duration,
        is_playing: true,
    }
}

// ===== Item Loading =====

#[tokio::test]
async fn play_from_resumes_at_last_position() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    let x = episode("x", 3600.0, 1800.0);
    let y = episode("y", 1800.0, 0.0);

    player.play_from(vec![x, y], 0).await.expect("play");

    assert_eq!(player.state(), PlaybackState::Loading);
    assert_eq!(server.session_starts(), vec!["pod/x"]);
    assert_eq!(transport.calls(), vec![TransportCall::Load(stream_url("pod/x"))]);
    assert_eq!(player.session().session_id(), Some(session_id("pod/x").as_str()));

    player
        .handle_transport_event(TransportEvent::Ready { duration: 3600.0 })
        .await;

    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Load(stream_url("pod/x")),
            TransportCall::Seek(1800.0),
            TransportCall::Play,
        ]
    );
    assert!(player.is_playing());
}

#[tokio::test]
async fn first_tick_with_duration_counts_as_ready() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);

    player
        .play_single(episode("x", 0.0, 0.0))
        .await
        .expect("play");
    player.handle_transport_event(tick(0.0, 0.0)).await;
    assert_eq!(player.state(), PlaybackState::Loading);

    player.handle_transport_event(tick(0.0, 900.0)).await;
    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(player.duration(), 900.0);
    assert_eq!(transport.calls().last(), Some(&TransportCall::Play));
}

#[tokio::test]
async fn item_from_start_is_not_seeked() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);

    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;

    assert!(!transport
        .calls()
        .iter()
        .any(|call| matches!(call, TransportCall::Seek(_))));
}

#[tokio::test]
async fn seek_while_loading_replaces_resume_position() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);

    player
        .play_single(episode("x", 600.0, 300.0))
        .await
        .expect("play");
    player.seek(42.0).expect("seek");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;

    assert!(transport.calls().contains(&TransportCall::Seek(42.0)));
    assert!(!transport.calls().contains(&TransportCall::Seek(300.0)));
}

#[tokio::test]
async fn failed_session_stays_loading() {
    let server = FakeServer::new();
    server.fail_session("pod/x", MediaError::server(500, "boom"));
    let (mut player, transport) = new_player(&server);

    player
        .play_from(vec![episode("x", 600.0, 0.0), episode("y", 600.0, 0.0)], 0)
        .await
        .expect("session failure is not an error");

    assert_eq!(player.state(), PlaybackState::Loading);
    assert!(transport.calls().is_empty());
    assert!(!player.session().is_active());
    assert_eq!(player.queue().cursor(), Some(0));
    assert!(player
        .drain_events()
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Warning { .. })));
}

#[tokio::test]
async fn unauthorized_session_is_returned() {
    let server = FakeServer::new();
    server.fail_session("pod/x", MediaError::Unauthorized);
    let (mut player, _) = new_player(&server);

    let result = player.play_single(episode("x", 600.0, 0.0)).await;

    assert!(matches!(
        result,
        Err(PlaybackError::Media(MediaError::Unauthorized))
    ));
    assert_eq!(player.state(), PlaybackState::Loading);
}

#[tokio::test]
async fn play_from_rejects_bad_input() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);

    assert!(matches!(
        player.play_from(Vec::new(), 0).await,
        Err(PlaybackError::QueueEmpty)
    ));
    assert!(matches!(
        player.play_from(vec![episode("x", 1.0, 0.0)], 3).await,
        Err(PlaybackError::IndexOutOfBounds(3))
    ));
    assert_eq!(player.state(), PlaybackState::Empty);
    assert!(server.calls().is_empty());
}

// ===== Queue Advance =====

#[tokio::test]
async fn end_of_media_advances_to_next_item() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("x", 3600.0, 1800.0), episode("y", 1800.0, 0.0)], 0)
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 3600.0 })
        .await;
    transport.clear();

    player.handle_transport_event(TransportEvent::Ended).await;

    assert_eq!(player.queue().cursor(), Some(1));
    assert_eq!(player.state(), PlaybackState::Loading);
    assert_eq!(server.session_starts(), vec!["pod/x", "pod/y"]);
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Pause, TransportCall::Load(stream_url("pod/y"))]
    );
    assert_eq!(player.session().session_id(), Some(session_id("pod/y").as_str()));
    assert_eq!(player.session().total_time_listened(), 0.0);

    let events = player.drain_events();
    assert!(events.contains(&PlaybackEvent::StateChanged {
        state: PlaybackState::Ended
    }));
    assert!(events.contains(&PlaybackEvent::ItemChanged {
        id: "pod/y".into(),
        previous_id: Some("pod/x".into()),
    }));
}

#[tokio::test]
async fn end_of_last_item_ends_queue() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;
    player.drain_events();

    player.handle_transport_event(TransportEvent::Ended).await;
    // Duplicate end notifications are ignored
    player.handle_transport_event(TransportEvent::Ended).await;

    assert_eq!(player.state(), PlaybackState::Ended);
    assert_eq!(server.session_starts().len(), 1);
    let events = player.drain_events();
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == PlaybackEvent::EndOfQueue)
            .count(),
        1
    );
}

#[tokio::test]
async fn advance_next_at_end_is_noop() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 0.0), episode("y", 60.0, 0.0)], 1)
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;
    let calls_before = transport.calls();

    assert!(!player.advance_next().await.expect("advance"));

    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(player.queue().cursor(), Some(1));
    assert_eq!(transport.calls(), calls_before);
    assert_eq!(server.session_starts().len(), 1);
}

#[tokio::test]
async fn advance_previous_is_guarded() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 0.0), episode("y", 60.0, 0.0)], 0)
        .await
        .expect("play");

    assert!(!player.advance_previous().await.expect("previous"));
    assert!(player.advance_next().await.expect("next"));
    assert!(player.advance_previous().await.expect("previous"));

    assert_eq!(player.queue().cursor(), Some(0));
    assert_eq!(server.session_starts(), vec!["pod/x", "pod/y", "pod/x"]);
}

#[tokio::test]
async fn advance_on_empty_queue_errors() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);

    assert!(matches!(
        player.advance_next().await,
        Err(PlaybackError::QueueEmpty)
    ));
}

// ===== Removal =====

#[tokio::test]
async fn removing_current_loads_successor() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(
            vec![
                episode("a", 60.0, 0.0),
                episode("b", 60.0, 0.0),
                episode("c", 60.0, 0.0),
            ],
            1,
        )
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;

    assert!(player.remove_item("pod/b").await.expect("remove"));

    assert_eq!(player.queue().cursor(), Some(1));
    assert_eq!(player.current_item().map(|i| i.id.as_str()), Some("pod/c"));
    assert_eq!(player.state(), PlaybackState::Loading);
    assert_eq!(
        transport.calls().last(),
        Some(&TransportCall::Load(stream_url("pod/c")))
    );
}

#[tokio::test]
async fn removing_last_current_empties_player() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("a", 60.0, 0.0), episode("b", 60.0, 0.0)], 1)
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;

    assert!(player.remove_item("pod/b").await.expect("remove"));

    assert_eq!(player.state(), PlaybackState::Empty);
    assert!(player.queue().is_empty());
    assert!(player.current_item().is_none());
    assert!(!player.session().is_active());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Pause));
}

#[tokio::test]
async fn removing_unknown_item_changes_nothing() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("a", 60.0, 0.0))
        .await
        .expect("play");

    assert!(!player.remove_item("pod/zzz").await.expect("remove"));
    assert_eq!(player.queue().len(), 1);
}

// ===== Progress Sync =====

#[tokio::test(start_paused = true)]
async fn periodic_sync_while_playing() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;

    player.handle_transport_event(tick(1.0, 600.0)).await;
    settle().await;
    assert!(server.sync_reports().is_empty());

    tokio::time::advance(Duration::from_secs(31)).await;
    player.handle_transport_event(tick(31.0, 600.0)).await;
    settle().await;

    let reports = server.sync_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].current_time, 31.0);
    assert_eq!(reports[0].duration, 600.0);
    assert_eq!(reports[0].time_listened, 31.0);

    // The next tick collects the finished background sync
    player.handle_transport_event(tick(32.0, 600.0)).await;
    assert_eq!(player.session().total_time_listened(), 31.0);
    assert!(player
        .drain_events()
        .contains(&PlaybackEvent::ProgressSynced {
            session_id: session_id("pod/x"),
            current_time: 31.0,
            time_listened: 31.0,
        }));

    // Not due again until another interval has passed
    tokio::time::advance(Duration::from_secs(10)).await;
    player.handle_transport_event(tick(42.0, 600.0)).await;
    settle().await;
    assert_eq!(server.sync_reports().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_ticks_trigger_one_sync() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;

    tokio::time::advance(Duration::from_secs(30)).await;
    for _ in 0..5 {
        player.handle_transport_event(tick(30.0, 600.0)).await;
    }
    settle().await;

    assert_eq!(server.sync_reports().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_syncs_before_returning() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;
    tokio::time::advance(Duration::from_secs(10)).await;
    player.handle_transport_event(tick(10.0, 600.0)).await;

    player.pause().await.expect("pause");

    assert_eq!(transport.calls().last(), Some(&TransportCall::Pause));
    assert!(!player.is_playing());
    let reports = server.sync_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].current_time, 10.0);
    assert_eq!(reports[0].time_listened, 10.0);
    assert_eq!(player.session().total_time_listened(), 10.0);
}

#[tokio::test(start_paused = true)]
async fn failed_sync_time_is_sent_again() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 600.0 })
        .await;

    server.set_sync_failing(true);
    tokio::time::advance(Duration::from_secs(10)).await;
    player.pause().await.expect("pause failure is only logged");
    assert_eq!(player.session().total_time_listened(), 0.0);

    server.set_sync_failing(false);
    player.play().expect("play");
    tokio::time::advance(Duration::from_secs(5)).await;
    player.pause().await.expect("pause");

    let reports = server.sync_reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].time_listened, 15.0);
    assert_eq!(player.session().total_time_listened(), 15.0);
}

#[tokio::test]
async fn no_sync_without_duration() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 0.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 0.0 })
        .await;

    player.pause().await.expect("pause");

    assert!(server.sync_reports().is_empty());
}

#[tokio::test]
async fn no_sync_without_session() {
    let server = FakeServer::new();
    server.fail_session("pod/x", MediaError::network("offline"));
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 600.0, 0.0))
        .await
        .expect("play");

    player.pause().await.expect("pause");
    player.sync_now().await;

    assert!(server.sync_reports().is_empty());
}

// ===== Controls =====

#[tokio::test]
async fn controls_require_an_item() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);

    assert!(matches!(player.play(), Err(PlaybackError::NoItemLoaded)));
    assert!(matches!(
        player.pause().await,
        Err(PlaybackError::NoItemLoaded)
    ));
    assert!(matches!(player.seek(10.0), Err(PlaybackError::NoItemLoaded)));
    assert!(matches!(
        player.skip_forward(),
        Err(PlaybackError::NoItemLoaded)
    ));
}

#[tokio::test]
async fn skips_move_fifteen_seconds_within_bounds() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 100.0, 0.0))
        .await
        .expect("play");
    player.handle_transport_event(tick(10.0, 100.0)).await;
    transport.clear();

    player.skip_backward().expect("skip");
    player.skip_forward().expect("skip");
    player.seek(95.0).expect("seek");
    player.skip_forward().expect("skip");

    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Seek(0.0),
            TransportCall::Seek(15.0),
            TransportCall::Seek(95.0),
            TransportCall::Seek(100.0),
        ]
    );
}

#[tokio::test]
async fn stop_keeps_queue_and_clears_session() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 0.0), episode("y", 60.0, 0.0)], 0)
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;

    player.stop();

    assert_eq!(player.state(), PlaybackState::Empty);
    assert!(player.current_item().is_none());
    assert_eq!(player.queue().len(), 2);
    assert_eq!(player.queue().cursor(), None);
    assert!(!player.session().is_active());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Pause));

    // Late events from the old source are ignored
    player.handle_transport_event(TransportEvent::Ended).await;
    assert_eq!(player.state(), PlaybackState::Empty);
    assert_eq!(server.session_starts().len(), 1);
}

#[tokio::test]
async fn stopped_queue_needs_a_new_start() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 0.0), episode("y", 60.0, 0.0)], 0)
        .await
        .expect("play");
    player.stop();

    assert!(matches!(
        player.advance_next().await,
        Err(PlaybackError::NoItemLoaded)
    ));
    assert!(matches!(player.play(), Err(PlaybackError::NoItemLoaded)));

    // Removal still edits the kept queue
    assert!(player.remove_item("pod/y").await.expect("remove"));
    assert_eq!(player.queue().len(), 1);
    assert_eq!(player.state(), PlaybackState::Empty);
    assert_eq!(server.session_starts(), vec!["pod/x"]);
}

#[tokio::test]
async fn play_after_end_restarts_item() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;
    player.handle_transport_event(TransportEvent::Ended).await;
    transport.clear();

    player.play().expect("play");

    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Seek(0.0), TransportCall::Play]
    );
}

#[tokio::test]
async fn transport_failure_is_a_warning() {
    let server = FakeServer::new();
    let (mut player, _) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");
    player.drain_events();

    player
        .handle_transport_event(TransportEvent::Failed {
            message: "decoder error".into(),
        })
        .await;

    assert_eq!(player.state(), PlaybackState::Loading);
    assert!(player.drain_events().iter().any(|event| matches!(
        event,
        PlaybackEvent::Warning { message } if message.contains("decoder error")
    )));
}

#[tokio::test]
async fn pause_while_loading_holds_playback() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");

    player.pause().await.expect("pause");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;

    assert_eq!(player.state(), PlaybackState::Ready);
    assert!(!player.is_playing());
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Load(stream_url("pod/x"))]
    );

    player.play().expect("play");
    assert!(player.is_playing());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Play));
}

#[tokio::test]
async fn toggle_while_loading_flips_auto_play() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");

    player.toggle_play_pause().await.expect("toggle");
    player.toggle_play_pause().await.expect("toggle");
    player.handle_transport_event(tick(0.0, 60.0)).await;

    assert!(player.is_playing());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Play));
}

#[tokio::test]
async fn paused_start_pauses_a_self_starting_transport() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");
    player
        .handle_intent(PlaybackIntent::Pause)
        .await
        .expect("pause");

    // Platform player reports it already started on its own
    player.handle_transport_event(tick(0.0, 60.0)).await;

    assert_eq!(player.state(), PlaybackState::Ready);
    assert!(!player.is_playing());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Pause));
}

#[tokio::test]
async fn ready_tick_records_resume_position() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 20.0), episode("y", 60.0, 0.0)], 0)
        .await
        .expect("play");
    player.drain_events();

    player.handle_transport_event(tick(0.0, 60.0)).await;

    assert_eq!(player.queue().items()[0].current_time, 20.0);
    assert!(player.drain_events().iter().any(|event| matches!(
        event,
        PlaybackEvent::PositionUpdate { current_time, is_playing: true, .. } if *current_time == 20.0
    )));

    // Going back to the item resumes where it was left
    player.advance_next().await.expect("next");
    player.advance_previous().await.expect("previous");
    player.handle_transport_event(tick(0.0, 60.0)).await;
    assert!(transport.calls().ends_with(&[TransportCall::Seek(20.0), TransportCall::Play]));
}

// ===== Intents =====

#[tokio::test]
async fn intents_dispatch_to_controls() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_from(vec![episode("x", 60.0, 0.0), episode("y", 60.0, 0.0)], 0)
        .await
        .expect("play");
    player
        .handle_transport_event(TransportEvent::Ready { duration: 60.0 })
        .await;

    player
        .handle_intent(PlaybackIntent::TogglePlayPause)
        .await
        .expect("toggle");
    assert!(!player.is_playing());

    player
        .handle_intent(PlaybackIntent::TogglePlayPause)
        .await
        .expect("toggle");
    assert!(player.is_playing());

    player
        .handle_intent(PlaybackIntent::Next)
        .await
        .expect("next");
    assert_eq!(player.current_item().map(|i| i.id.as_str()), Some("pod/y"));

    player
        .handle_intent(PlaybackIntent::Stop)
        .await
        .expect("stop");
    assert_eq!(player.state(), PlaybackState::Empty);
    assert!(transport.calls().contains(&TransportCall::Load(stream_url("pod/y"))));
}

#[tokio::test]
async fn run_loop_serializes_intents_and_events() {
    let server = FakeServer::new();
    let (mut player, transport) = new_player(&server);
    player
        .play_single(episode("x", 60.0, 0.0))
        .await
        .expect("play");

    let (intent_tx, intent_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(8);
    let (observer_tx, mut observer_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(player.run(intent_rx, event_rx, observer_tx));

    event_tx
        .send(TransportEvent::Ready { duration: 60.0 })
        .await
        .expect("send");
    drop(event_tx);
    // Wait until the ready event went through before pausing
    loop {
        match observer_rx.recv().await {
            Some(PlaybackEvent::StateChanged {
                state: PlaybackState::Ready,
            }) => break,
            Some(_) => {}
            None => panic!("controller stopped early"),
        }
    }
    intent_tx.send(PlaybackIntent::Pause).await.expect("send");
    drop(intent_tx);

    let player = handle.await.expect("controller task");

    assert_eq!(player.state(), PlaybackState::Ready);
    assert!(!player.is_playing());
    assert_eq!(transport.calls().last(), Some(&TransportCall::Pause));
    assert_eq!(server.count(|call| matches!(call, ServerCall::Sync { .. })), 1);
}
