//! Integration tests for the connection supervisor.
//!
//! The connector here is scripted: each `connect()` call pops the next
//! outcome and records the (virtual) time it was made, so the tests can check
//! the exact backoff schedule under tokio's paused clock.  The engine is the
//! real `JsonLineEngine`, so what reaches the transport can be decoded with
//! `parse_output`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rdp_input_client::application::{
    ClientEvent, ConnectError, ConnectionState, ConnectionSupervisor, Connector, EventBus,
    EventKind, OutputTransport, SupervisorOptions, TransportError, TransportLink,
};
use rdp_input_client::infrastructure::json_engine::{parse_output, OutboundRecord};
use rdp_input_client::infrastructure::JsonLineEngine;
use rdp_input_core::{InputSurfaceEvent, KeyEvent, KeyboardLayout, Modifiers, ReconnectPolicy};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct CapturingTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    closed: AtomicBool,
}

impl CapturingTransport {
    fn records(&self) -> Vec<OutboundRecord> {
        let bytes: Vec<u8> = self.sent.lock().unwrap().concat();
        parse_output(&bytes).expect("engine output is valid JSON lines")
    }
}

impl OutputTransport for CapturingTransport {
    fn send(&self, data: Vec<u8>) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.sent.lock().unwrap().push(data);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Pops one outcome per call: `true` opens a link, `false` refuses.
struct ScriptedConnector {
    script: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<Instant>>,
    transports: Mutex<Vec<Arc<CapturingTransport>>>,
    inbound: Mutex<Vec<mpsc::Sender<Vec<u8>>>>,
}

impl ScriptedConnector {
    fn new(script: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
            transports: Mutex::new(Vec::new()),
            inbound: Mutex::new(Vec::new()),
        })
    }

    /// Gaps between consecutive connect calls.
    fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn transport(&self, index: usize) -> Arc<CapturingTransport> {
        Arc::clone(&self.transports.lock().unwrap()[index])
    }

    fn inbound(&self, index: usize) -> mpsc::Sender<Vec<u8>> {
        self.inbound.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError> {
        self.calls.lock().unwrap().push(Instant::now());
        let succeed = self.script.lock().unwrap().pop_front().unwrap_or(false);
        if !succeed {
            return Err(TransportError::Connect {
                url: url.to_string(),
                reason: "connection refused".into(),
            });
        }
        let transport = Arc::new(CapturingTransport::default());
        let (tx, rx) = mpsc::channel(8);
        self.transports.lock().unwrap().push(Arc::clone(&transport));
        self.inbound.lock().unwrap().push(tx);
        Ok(TransportLink {
            transport,
            inbound: rx,
        })
    }
}

/// Opens one link, but only once the test lets it through.
struct GatedConnector {
    gate: Semaphore,
    entered: AtomicBool,
    transport: Arc<CapturingTransport>,
}

impl GatedConnector {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            entered: AtomicBool::new(false),
            transport: Arc::new(CapturingTransport::default()),
        })
    }
}

#[async_trait]
impl Connector for GatedConnector {
    async fn connect(&self, _url: &str) -> Result<TransportLink, TransportError> {
        self.entered.store(true, Ordering::SeqCst);
        let _permit = self.gate.acquire().await.map_err(|_| TransportError::Closed)?;
        let (_tx, rx) = mpsc::channel(1);
        Ok(TransportLink {
            transport: Arc::clone(&self.transport) as Arc<dyn OutputTransport>,
            inbound: rx,
        })
    }
}

type EventLog = Arc<Mutex<Vec<ClientEvent>>>;

fn record_events(events: &EventBus) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Error,
        EventKind::Log,
    ] {
        let log = Arc::clone(&log);
        events.on(kind, move |event| {
            log.lock().unwrap().push(event.clone());
            Ok(())
        });
    }
    log
}

fn build(
    script: &[bool],
    policy: ReconnectPolicy,
) -> (Arc<ConnectionSupervisor>, Arc<ScriptedConnector>, EventLog) {
    let connector = ScriptedConnector::new(script);
    let events = Arc::new(EventBus::new());
    let log = record_events(&events);
    let supervisor = ConnectionSupervisor::new(
        SupervisorOptions {
            url: "ws://gateway.test/rdp".into(),
            layout: KeyboardLayout::En,
            policy,
        },
        Arc::clone(&connector) as Arc<dyn Connector>,
        Arc::new(JsonLineEngine::new(KeyboardLayout::En)),
        events,
    );
    (supervisor, connector, log)
}

fn retrying(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        auto_reconnect: true,
        max_attempts,
        ..ReconnectPolicy::default()
    }
}

/// Polls `check` until it holds or a second of wall time passes.
async fn eventually(check: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition reached within timeout");
}

// ── Backoff schedule ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_until_cap_then_gives_up() {
    // Arrange
    let (sup, connector, log) = build(&[], retrying(5));

    // Act
    let err = assert_err!(sup.connect().await);

    // Assert – one initial attempt plus five retries
    assert_eq!(connector.call_count(), 6);
    assert_eq!(
        connector.gaps(),
        vec![
            Duration::from_millis(1_000),
            Duration::from_millis(2_000),
            Duration::from_millis(4_000),
            Duration::from_millis(8_000),
            Duration::from_millis(10_000),
        ]
    );
    assert!(matches!(
        err,
        ConnectError::Transport(TransportError::Connect { .. })
    ));
    assert_eq!(sup.state(), ConnectionState::Failed);
    assert_eq!(sup.attempt_count(), 0, "counter resets after final failure");

    let errors = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.kind() == EventKind::Error)
        .count();
    assert_eq!(errors, 6);
}

#[tokio::test(start_paused = true)]
async fn test_default_policy_gives_three_retries() {
    let (sup, connector, _log) = build(&[], retrying(3));

    assert_err!(sup.connect().await);

    assert_eq!(connector.call_count(), 4);
    assert_eq!(
        connector.gaps(),
        vec![
            Duration::from_millis(1_000),
            Duration::from_millis(2_000),
            Duration::from_millis(4_000),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_without_auto_reconnect_there_is_no_delay() {
    // Arrange
    let (sup, connector, _log) = build(&[false, true], ReconnectPolicy::default());
    let started = Instant::now();

    // Act
    assert_err!(sup.connect().await);

    // Assert
    assert_eq!(connector.call_count(), 1);
    assert_eq!(Instant::now() - started, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_failures_emits_errors_then_connected() {
    // Arrange
    let (sup, connector, log) = build(&[false, false, true], retrying(3));

    // Act
    assert_ok!(sup.connect().await);

    // Assert
    assert_eq!(sup.state(), ConnectionState::Connected);
    assert_eq!(sup.attempt_count(), 0);
    assert_eq!(connector.call_count(), 3);

    let kinds: Vec<EventKind> = log.lock().unwrap().iter().map(ClientEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Error, EventKind::Error, EventKind::Connected]
    );
}

#[tokio::test(start_paused = true)]
async fn test_manual_connect_after_final_failure_gets_fresh_budget() {
    // Arrange – first round exhausts two retries
    let (sup, connector, _log) = build(&[false, false, false, false, true], retrying(2));
    assert_err!(sup.connect().await);
    assert_eq!(connector.call_count(), 3);

    // Act – second round fails once more then succeeds
    assert_ok!(sup.connect().await);

    // Assert – the second round waited the first-retry delay again
    assert_eq!(connector.call_count(), 5);
    assert_eq!(connector.gaps()[3], Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_backoff_cancels_connect() {
    // Arrange
    let (sup, connector, _log) = build(&[false, true], retrying(3));
    let task = {
        let sup = Arc::clone(&sup);
        tokio::spawn(async move { sup.connect().await })
    };

    // Act – halfway through the first 1 s delay
    tokio::time::sleep(Duration::from_millis(500)).await;
    sup.disconnect();
    let result = task.await.expect("connect task did not panic");

    // Assert
    assert!(matches!(result, Err(ConnectError::Cancelled)));
    assert_eq!(connector.call_count(), 1, "no retry after cancellation");
    assert_eq!(sup.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_second_connect_while_retrying_is_rejected() {
    let (sup, _connector, _log) = build(&[false, true], retrying(3));
    let task = {
        let sup = Arc::clone(&sup);
        tokio::spawn(async move { sup.connect().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = assert_err!(sup.connect().await);

    assert!(matches!(err, ConnectError::InProgress));
    assert_ok!(task.await.expect("connect task did not panic"));
}

#[tokio::test]
async fn test_link_opened_after_disconnect_is_closed_unannounced() {
    // Arrange
    let connector = GatedConnector::new();
    let sup = ConnectionSupervisor::new(
        SupervisorOptions {
            url: "ws://gateway.test/rdp".into(),
            layout: KeyboardLayout::En,
            policy: ReconnectPolicy::default(),
        },
        Arc::clone(&connector) as Arc<dyn Connector>,
        Arc::new(JsonLineEngine::new(KeyboardLayout::En)),
        Arc::new(EventBus::new()),
    );
    let task = {
        let sup = Arc::clone(&sup);
        tokio::spawn(async move { sup.connect().await })
    };
    eventually(|| connector.entered.load(Ordering::SeqCst)).await;

    // Act – the user gives up, then the socket finishes opening
    sup.disconnect();
    connector.gate.add_permits(1);
    let result = task.await.expect("connect task did not panic");

    // Assert
    assert!(matches!(result, Err(ConnectError::Cancelled)));
    assert!(connector.transport.sent.lock().unwrap().is_empty());
    assert!(connector.transport.closed.load(Ordering::SeqCst));
    assert_eq!(sup.state(), ConnectionState::Disconnected);
    assert!(!sup.is_attached());
}

#[tokio::test]
async fn test_state_subscription_sees_connect_and_disconnect() {
    // Arrange
    let (sup, _connector, _log) = build(&[true], ReconnectPolicy::default());
    let mut states = sup.subscribe_state();
    assert_eq!(*states.borrow_and_update(), ConnectionState::Idle);

    // Act
    assert_ok!(sup.connect().await);

    // Assert
    assert!(states.has_changed().expect("sender alive"));
    assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);
    assert_eq!(sup.url(), "ws://gateway.test/rdp");

    sup.disconnect();
    assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
}

// ── Session behaviour ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_packet_announces_layout() {
    let (sup, connector, _log) = build(&[true], ReconnectPolicy::default());

    assert_ok!(sup.connect().await);

    assert_eq!(
        connector.transport(0).records(),
        vec![OutboundRecord::Hello {
            keyboard_layout: 0x409
        }]
    );
}

#[tokio::test]
async fn test_keys_flow_to_transport_while_connected() {
    // Arrange
    let (sup, connector, _log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);

    // Act
    sup.dispatch(&InputSurfaceEvent::KeyDown(KeyEvent::new(
        "ArrowUp",
        "ArrowUp",
        Modifiers::NONE,
    )));
    sup.dispatch(&InputSurfaceEvent::KeyUp(KeyEvent::new(
        "ArrowUp",
        "ArrowUp",
        Modifiers::NONE,
    )));

    // Assert – extended bit set on both, release bit on the second
    let records = connector.transport(0).records();
    assert_eq!(
        &records[1..],
        &[
            OutboundRecord::Scancode { code: 0x0148 },
            OutboundRecord::Scancode { code: 0x8148 },
        ]
    );
}

#[tokio::test]
async fn test_inbound_lock_state_forces_sync() {
    // Arrange
    let (sup, connector, _log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);
    let transport = connector.transport(0);

    // Act
    connector
        .inbound(0)
        .send(br#"{"type":"lock_state","mask":4}"#.to_vec())
        .await
        .expect("reader is running");

    // Assert
    eventually(|| transport.records().len() >= 2).await;
    assert_eq!(
        transport.records()[1],
        OutboundRecord::SyncLocks { mask: 4 }
    );
    assert!(sup.snapshot().locks.caps_lock);
}

#[tokio::test]
async fn test_malformed_inbound_line_keeps_lock_resync() {
    // Arrange
    let (sup, connector, _log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);
    let transport = connector.transport(0);

    // Act
    connector
        .inbound(0)
        .send(b"{\"type\":\"lock_state\",\"mask\":2}\n{\"type\":\"ping\"}\nnot json".to_vec())
        .await
        .expect("reader is running");

    // Assert
    eventually(|| transport.records().len() >= 3).await;
    assert_eq!(
        &transport.records()[1..],
        &[OutboundRecord::Pong, OutboundRecord::SyncLocks { mask: 2 }]
    );
    assert!(sup.snapshot().locks.num_lock);
}

#[tokio::test]
async fn test_inbound_log_and_ping() {
    // Arrange
    let (sup, connector, log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);
    let transport = connector.transport(0);

    // Act
    connector
        .inbound(0)
        .send(b"{\"type\":\"log\",\"message\":\"hi\"}\n{\"type\":\"ping\"}".to_vec())
        .await
        .expect("reader is running");

    // Assert
    eventually(|| transport.records().len() >= 2).await;
    assert_eq!(transport.records()[1], OutboundRecord::Pong);
    assert!(log.lock().unwrap().contains(&ClientEvent::Log {
        message: "hi".into()
    }));
}

#[tokio::test]
async fn test_disconnect_releases_held_keys_then_closes() {
    // Arrange
    let (sup, connector, log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);
    sup.dispatch(&InputSurfaceEvent::KeyDown(KeyEvent::new(
        "ShiftLeft",
        "Shift",
        Modifiers::shift(),
    )));
    let transport = connector.transport(0);

    // Act
    sup.disconnect();
    sup.disconnect();

    // Assert
    let records = transport.records();
    assert_eq!(
        records.last(),
        Some(&OutboundRecord::Scancode { code: 0x802A })
    );
    assert!(transport.closed.load(Ordering::SeqCst));
    assert_eq!(sup.state(), ConnectionState::Disconnected);
    let disconnects = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| **e == ClientEvent::Disconnected)
        .count();
    assert_eq!(disconnects, 1, "second disconnect is a no-op");
}

#[tokio::test]
async fn test_remote_close_emits_disconnected() {
    // Arrange
    let (sup, connector, log) = build(&[true], ReconnectPolicy::default());
    assert_ok!(sup.connect().await);

    // Act
    connector.inbound.lock().unwrap().clear();
    tokio::time::timeout(Duration::from_secs(1), sup.wait_disconnected())
        .await
        .expect("reader notices the closed stream");

    // Assert
    assert_eq!(sup.state(), ConnectionState::Disconnected);
    assert!(!sup.is_attached());
    assert!(connector.transport(0).closed.load(Ordering::SeqCst));
    assert!(log.lock().unwrap().contains(&ClientEvent::Disconnected));
}

#[tokio::test]
async fn test_input_is_not_translated_while_disconnected() {
    let (sup, _connector, _log) = build(&[], ReconnectPolicy::default());

    let action = sup.dispatch(&InputSurfaceEvent::KeyDown(KeyEvent::new(
        "KeyA",
        "a",
        Modifiers::NONE,
    )));

    assert_eq!(action, rdp_input_core::DefaultAction::Allow);
    assert!(sup.snapshot().pressed_keys.is_empty());
}
