//! ConnectionSupervisor: transport lifecycle, reconnect backoff, and the
//! inbound data path.
//!
//! # States
//!
//! ```text
//! Idle ──connect──▶ Connecting ──ok──▶ Connected ──disconnect / remote close──▶ Disconnected
//!                        │
//!                        └──err──▶ Failed ──(auto-reconnect, budget left: sleep)──▶ Connecting
//!                                     └──(otherwise)──▶ error returned to the caller
//! ```
//!
//! The retry delay for the n-th retry is `min(base × 2^(n−1), cap)`.  The
//! attempt counter resets on every successful connect, and also when a
//! failure is finally returned, so a later manual `connect()` gets a fresh
//! budget.
//!
//! # Concurrency
//!
//! The input surface sits behind a `std::sync::Mutex` that is never held
//! across an `.await`, so key handling keeps working while `connect()` is
//! asleep in a backoff delay.  Lock order is surface, then engine, then
//! transport slot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rdp_input_core::{
    DefaultAction, InputSink, InputSurfaceEvent, KeyTranslator, KeyboardLayout, LockState,
    ReconnectAttemptCounter, ReconnectPolicy, TranslatorSnapshot,
};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::engine_sink::{
    flush_engine_output, EngineError, EngineNotice, EngineSink, OutputTransport, ProtocolEngine,
    TransportError, TransportSlot,
};
use super::events::{ClientEvent, EventBus};
use super::input_surface::InputSurface;

/// Lifecycle state of the supervised connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

/// An open connection: the outbound half plus a stream of inbound frames.
///
/// The inbound channel closing means the remote side went away.
pub struct TransportLink {
    pub transport: Arc<dyn OutputTransport>,
    pub inbound: mpsc::Receiver<Vec<u8>>,
}

/// Opens transports.  The WebSocket implementation lives in
/// `infrastructure::ws_transport`; tests script their own.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError>;
}

/// Why `connect()` did not end in the Connected state.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("already connected")]
    AlreadyConnected,
    #[error("another connection attempt is in progress")]
    InProgress,
    #[error("connection attempt cancelled by disconnect")]
    Cancelled,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("session handshake failed: {0}")]
    Handshake(#[source] EngineError),
}

/// Static settings for one supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub url: String,
    pub layout: KeyboardLayout,
    pub policy: ReconnectPolicy,
}

/// Clears the in-flight flag however `connect()` exits, including when its
/// future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ConnectionSupervisor {
    options: SupervisorOptions,
    connector: Arc<dyn Connector>,
    engine: Arc<dyn ProtocolEngine>,
    slot: Arc<TransportSlot>,
    surface: Mutex<InputSurface>,
    events: Arc<EventBus>,
    state: watch::Sender<ConnectionState>,
    attempts: Mutex<ReconnectAttemptCounter>,
    reader: Mutex<Option<JoinHandle<()>>>,
    in_flight: AtomicBool,
    /// Bumped by every `disconnect()`; a pending `connect()` that sees it
    /// change gives up.
    epoch: AtomicU64,
    cancel: Notify,
}

impl ConnectionSupervisor {
    /// Builds a supervisor with its own translator and transport slot.
    pub fn new(
        options: SupervisorOptions,
        connector: Arc<dyn Connector>,
        engine: Arc<dyn ProtocolEngine>,
        events: Arc<EventBus>,
    ) -> Arc<Self> {
        let slot = Arc::new(TransportSlot::new());
        let sink: Arc<dyn InputSink> =
            Arc::new(EngineSink::new(Arc::clone(&engine), Arc::clone(&slot)));
        let surface = InputSurface::new(KeyTranslator::new(sink));
        let (state, _) = watch::channel(ConnectionState::Idle);
        let attempts = ReconnectAttemptCounter::new(options.policy.max_attempts);

        Arc::new(Self {
            options,
            connector,
            engine,
            slot,
            surface: Mutex::new(surface),
            events,
            state,
            attempts: Mutex::new(attempts),
            reader: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            cancel: Notify::new(),
        })
    }

    // ── Connect ───────────────────────────────────────────────────────────────

    /// Connects, retrying with exponential backoff when the policy allows.
    ///
    /// # Errors
    ///
    /// - [`ConnectError::AlreadyConnected`] / [`ConnectError::InProgress`]
    ///   if a session exists or another `connect()` is running.
    /// - [`ConnectError::Cancelled`] if `disconnect()` is called meanwhile.
    /// - The last attempt's error once retries are disabled or exhausted.
    pub async fn connect(self: &Arc<Self>) -> Result<(), ConnectError> {
        if self.state() == ConnectionState::Connected {
            return Err(ConnectError::AlreadyConnected);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(ConnectError::InProgress);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let result = self.connect_with_backoff().await;
        if result.is_err() {
            self.attempts().reset();
        }
        result
    }

    async fn connect_with_backoff(self: &Arc<Self>) -> Result<(), ConnectError> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        loop {
            self.state.send_replace(ConnectionState::Connecting);
            info!("connecting to {}", self.options.url);

            let outcome = self.open_link(epoch).await;

            if self.epoch.load(Ordering::SeqCst) != epoch {
                if let Ok(link) = outcome {
                    self.slot.take();
                    link.transport.close();
                }
                return Err(ConnectError::Cancelled);
            }

            let error = match outcome {
                Ok(link) => {
                    self.on_connected(link);
                    return Ok(());
                }
                Err(e) => e,
            };

            self.state.send_replace(ConnectionState::Failed);
            warn!("connection attempt to {} failed: {error}", self.options.url);
            self.events.emit(&ClientEvent::Error {
                message: error.to_string(),
            });

            let Some((attempt, delay)) = self.next_retry() else {
                return Err(error);
            };
            warn!(
                "reconnecting in {} ms (retry {attempt} of {})",
                delay.as_millis(),
                self.options.policy.max_attempts
            );

            let cancelled = self.cancel.notified();
            tokio::pin!(cancelled);
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return Err(ConnectError::Cancelled);
            }
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = &mut cancelled => {}
            }
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!("backoff interrupted by disconnect");
                return Err(ConnectError::Cancelled);
            }
        }
    }

    /// Consumes one retry from the budget, if retrying is allowed at all.
    fn next_retry(&self) -> Option<(u32, std::time::Duration)> {
        let policy = &self.options.policy;
        if !policy.auto_reconnect {
            return None;
        }
        let attempt = self.attempts().try_increment()?;
        Some((attempt, policy.delay_for_attempt(attempt)))
    }

    /// Opens the transport, installs it, and sends the first packet.
    ///
    /// A link that opens after `disconnect()` is closed untouched.
    async fn open_link(&self, epoch: u64) -> Result<TransportLink, ConnectError> {
        let link = self.connector.connect(&self.options.url).await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding link to {} opened after disconnect", self.options.url);
            link.transport.close();
            return Err(ConnectError::Cancelled);
        }
        self.slot.install(Arc::clone(&link.transport));

        let handshake = self
            .engine
            .write_first_packet()
            .map_err(ConnectError::Handshake)
            .and_then(|()| {
                flush_engine_output(self.engine.as_ref(), &self.slot).map_err(ConnectError::from)
            });

        if let Err(e) = handshake {
            self.slot.take();
            self.engine.reset_output_data();
            link.transport.close();
            return Err(e);
        }
        Ok(link)
    }

    fn on_connected(self: &Arc<Self>, link: TransportLink) {
        self.attempts().reset();
        self.state.send_replace(ConnectionState::Connected);
        self.surface().attach();

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.read_loop(link.inbound).await });
        if let Some(previous) = self.reader().replace(handle) {
            previous.abort();
        }

        info!(
            "connected to {} (keyboard layout {})",
            self.options.url, self.options.layout
        );
        self.events.emit(&ClientEvent::Connected {
            url: self.options.url.clone(),
        });
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    async fn read_loop(self: Arc<Self>, mut inbound: mpsc::Receiver<Vec<u8>>) {
        while let Some(frame) = inbound.recv().await {
            self.handle_inbound(&frame);
        }
        debug!("inbound stream from {} ended", self.options.url);
        self.handle_remote_close();
    }

    /// Feeds one server frame to the engine, acts on what it reports, and
    /// sends any response the engine queued.
    pub fn handle_inbound(&self, frame: &[u8]) {
        match self.engine.process_input_data(frame) {
            Ok(notices) => {
                for notice in notices {
                    self.apply_notice(notice);
                }
            }
            Err(e) => {
                error!("failed to process server data: {e}");
                self.events.emit(&ClientEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        if let Err(e) = flush_engine_output(self.engine.as_ref(), &self.slot) {
            error!("failed to send engine response: {e}");
            self.events.emit(&ClientEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn apply_notice(&self, notice: EngineNotice) {
        match notice {
            EngineNotice::LockStateReport(locks) => {
                debug!("server reported lock mask {:#05b}", locks.mask());
                self.surface().translator_mut().force_sync_locks(locks);
            }
            EngineNotice::Log(message) => {
                self.events.emit(&ClientEvent::Log { message });
            }
        }
    }

    fn handle_remote_close(&self) {
        let closed_here = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if !closed_here {
            return;
        }

        if let Some(transport) = self.slot.take() {
            transport.close();
        }
        self.surface().detach();
        info!("connection to {} closed by remote", self.options.url);
        self.events.emit(&ClientEvent::Disconnected);
    }

    // ── Disconnect ────────────────────────────────────────────────────────────

    /// Detaches the input surface (releasing every held key while the
    /// transport is still installed), closes the transport, and moves to
    /// Disconnected.  Also cancels a `connect()` that is waiting to retry.
    /// Idempotent.
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel.notify_waiters();

        self.surface().detach();

        if let Some(handle) = self.reader().take() {
            handle.abort();
        }
        if let Some(transport) = self.slot.take() {
            transport.close();
        }

        let previous = self.state.send_replace(ConnectionState::Disconnected);
        if previous == ConnectionState::Connected {
            info!("disconnected from {}", self.options.url);
            self.events.emit(&ClientEvent::Disconnected);
        }
    }

    /// Resolves once the state is Disconnected.
    pub async fn wait_disconnected(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx
            .wait_for(|state| *state == ConnectionState::Disconnected)
            .await;
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Routes an input-surface event; returns the default-action verdict.
    pub fn dispatch(&self, event: &InputSurfaceEvent) -> DefaultAction {
        self.surface().dispatch(event)
    }

    pub fn send_key_event(&self, scancode: u32, pressed: bool) {
        self.surface().translator().send_key_event(scancode, pressed);
    }

    pub fn send_unicode_event(&self, codepoint: u32, pressed: bool) {
        self.surface()
            .translator()
            .send_unicode_event(codepoint, pressed);
    }

    pub fn force_sync_locks(&self, locks: LockState) {
        self.surface().translator_mut().force_sync_locks(locks);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Retries consumed by the `connect()` currently in progress.
    pub fn attempt_count(&self) -> u32 {
        self.attempts().count()
    }

    pub fn snapshot(&self) -> TranslatorSnapshot {
        self.surface().snapshot()
    }

    pub fn is_attached(&self) -> bool {
        self.surface().is_attached()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn url(&self) -> &str {
        &self.options.url
    }

    fn surface(&self) -> MutexGuard<'_, InputSurface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attempts(&self) -> MutexGuard<'_, ReconnectAttemptCounter> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reader(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
