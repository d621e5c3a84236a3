use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::timer::{TickHandle, TickId, TickScheduler};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick(TickId),
}

/// Source of host events (keyboard, resize, ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Sender feeding this source, handed to the tick scheduler
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let sent = match event::read() {
                Ok(CtEvent::Key(key)) => key_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => key_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    tracing::error!("terminal event read failed: {e}");
                    break;
                }
            };
            if sent.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Spawns one thread per tick stream, each sending `AppEvent::Tick` into the
/// host channel until its handle is cancelled or the channel closes.
pub struct ChannelTickScheduler<T: Ticker> {
    tx: Sender<AppEvent>,
    ticker: T,
}

impl<T: Ticker> ChannelTickScheduler<T> {
    pub fn new(tx: Sender<AppEvent>, ticker: T) -> Self {
        Self { tx, ticker }
    }
}

impl<T: Ticker> TickScheduler for ChannelTickScheduler<T> {
    fn schedule(&mut self) -> TickHandle {
        let handle = TickHandle::new(TickId::next());
        let id = handle.id();
        let cancelled = handle.cancel_flag();
        let tx = self.tx.clone();
        let interval = self.ticker.interval();

        std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(AppEvent::Tick(id)).is_err() {
                break;
            }
        });

        handle
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.event_source
    }

    /// Blocks up to the poll interval; `None` if nothing arrived
    pub fn step(&self) -> Option<AppEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
