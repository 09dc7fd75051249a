use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Redraw cadence of the event loop.
pub const TICK_RATE_MS: u64 = 100;

/// Period of the session countdown.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Resize,
    /// Redraw tick, emitted when no other event arrives in time.
    Tick,
    /// One countdown second elapsed for the countdown armed with this generation.
    Countdown(u64),
}

/// Source of terminal events (keyboard, resize, countdown)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError>;
}

/// Production event source using crossterm. Its sender is shared with the
/// countdown so both feed one queue.
pub struct CrosstermEventSource {
    tx: Sender<DrillEvent>,
    rx: Receiver<DrillEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => DrillEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => DrillEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if key_tx.send(ev).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<DrillEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit and headless tests
pub struct TestEventSource {
    rx: Receiver<DrillEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DrillEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrillEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
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
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> DrillEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                DrillEvent::Tick
            }
        }
    }
}

/// Monotonic time source for per-question elapsed time.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.origin + offset
    }
}

/// A cancellable one-second schedule. Arming always cancels whatever was
/// armed before, and only events carrying the current generation count.
pub trait Countdown: Send {
    /// Start a fresh schedule and return its generation.
    fn arm(&mut self) -> u64;
    fn cancel(&mut self);
    fn is_armed(&self) -> bool;
    fn is_current(&self, generation: u64) -> bool;
}

/// Countdown backed by a thread that posts `DrillEvent::Countdown` into the
/// event queue once per period.
pub struct ThreadCountdown {
    tx: Sender<DrillEvent>,
    period: Duration,
    generation: Arc<AtomicU64>,
    armed: bool,
}

impl ThreadCountdown {
    pub fn new(tx: Sender<DrillEvent>) -> Self {
        Self::with_period(tx, COUNTDOWN_PERIOD)
    }

    pub fn with_period(tx: Sender<DrillEvent>, period: Duration) -> Self {
        Self {
            tx,
            period,
            generation: Arc::new(AtomicU64::new(0)),
            armed: false,
        }
    }
}

impl Countdown for ThreadCountdown {
    fn arm(&mut self) -> u64 {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let period = self.period;

        std::thread::spawn(move || loop {
            std::thread::sleep(period);
            if current.load(Ordering::SeqCst) != mine {
                break;
            }
            if tx.send(DrillEvent::Countdown(mine)).is_err() {
                break;
            }
        });

        self.armed = true;
        mine
    }

    fn cancel(&mut self) {
        // bumping the generation retires the running thread on its next wake
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn is_current(&self, generation: u64) -> bool {
        self.armed && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl Drop for ThreadCountdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Countdown that never fires on its own; tests drive ticks directly and
/// inspect how often it was armed and cancelled.
#[derive(Clone, Debug, Default)]
pub struct ManualCountdown {
    state: Arc<Mutex<ManualCountdownState>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ManualCountdownState {
    pub generation: u64,
    pub armed: bool,
    pub arms: usize,
    pub cancels: usize,
}

impl ManualCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ManualCountdownState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }
}

impl Countdown for ManualCountdown {
    fn arm(&mut self) -> u64 {
        match self.state.lock() {
            Ok(mut s) => {
                s.generation += 1;
                s.armed = true;
                s.arms += 1;
                s.generation
            }
            Err(_) => 0,
        }
    }

    fn cancel(&mut self) {
        if let Ok(mut s) = self.state.lock() {
            if s.armed {
                s.cancels += 1;
            }
            s.generation += 1;
            s.armed = false;
        }
    }

    fn is_armed(&self) -> bool {
        self.snapshot().armed
    }

    fn is_current(&self, generation: u64) -> bool {
        let s = self.snapshot();
        s.armed && s.generation == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), DrillEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(DrillEvent::Countdown(3)).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(10)));

        assert_matches!(runner.step(), DrillEvent::Countdown(3));
    }

    #[test]
    fn manual_clock_advances_shared_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        let start = view.now();

        clock.advance(Duration::from_secs(4));

        assert_eq!(view.now() - start, Duration::from_secs(4));
    }

    #[test]
    fn manual_countdown_rearm_retires_old_generation() {
        let mut countdown = ManualCountdown::new();
        let first = countdown.arm();
        assert!(countdown.is_current(first));

        countdown.cancel();
        let second = countdown.arm();

        assert!(!countdown.is_current(first));
        assert!(countdown.is_current(second));
        assert_eq!(countdown.snapshot().arms, 2);
        assert_eq!(countdown.snapshot().cancels, 1);
    }

    #[test]
    fn thread_countdown_posts_current_generation() {
        let (tx, rx) = mpsc::channel();
        let mut countdown = ThreadCountdown::with_period(tx, Duration::from_millis(5));
        let generation = countdown.arm();

        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_matches!(ev, DrillEvent::Countdown(g) if g == generation);
        assert!(countdown.is_current(generation));
    }

    #[test]
    fn thread_countdown_cancel_stops_acceptance() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = ThreadCountdown::with_period(tx, Duration::from_millis(5));
        let first = countdown.arm();
        let second = countdown.arm();

        assert!(!countdown.is_current(first));
        assert!(countdown.is_current(second));

        countdown.cancel();
        assert!(!countdown.is_armed());
        assert!(!countdown.is_current(second));
    }
}
