//! Loading signal bus
//!
//! Counts in-flight requests that want the global loading indicator and
//! notifies subscribers only when the count crosses the zero boundary.
//! A [`LoadingBus`] is an explicit instance: create one per client (or per
//! test) and share it by cloning.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default time after which the indicator hides itself
pub const DEFAULT_SAFETY_TIMEOUT: Duration = Duration::from_secs(30);

type Callback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct BusState {
    count: usize,
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
    // Edges waiting for delivery, in the order they happened under the lock.
    pending: VecDeque<bool>,
    delivering: bool,
}

/// Process-wide (or test-local) visibility counter
#[derive(Clone, Default)]
pub struct LoadingBus {
    state: Arc<Mutex<BusState>>,
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoadingBus {
    /// Create an isolated bus with a zero counter and no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A request that wants the indicator started
    pub fn increment(&self) {
        self.transition(|state| {
            state.count += 1;
            (state.count == 1).then_some(true)
        });
    }

    /// A request that wanted the indicator finished; clamps at zero
    pub fn decrement(&self) {
        self.transition(|state| {
            if state.count == 0 {
                return None;
            }
            state.count -= 1;
            (state.count == 0).then_some(false)
        });
    }

    /// Force the counter to zero
    pub fn reset(&self) {
        self.transition(|state| {
            let previous = std::mem::take(&mut state.count);
            (previous > 0).then(|| {
                debug!(previous, "Loading bus reset");
                false
            })
        });
    }

    /// Increment now and settle the count when the returned guard goes away
    ///
    /// The guard decrements on drop, so a request future that is cancelled
    /// mid-flight still releases its slot.
    pub fn track(&self) -> LoadingGuard {
        self.increment();
        LoadingGuard {
            bus: Some(self.clone()),
        }
    }

    /// Register a callback for visibility transitions
    ///
    /// The callback fires with `true` when the count goes 0 → 1 and with
    /// `false` when it returns to 0. It is deregistered when the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Arc::new(callback)));
        Subscription {
            bus: Arc::downgrade(&self.state),
            id: Some(id),
        }
    }

    /// Current number of in-flight requests
    #[must_use]
    pub fn count(&self) -> usize {
        lock(&self.state).count
    }

    /// Whether the indicator should be shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.count() > 0
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// Drop every subscriber and zero the counter without notifying
    pub fn dispose(&self) {
        let mut state = lock(&self.state);
        state.count = 0;
        state.pending.clear();
        state.subscribers.clear();
    }

    // Edges are queued under the lock and drained by a single deliverer, so
    // subscribers see them in counter order even across threads. Callbacks
    // run outside the lock; a re-entrant call only queues its edge.
    fn transition(&self, update: impl FnOnce(&mut BusState) -> Option<bool>) {
        let mut state = lock(&self.state);
        let Some(visible) = update(&mut state) else {
            return;
        };
        state.pending.push_back(visible);
        if state.delivering {
            return;
        }
        state.delivering = true;
        let delivery = Delivery(&self.state);

        loop {
            let Some(visible) = state.pending.pop_front() else {
                state.delivering = false;
                std::mem::forget(delivery);
                return;
            };
            let listeners = snapshot(&state);
            drop(state);
            emit(&listeners, visible);
            state = lock(&self.state);
        }
    }
}

// Releases the deliverer role if a callback panics mid-delivery.
struct Delivery<'a>(&'a Mutex<BusState>);

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.0);
        state.delivering = false;
        state.pending.clear();
    }
}

/// Holds one slot of a [`LoadingBus`] for an in-flight request
///
/// Created by [`LoadingBus::track`]. Dropping it decrements; [`reset`]
/// zeroes the whole bus instead.
///
/// [`reset`]: LoadingGuard::reset
#[must_use = "dropping the guard releases the loading slot immediately"]
pub struct LoadingGuard {
    bus: Option<LoadingBus>,
}

impl LoadingGuard {
    /// A guard that holds no slot, for requests that skip the indicator
    #[must_use]
    pub fn untracked() -> Self {
        Self { bus: None }
    }

    /// Release the slot now
    pub fn finish(mut self) {
        if let Some(bus) = self.bus.take() {
            bus.decrement();
        }
    }

    /// Zero the bus instead of releasing a single slot
    pub fn reset(mut self) {
        if let Some(bus) = self.bus.take() {
            bus.reset();
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.take() {
            bus.decrement();
        }
    }
}

impl std::fmt::Debug for LoadingBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("LoadingBus")
            .field("count", &state.count)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

fn snapshot(state: &BusState) -> Vec<Callback> {
    state.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
}

// Runs outside the lock so callbacks may call back into the bus.
fn emit(listeners: &[Callback], visible: bool) {
    for listener in listeners {
        listener(visible);
    }
}

/// Handle returned by [`LoadingBus::subscribe`]
#[must_use = "dropping the subscription deregisters the callback"]
pub struct Subscription {
    bus: Weak<Mutex<BusState>>,
    id: Option<u64>,
}

impl Subscription {
    /// Deregister the callback now
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        let Some(id) = self.id.take() else { return };
        if let Some(state) = self.bus.upgrade() {
            lock(&state).subscribers.retain(|(sid, _)| *sid != id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

struct IndicatorShared {
    visible: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
    safety_timeout: Duration,
    sink: Box<dyn Fn(bool) + Send + Sync>,
}

impl IndicatorShared {
    fn cancel_timer(&self) {
        let pending = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        (self.sink)(visible);
    }
}

/// Global loading indicator state driven by a [`LoadingBus`]
///
/// Mirrors bus visibility into a local flag and forwards every change to a
/// sink. While visible, a safety timer hides the indicator if the matching
/// hide notification never arrives.
pub struct LoadingIndicator {
    shared: Arc<IndicatorShared>,
    _subscription: Subscription,
}

impl LoadingIndicator {
    /// Attach with the default 30 second safety timeout
    pub fn attach<F>(bus: &LoadingBus, sink: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self::attach_with_timeout(bus, DEFAULT_SAFETY_TIMEOUT, sink)
    }

    /// Attach with a custom safety timeout
    pub fn attach_with_timeout<F>(bus: &LoadingBus, safety_timeout: Duration, sink: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let shared = Arc::new(IndicatorShared {
            visible: AtomicBool::new(false),
            timer: Mutex::new(None),
            safety_timeout,
            sink: Box::new(sink),
        });

        let weak = Arc::downgrade(&shared);
        let subscription = bus.subscribe(move |visible| {
            if let Some(shared) = weak.upgrade() {
                on_visibility(&shared, visible);
            }
        });

        Self {
            shared,
            _subscription: subscription,
        }
    }

    /// Whether the indicator is currently shown
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.shared.visible.load(Ordering::SeqCst)
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.shared.cancel_timer();
    }
}

fn on_visibility(shared: &Arc<IndicatorShared>, visible: bool) {
    shared.cancel_timer();
    shared.set_visible(visible);

    if !visible {
        return;
    }

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        debug!("No tokio runtime, loading safety timer not armed");
        return;
    };

    let weak = Arc::downgrade(shared);
    let timeout = shared.safety_timeout;
    let handle = runtime.spawn(async move {
        tokio::time::sleep(timeout).await;
        if let Some(shared) = weak.upgrade() {
            warn!(timeout_secs = timeout.as_secs(), "Loading indicator forced hidden");
            shared.set_visible(false);
        }
    });
    *shared.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
}
