use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::store::{MemoryStore, NotificationStore};
use super::toast::{Toast, ToastSlot};
use super::{CenterEvent, Notification, NotificationSettings, Severity};

const EVENT_CAPACITY: usize = 64;

struct Shared {
    state: Mutex<CenterState>,
    store: Arc<dyn NotificationStore>,
    events: broadcast::Sender<CenterEvent>,
    settings: NotificationSettings,
}

#[derive(Default)]
struct PanelState {
    open: bool,
    /// Bumped every time the auto-read timer is re-armed so a stale timer is ignored.
    generation: u64,
    auto_read: Option<JoinHandle<()>>,
}

struct CenterState {
    /// Most recent first.
    log: VecDeque<Notification>,
    toast: ToastSlot,
    panel: PanelState,
}

/// Cheap-to-clone handle to the process's notification center.
///
/// Timers (toast dismissal, panel auto-read) run as Tokio tasks holding only
/// a weak reference, so dropping the last handle stops them.
#[derive(Clone)]
pub struct NotificationCenter {
    shared: Arc<Shared>,
}

impl NotificationCenter {
    /// Builds the center and restores the log persisted in `store`.
    /// An unreadable store is logged and treated as empty.
    pub fn load(settings: NotificationSettings, store: Arc<dyn NotificationStore>) -> Self {
        let mut log: VecDeque<Notification> = match store.load() {
            Ok(items) => items.into(),
            Err(e) => {
                warn!("Discarding unreadable notification log: {e}");
                VecDeque::new()
            }
        };
        log.truncate(settings.max_notifications);
        debug!("Restored {} notifications", log.len());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CenterState {
                    log,
                    toast: ToastSlot::default(),
                    panel: PanelState::default(),
                }),
                store,
                events,
                settings,
            }),
        }
    }

    /// A center backed by a fresh in-memory store.
    pub fn in_memory(settings: NotificationSettings) -> Self {
        Self::load(settings, Arc::new(MemoryStore::new()))
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.shared.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CenterEvent> {
        self.shared.events.subscribe()
    }

    // ── Log ────────────────────────────────────────────────────────────────

    /// Records a notification at the front of the log, evicting from the
    /// back beyond the cap, and shows it as the active toast.
    pub fn notify(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification::new(severity, title, message);
        let toast = Toast::from(&notification);

        {
            let mut state = self.lock();
            state.log.push_front(notification.clone());
            while state.log.len() > self.shared.settings.max_notifications {
                if let Some(evicted) = state.log.pop_back() {
                    debug!("Evicted notification {}", evicted.id);
                }
            }
            self.persist(&state);

            let generation = state.toast.show(toast.clone());
            if let Some(timer) = self.spawn_after(self.shared.settings.toast_duration, move |c| {
                c.expire_toast(generation)
            }) {
                state.toast.arm(timer);
            }

            if state.panel.open {
                self.arm_auto_read(&mut state);
            }
        }

        debug!(
            "Notification [{}] {}: {}",
            notification.severity.as_str(),
            notification.title,
            notification.message
        );
        self.emit(CenterEvent::Added(notification.clone()));
        self.emit(CenterEvent::ToastShown(toast));
        notification
    }

    pub fn success(&self, title: &str, message: impl Into<String>) -> Notification {
        self.notify(Severity::Success, title, message)
    }

    pub fn error(&self, title: &str, message: impl Into<String>) -> Notification {
        self.notify(Severity::Error, title, message)
    }

    pub fn warning(&self, title: &str, message: impl Into<String>) -> Notification {
        self.notify(Severity::Warning, title, message)
    }

    pub fn info(&self, title: &str, message: impl Into<String>) -> Notification {
        self.notify(Severity::Info, title, message)
    }

    /// Snapshot of the log, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().log.iter().cloned().collect()
    }

    /// Entries newer than `marker`, oldest first. An evicted or missing
    /// marker yields the whole log.
    pub fn raised_since(&self, marker: Option<Uuid>) -> Vec<Notification> {
        let state = self.lock();
        let mut raised: Vec<Notification> = state
            .log
            .iter()
            .take_while(|n| Some(n.id) != marker)
            .cloned()
            .collect();
        raised.reverse();
        raised
    }

    pub fn unread_count(&self) -> usize {
        self.lock().log.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&self, id: Uuid) -> bool {
        let changed = {
            let mut state = self.lock();
            match state.log.iter_mut().find(|n| n.id == id && !n.read) {
                Some(n) => {
                    n.read = true;
                    self.persist(&state);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.emit(CenterEvent::Read(vec![id]));
        }
        changed
    }

    /// Marks every unread entry read; returns how many changed.
    pub fn mark_all_read(&self) -> usize {
        let ids = {
            let mut state = self.lock();
            self.mark_unread(&mut state)
        };
        let count = ids.len();
        if count > 0 {
            self.emit(CenterEvent::Read(ids));
        }
        count
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = {
            let mut state = self.lock();
            let before = state.log.len();
            state.log.retain(|n| n.id != id);
            let removed = state.log.len() != before;
            if removed {
                self.persist(&state);
            }
            removed
        };
        if removed {
            self.emit(CenterEvent::Removed(id));
        }
        removed
    }

    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.log.clear();
            self.persist(&state);
        }
        self.emit(CenterEvent::Cleared);
    }

    // ── Toast ──────────────────────────────────────────────────────────────

    pub fn active_toast(&self) -> Option<Toast> {
        self.lock().toast.current().cloned()
    }

    pub fn dismiss_toast(&self) {
        let dismissed = self.lock().toast.dismiss();
        if let Some(toast) = dismissed {
            self.emit(CenterEvent::ToastDismissed(toast.notification_id));
        }
    }

    fn expire_toast(&self, generation: u64) {
        let expired = self.lock().toast.expire(generation);
        if let Some(toast) = expired {
            self.emit(CenterEvent::ToastDismissed(toast.notification_id));
        }
    }

    // ── Panel ──────────────────────────────────────────────────────────────

    /// Opens the panel. If unread entries exist, they are all marked read
    /// once `auto_read_delay` passes with the panel still open. A
    /// notification arriving while the panel is open restarts the delay.
    pub fn open_panel(&self) {
        let mut state = self.lock();
        state.panel.open = true;
        self.arm_auto_read(&mut state);
    }

    fn arm_auto_read(&self, state: &mut CenterState) {
        state.panel.generation += 1;
        if let Some(timer) = state.panel.auto_read.take() {
            timer.abort();
        }

        if state.log.iter().any(|n| !n.read) {
            let generation = state.panel.generation;
            state.panel.auto_read = self.spawn_after(self.shared.settings.auto_read_delay, move |c| {
                c.auto_read(generation)
            });
        }
    }

    pub fn close_panel(&self) {
        let mut state = self.lock();
        state.panel.open = false;
        if let Some(timer) = state.panel.auto_read.take() {
            timer.abort();
        }
    }

    /// Returns the new open state.
    pub fn toggle_panel(&self) -> bool {
        if self.is_panel_open() {
            self.close_panel();
            false
        } else {
            self.open_panel();
            true
        }
    }

    pub fn is_panel_open(&self) -> bool {
        self.lock().panel.open
    }

    fn auto_read(&self, generation: u64) {
        let ids = {
            let mut state = self.lock();
            if !state.panel.open || state.panel.generation != generation {
                return;
            }
            state.panel.auto_read = None;
            self.mark_unread(&mut state)
        };
        if !ids.is_empty() {
            debug!("Auto-marked {} notifications read", ids.len());
            self.emit(CenterEvent::Read(ids));
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn mark_unread(&self, state: &mut CenterState) -> Vec<Uuid> {
        let ids: Vec<Uuid> = state
            .log
            .iter_mut()
            .filter(|n| !n.read)
            .map(|n| {
                n.read = true;
                n.id
            })
            .collect();
        if !ids.is_empty() {
            self.persist(state);
        }
        ids
    }

    fn lock(&self) -> MutexGuard<'_, CenterState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes the log to the durable store. Failures are logged, never raised.
    fn persist(&self, state: &CenterState) {
        let snapshot: Vec<Notification> = state.log.iter().cloned().collect();
        if let Err(e) = self.shared.store.save(&snapshot) {
            warn!("Failed to persist notifications: {e}");
        }
    }

    fn emit(&self, event: CenterEvent) {
        // No subscribers is fine.
        let _ = self.shared.events.send(event);
    }

    /// Runs `action` after `delay` on the current Tokio runtime. Without a
    /// runtime the timer is skipped and the caller keeps manual control.
    fn spawn_after<F>(&self, delay: Duration, action: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(NotificationCenter) + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime; notification timer not started");
                return None;
            }
        };
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                action(NotificationCenter { shared });
            }
        }))
    }

    /// Drains `Notifier` requests into this center until every sender is gone.
    pub async fn listen(self, mut requests: mpsc::UnboundedReceiver<NotifyRequest>) {
        while let Some(request) = requests.recv().await {
            self.notify(request.severity, request.title, request.message);
        }
        debug!("Notifier channel closed");
    }
}

/// A "show a notification" request sent over a `Notifier` channel.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyRequest {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Typed sender for components that raise notifications without holding
/// the center itself. Pair with `NotificationCenter::listen`.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<NotifyRequest>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotifyRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns `false` once the listening center is gone.
    pub fn send(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        self.tx
            .send(NotifyRequest {
                severity,
                title: title.into(),
                message: message.into(),
            })
            .is_ok()
    }
}
