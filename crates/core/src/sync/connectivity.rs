use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

pub type ConnectivityListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Handle returned by [`NetworkMonitor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Process-wide online flag fed by platform reachability events.
///
/// The platform-reported transition is trusted as-is. Listeners run
/// synchronously inside [`NetworkMonitor::set_online`] and only when the value
/// actually changes.
pub struct NetworkMonitor {
    online: AtomicBool,
    listeners: RwLock<Vec<(SubscriptionId, ConnectivityListener)>>,
    next_id: AtomicU64,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: AtomicBool::new(initially_online),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Records a platform reachability event. Returns whether the state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }
        debug!(
            "[Connectivity] {} -> {}",
            state_label(previous),
            state_label(online)
        );

        // Clone out so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<ConnectivityListener> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(online);
        }
        true
    }

    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

fn state_label(online: bool) -> &'static str {
    if online {
        "online"
    } else {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn notifies_only_on_transitions() {
        let monitor = NetworkMonitor::new(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        monitor.subscribe(move |online| sink.lock().unwrap().push(online));

        assert!(!monitor.set_online(false));
        assert!(monitor.set_online(true));
        assert!(!monitor.set_online(true));
        assert!(monitor.set_online(false));

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        assert!(!monitor.is_online());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let monitor = NetworkMonitor::new(true);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let id = monitor.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        monitor.set_online(false);
        assert!(monitor.unsubscribe(id));
        assert!(!monitor.unsubscribe(id));
        monitor.set_online(true);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
