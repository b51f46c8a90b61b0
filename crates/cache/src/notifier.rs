//! Per-key change notification
//!
//! Each observed key gets one `watch` channel shared by all of its observers.
//! A channel only ever holds the latest value, so a slow observer sees the
//! most recent state rather than every intermediate write.

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::watch;
use tracing::trace;

#[derive(Debug, Default)]
pub struct ChangeNotifier {
    channels: DashMap<String, watch::Sender<Option<String>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `key`, seeding its channel with `current` if nobody observes it yet
    ///
    /// Callers hold the key's lock so `current` cannot race a write.
    pub fn subscribe(&self, key: &str, current: Option<String>) -> watch::Receiver<Option<String>> {
        match self.channels.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                let sender = entry.get();
                if sender.receiver_count() == 0 {
                    sender.send_replace(current);
                }
                sender.subscribe()
            }
            Entry::Vacant(entry) => entry.insert(watch::channel(current).0).subscribe(),
        }
    }

    /// Send the new value of `key` to its observers, if any
    ///
    /// A channel whose observers have all gone away is dropped here.
    pub fn publish(&self, key: &str, value: Option<String>) {
        let Some(sender) = self.channels.get(key) else {
            return;
        };
        if sender.receiver_count() == 0 {
            drop(sender);
            self.channels
                .remove_if(key, |_, sender| sender.receiver_count() == 0);
            trace!(key = %key, "Dropped channel without observers");
            return;
        }
        sender.send_replace(value);
    }

    pub fn is_observed(&self, key: &str) -> bool {
        self.channels
            .get(key)
            .is_some_and(|sender| sender.receiver_count() > 0)
    }

    /// Publish absence on every channel
    pub fn reset_all(&self) {
        for sender in self.channels.iter() {
            sender.send_replace(None);
        }
    }

    /// Number of keys with a live channel
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_share_one_channel() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe("k", Some("v1".into()));
        let second = notifier.subscribe("k", Some("ignored".into()));

        assert_eq!(notifier.channel_count(), 1);
        assert_eq!(first.borrow().as_deref(), Some("v1"));
        assert_eq!(second.borrow().as_deref(), Some("v1"));

        notifier.publish("k", Some("v2".into()));
        assert_eq!(first.borrow().as_deref(), Some("v2"));
        assert_eq!(second.borrow().as_deref(), Some("v2"));
    }

    #[test]
    fn test_publish_without_observers_is_a_no_op() {
        let notifier = ChangeNotifier::new();
        notifier.publish("k", Some("v".into()));
        assert_eq!(notifier.channel_count(), 0);
        assert!(!notifier.is_observed("k"));
    }

    #[test]
    fn test_abandoned_channel_is_dropped_on_publish() {
        let notifier = ChangeNotifier::new();
        let receiver = notifier.subscribe("k", None);
        assert!(notifier.is_observed("k"));
        drop(receiver);

        notifier.publish("k", Some("v".into()));
        assert_eq!(notifier.channel_count(), 0);
    }

    #[test]
    fn test_reset_all_publishes_absence() {
        let notifier = ChangeNotifier::new();
        let a = notifier.subscribe("a", Some("1".into()));
        let b = notifier.subscribe("b", Some("2".into()));

        notifier.reset_all();

        assert_eq!(*a.borrow(), None);
        assert_eq!(*b.borrow(), None);
    }
}
