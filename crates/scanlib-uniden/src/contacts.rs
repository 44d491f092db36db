//! Signal-lock tracking and the contact log.
//!
//! A contact begins when a decoded status reports a signal after a quiet
//! period. [`ContactTracker`] keeps its own lock state and leaves the
//! [`ScannerStatus`] untouched, so the decoder stays the only writer of
//! the snapshot.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use scanlib_core::ScannerStatus;

/// Number of contacts kept before the oldest is dropped.
pub const DEFAULT_CONTACT_LOG_SIZE: usize = 30;

/// One signal lock, captured from the status at the moment it began.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactLogEntry {
    pub lock_time: SystemTime,
    pub frequency_mhz: f64,
    pub modulation: String,
    pub screen_kind: String,
    pub system_name: String,
    pub channel_name: String,
    pub talkgroup_id: String,
    pub site_name: String,
    pub rssi_label: String,
}

impl ContactLogEntry {
    pub fn from_status(status: &ScannerStatus, lock_time: SystemTime) -> Self {
        Self {
            lock_time,
            frequency_mhz: status.frequency_mhz,
            modulation: status.modulation.clone(),
            screen_kind: status.screen_kind.clone(),
            system_name: status.system_name.clone(),
            channel_name: status.channel_name.clone(),
            talkgroup_id: status.talkgroup_id.clone(),
            site_name: status.site_name.clone(),
            rssi_label: status.rssi_label.clone(),
        }
    }

    /// Time since the lock began, measured against `now`.
    ///
    /// Zero if `now` is earlier than the lock time.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.lock_time).unwrap_or_default()
    }
}

/// Watches successive statuses and logs each new signal lock.
#[derive(Debug, Clone)]
pub struct ContactTracker {
    log: VecDeque<ContactLogEntry>,
    capacity: usize,
    locked: bool,
    last_change: Option<SystemTime>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CONTACT_LOG_SIZE)
    }

    /// A tracker keeping at most `capacity` contacts (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            log: VecDeque::with_capacity(capacity),
            capacity,
            locked: false,
            last_change: None,
        }
    }

    /// Feed the latest status. Returns the new entry when a lock begins.
    pub fn process(&mut self, status: &ScannerStatus) -> Option<&ContactLogEntry> {
        self.process_at(status, SystemTime::now())
    }

    /// [`process`](Self::process) with an explicit clock reading.
    pub fn process_at(
        &mut self,
        status: &ScannerStatus,
        now: SystemTime,
    ) -> Option<&ContactLogEntry> {
        let signal = status.has_signal();

        if signal && !self.locked {
            self.locked = true;
            self.last_change = Some(now);
            if self.log.len() == self.capacity {
                self.log.pop_front();
            }
            self.log.push_back(ContactLogEntry::from_status(status, now));
            return self.log.back();
        }

        if !signal && self.locked {
            self.locked = false;
            self.last_change = Some(now);
        }
        None
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// When the lock state last flipped.
    pub fn last_lock_change(&self) -> Option<SystemTime> {
        self.last_change
    }

    /// Logged contacts, oldest first.
    pub fn contacts(&self) -> impl Iterator<Item = &ContactLogEntry> {
        self.log.iter()
    }

    pub fn latest(&self) -> Option<&ContactLogEntry> {
        self.log.back()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.locked = false;
        self.last_change = None;
    }
}

impl Default for ContactTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_with_rssi(rssi: i32, channel: &str) -> ScannerStatus {
        let mut status = ScannerStatus::new();
        status.rssi_numeric = rssi;
        status.rssi_label = format!("S{rssi}");
        status.channel_name = channel.into();
        status.frequency_mhz = 154.28;
        status
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn lock_creates_one_entry() {
        let mut tracker = ContactTracker::new();
        let entry = tracker
            .process_at(&status_with_rssi(3, "Dispatch"), at(100))
            .cloned()
            .unwrap();
        assert_eq!(entry.channel_name, "Dispatch");
        assert_eq!(entry.rssi_label, "S3");
        assert_eq!(entry.lock_time, at(100));
        assert!(tracker.is_locked());

        // Staying locked logs nothing new.
        assert!(tracker
            .process_at(&status_with_rssi(5, "Dispatch"), at(101))
            .is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn drop_then_relock_logs_again() {
        let mut tracker = ContactTracker::new();
        tracker.process_at(&status_with_rssi(3, "A"), at(1));
        assert!(tracker.process_at(&status_with_rssi(0, "A"), at(2)).is_none());
        assert!(!tracker.is_locked());
        assert_eq!(tracker.last_lock_change(), Some(at(2)));

        let entry = tracker.process_at(&status_with_rssi(2, "B"), at(3));
        assert_eq!(entry.map(|e| e.channel_name.as_str()), Some("B"));
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.latest().unwrap().channel_name, "B");
    }

    #[test]
    fn quiet_status_never_locks() {
        let mut tracker = ContactTracker::new();
        for _ in 0..3 {
            assert!(tracker.process(&status_with_rssi(0, "A")).is_none());
        }
        assert!(tracker.is_empty());
        assert_eq!(tracker.last_lock_change(), None);
    }

    #[test]
    fn log_is_capped_oldest_first() {
        let mut tracker = ContactTracker::with_capacity(3);
        for i in 0..5 {
            tracker.process_at(&status_with_rssi(1, &format!("ch{i}")), at(i * 2));
            tracker.process_at(&status_with_rssi(0, ""), at(i * 2 + 1));
        }
        let names: Vec<_> = tracker.contacts().map(|e| e.channel_name.clone()).collect();
        assert_eq!(names, ["ch2", "ch3", "ch4"]);
    }

    #[test]
    fn default_capacity_is_thirty() {
        let mut tracker = ContactTracker::default();
        for i in 0..40 {
            tracker.process_at(&status_with_rssi(1, "x"), at(i * 2));
            tracker.process_at(&status_with_rssi(0, "x"), at(i * 2 + 1));
        }
        assert_eq!(tracker.len(), DEFAULT_CONTACT_LOG_SIZE);
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let mut tracker = ContactTracker::with_capacity(0);
        assert!(tracker.process_at(&status_with_rssi(1, "x"), at(0)).is_some());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn tracker_does_not_touch_status() {
        let mut tracker = ContactTracker::new();
        let status = status_with_rssi(4, "A");
        let before = status.clone();
        tracker.process(&status);
        assert_eq!(status, before);
    }

    #[test]
    fn entry_age() {
        let entry = ContactLogEntry::from_status(&ScannerStatus::new(), at(10));
        assert_eq!(entry.age(at(15)), Duration::from_secs(5));
        assert_eq!(entry.age(at(5)), Duration::ZERO);
        assert_eq!(entry.system_name, "SCANNING");
    }

    #[test]
    fn clear_resets_lock() {
        let mut tracker = ContactTracker::new();
        tracker.process_at(&status_with_rssi(2, "A"), at(0));
        tracker.clear();
        assert!(tracker.is_empty());
        assert!(!tracker.is_locked());
    }
}
