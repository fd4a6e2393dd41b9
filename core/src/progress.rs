/*
 * progress.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Tagliacarte, a cross-platform email client.
 *
 * Tagliacarte is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tagliacarte is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tagliacarte.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Progress notification for long copies and codec passes.

/// Receives progress of a streaming operation. Totals are in bytes of *input consumed*.
pub trait ProgressListener {
    /// Called once before any data is processed.
    fn start(&mut self, _predicted_total: u64) {}

    /// Called as data is processed; `current` never decreases within one operation.
    fn progress(&mut self, current: u64, current_total: u64);

    /// Called once when the operation completes successfully.
    fn stop(&mut self, _total: u64) {}
}

/// Forwards notifications to an optional listener, reporting totals against a fixed size known
/// up front (the stored length of a content handler) rather than whatever the producer predicts.
pub struct ProgressListenerSizeAdapter<'a> {
    inner: Option<&'a mut dyn ProgressListener>,
    total: u64,
    last: u64,
}

impl<'a> ProgressListenerSizeAdapter<'a> {
    pub fn new(inner: Option<&'a mut dyn ProgressListener>, total: u64) -> Self {
        Self { inner, total, last: 0 }
    }
}

impl ProgressListener for ProgressListenerSizeAdapter<'_> {
    fn start(&mut self, _predicted_total: u64) {
        self.last = 0;
        if let Some(l) = self.inner.as_deref_mut() {
            l.start(self.total);
        }
    }

    fn progress(&mut self, current: u64, _current_total: u64) {
        let current = current.min(self.total).max(self.last);
        self.last = current;
        if let Some(l) = self.inner.as_deref_mut() {
            l.progress(current, self.total);
        }
    }

    /// Decoders may stop before the end of the stored data (uuencode at its terminator line),
    /// so a final update at the full total is sent if one is missing.
    fn stop(&mut self, _total: u64) {
        let catch_up = self.last < self.total;
        self.last = self.total;
        if let Some(l) = self.inner.as_deref_mut() {
            if catch_up {
                l.progress(self.total, self.total);
            }
            l.stop(self.total);
        }
    }
}

/// Counts consumed input for a codec pass and reports it to an optional listener.
pub(crate) struct ProgressTracker<'a> {
    listener: Option<&'a mut dyn ProgressListener>,
    consumed: u64,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn start(mut listener: Option<&'a mut dyn ProgressListener>) -> Self {
        if let Some(l) = listener.as_deref_mut() {
            l.start(0);
        }
        Self { listener, consumed: 0 }
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.consumed += n as u64;
        if let Some(l) = self.listener.as_deref_mut() {
            l.progress(self.consumed, self.consumed);
        }
    }

    pub(crate) fn stop(mut self) {
        if let Some(l) = self.listener.as_deref_mut() {
            l.stop(self.consumed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(&'static str, u64, u64)>,
    }

    impl ProgressListener for Recorder {
        fn start(&mut self, total: u64) {
            self.events.push(("start", 0, total));
        }
        fn progress(&mut self, current: u64, total: u64) {
            self.events.push(("progress", current, total));
        }
        fn stop(&mut self, total: u64) {
            self.events.push(("stop", total, total));
        }
    }

    #[test]
    fn size_adapter_reports_fixed_total() {
        let mut rec = Recorder::default();
        {
            let mut plsa = ProgressListenerSizeAdapter::new(Some(&mut rec), 10);
            plsa.start(0);
            plsa.progress(4, 4);
            plsa.progress(12, 12);
            plsa.stop(12);
        }
        assert_eq!(
            rec.events,
            vec![("start", 0, 10), ("progress", 4, 10), ("progress", 10, 10), ("stop", 10, 10)]
        );
    }

    #[test]
    fn size_adapter_never_goes_backwards() {
        let mut rec = Recorder::default();
        {
            let mut plsa = ProgressListenerSizeAdapter::new(Some(&mut rec), 10);
            plsa.progress(6, 6);
            plsa.progress(3, 3);
        }
        assert_eq!(rec.events[1], ("progress", 6, 10));
    }

    #[test]
    fn size_adapter_completes_on_early_stop() {
        let mut rec = Recorder::default();
        {
            let mut plsa = ProgressListenerSizeAdapter::new(Some(&mut rec), 10);
            plsa.start(0);
            plsa.progress(7, 7);
            plsa.stop(7);
        }
        assert_eq!(
            rec.events,
            vec![("start", 0, 10), ("progress", 7, 10), ("progress", 10, 10), ("stop", 10, 10)]
        );
    }

    #[test]
    fn size_adapter_without_listener_is_silent() {
        let mut plsa = ProgressListenerSizeAdapter::new(None, 5);
        plsa.start(0);
        plsa.progress(5, 5);
        plsa.stop(5);
    }
}
