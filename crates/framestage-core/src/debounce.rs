#![forbid(unsafe_code)]

//! Trailing-edge coalescing scheduler for control activations.
//!
//! Each control owns one pending slot. A new activation overwrites the slot
//! and pushes its deadline back by the full delay, so a burst of clicks
//! collapses into a single flush after the burst ends. Time is supplied by
//! the host as a monotonic [`Duration`].

use core::time::Duration;

use crate::env::Control;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSlot {
    deadline: Duration,
    order: u64,
    activations: u32,
}

/// Per-control pending-action slots with a single delayed flush each.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    slots: [Option<PendingSlot>; 2],
    next_order: u64,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            slots: [None, None],
            next_order: 0,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an activation at `now` and return the new deadline.
    pub fn activate(&mut self, control: Control, now: Duration) -> Duration {
        let deadline = now.saturating_add(self.delay);
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        let slot = &mut self.slots[control.index()];
        let activations = slot.map_or(0, |pending| pending.activations);
        *slot = Some(PendingSlot {
            deadline,
            order,
            activations: activations.saturating_add(1),
        });
        deadline
    }

    #[must_use]
    pub fn is_pending(&self, control: Control) -> bool {
        self.slots[control.index()].is_some()
    }

    /// Activations coalesced into the pending slot of `control`.
    #[must_use]
    pub fn pending_activations(&self, control: Control) -> u32 {
        self.slots[control.index()].map_or(0, |pending| pending.activations)
    }

    #[must_use]
    pub fn deadline(&self, control: Control) -> Option<Duration> {
        self.slots[control.index()].map(|pending| pending.deadline)
    }

    /// Remove and return every slot due at `now`, oldest activation first.
    pub fn take_due(&mut self, now: Duration) -> Vec<Control> {
        let mut due: Vec<(u64, Control)> = Control::ALL
            .into_iter()
            .filter_map(|control| {
                let pending = self.slots[control.index()]?;
                (pending.deadline <= now).then_some((pending.order, control))
            })
            .collect();
        due.sort_unstable_by_key(|(order, _)| *order);
        for (_, control) in &due {
            self.slots[control.index()] = None;
        }
        due.into_iter().map(|(_, control)| control).collect()
    }

    /// Drop every pending slot and return the controls that were armed.
    pub fn clear(&mut self) -> Vec<Control> {
        Control::ALL
            .into_iter()
            .filter(|control| self.slots[control.index()].take().is_some())
            .collect()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use crate::env::Control;
    use core::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut debouncer = Debouncer::default();
        let deadline = debouncer.activate(Control::Theater, ms(1_000));
        assert_eq!(deadline, ms(1_300));
        assert!(debouncer.take_due(ms(1_299)).is_empty());
        assert!(debouncer.is_pending(Control::Theater));
    }

    #[test]
    fn due_exactly_at_deadline() {
        let mut debouncer = Debouncer::default();
        debouncer.activate(Control::Fullscreen, ms(0));
        assert_eq!(debouncer.take_due(ms(300)), vec![Control::Fullscreen]);
        assert!(!debouncer.is_pending(Control::Fullscreen));
    }

    #[test]
    fn burst_collapses_and_extends_deadline() {
        let mut debouncer = Debouncer::default();
        for step in 0..5 {
            debouncer.activate(Control::Theater, ms(step * 100));
        }
        assert_eq!(debouncer.pending_activations(Control::Theater), 5);
        assert_eq!(debouncer.deadline(Control::Theater), Some(ms(700)));
        assert!(debouncer.take_due(ms(650)).is_empty());
        assert_eq!(debouncer.take_due(ms(700)), vec![Control::Theater]);
        assert!(debouncer.take_due(ms(10_000)).is_empty());
    }

    #[test]
    fn due_slots_flush_in_activation_order() {
        let mut debouncer = Debouncer::default();
        debouncer.activate(Control::Fullscreen, ms(0));
        debouncer.activate(Control::Theater, ms(10));
        debouncer.activate(Control::Fullscreen, ms(20));
        assert_eq!(
            debouncer.take_due(ms(1_000)),
            vec![Control::Theater, Control::Fullscreen]
        );
    }

    #[test]
    fn clear_reports_armed_controls() {
        let mut debouncer = Debouncer::default();
        debouncer.activate(Control::Fullscreen, ms(0));
        assert_eq!(debouncer.clear(), vec![Control::Fullscreen]);
        assert!(debouncer.clear().is_empty());
    }
}
