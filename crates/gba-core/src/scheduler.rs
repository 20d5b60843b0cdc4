use log::debug;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Callback bound to an event class. It receives the hardware context and
/// the scheduler itself so it can re-arm.
pub type Handler<C> = fn(&mut C, &mut Scheduler<C>);

/// Which subsystem an event belongs to. One handler per class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventClass {
    ApuMixer,
    ApuSequencer,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
}

impl EventClass {
    pub const COUNT: usize = 6;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn timer(id: usize) -> Option<EventClass> {
        match id {
            0 => Some(EventClass::Timer0),
            1 => Some(EventClass::Timer1),
            2 => Some(EventClass::Timer2),
            3 => Some(EventClass::Timer3),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Event {
    timestamp: u64,
    // insertion order, breaks timestamp ties
    seq: u64,
    class: EventClass,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.timestamp, self.seq).cmp(&(other.timestamp, other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cycle-timestamp ordered event queue.
///
/// `C` is the hardware context the handlers operate on. Events fire in
/// non-decreasing timestamp order, ties in the order they were added.
pub struct Scheduler<C> {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<Event>>,
    handlers: [Option<Handler<C>>; EventClass::COUNT],
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            now: 0,
            seq: 0,
            queue: BinaryHeap::new(),
            handlers: [None; EventClass::COUNT],
        }
    }

    /// Binds the callback for `class`, replacing any previous one
    pub fn register(&mut self, class: EventClass, handler: Handler<C>) {
        if self.handlers[class.index()].replace(handler).is_some() {
            debug!("Scheduler: handler for {:?} replaced", class);
        }
    }

    /// Schedules `class` to fire `cycles` cycles from now.
    ///
    /// A negative delay is a caller bug: it panics in debug builds and is
    /// treated as zero otherwise.
    pub fn add(&mut self, cycles: i64, class: EventClass) {
        debug_assert!(cycles >= 0, "negative delay {cycles} for {class:?}");
        let timestamp = self.now + cycles.max(0) as u64;
        self.queue.push(Reverse(Event {
            timestamp,
            seq: self.seq,
            class,
        }));
        self.seq += 1;
    }

    /// Removes every pending event of `class`
    pub fn cancel(&mut self, class: EventClass) {
        self.queue.retain(|Reverse(event)| event.class != class);
    }

    /// Drops every pending event and rewinds the clock. Handlers stay bound.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now = 0;
        self.seq = 0;
    }

    /// Current cycle count. Inside a handler this is the event's own timestamp.
    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn next_timestamp(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(event)| event.timestamp)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, class: EventClass) -> bool {
        self.queue.iter().any(|Reverse(event)| event.class == class)
    }

    /// Earliest pending timestamp for `class`
    pub fn scheduled_at(&self, class: EventClass) -> Option<u64> {
        self.queue
            .iter()
            .filter(|Reverse(event)| event.class == class)
            .map(|Reverse(event)| event.timestamp)
            .min()
    }

    /// Fires every event due at or before `timestamp`, then parks the clock
    /// there. Events added by handlers are honoured if they fall in range.
    pub fn run_until(&mut self, ctx: &mut C, timestamp: u64) {
        while let Some(&Reverse(event)) = self.queue.peek() {
            if event.timestamp > timestamp {
                break;
            }
            self.queue.pop();
            self.now = event.timestamp;

            let handler = self.handlers[event.class.index()];
            match handler {
                Some(handler) => handler(ctx, self),
                None => debug!(
                    "Scheduler: dropped {:?} at {} (no handler)",
                    event.class, event.timestamp
                ),
            }
        }
        self.now = self.now.max(timestamp);
    }

    pub fn run_for(&mut self, ctx: &mut C, cycles: u64) {
        let target = self.now + cycles;
        self.run_until(ctx, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        fired: Vec<(EventClass, u64)>,
        rearms: u32,
    }

    fn record_timer0(log: &mut Log, s: &mut Scheduler<Log>) {
        log.fired.push((EventClass::Timer0, s.now()));
    }

    fn record_timer1(log: &mut Log, s: &mut Scheduler<Log>) {
        log.fired.push((EventClass::Timer1, s.now()));
    }

    fn periodic(log: &mut Log, s: &mut Scheduler<Log>) {
        log.fired.push((EventClass::ApuSequencer, s.now()));
        log.rearms += 1;
        s.add(100, EventClass::ApuSequencer);
    }

    fn scheduler() -> Scheduler<Log> {
        let mut s = Scheduler::new();
        s.register(EventClass::Timer0, record_timer0);
        s.register(EventClass::Timer1, record_timer1);
        s.register(EventClass::ApuSequencer, periodic);
        s
    }

    #[test]
    fn earlier_event_fires_first_regardless_of_add_order() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(10, EventClass::Timer0);
        s.add(5, EventClass::Timer1);

        s.run_until(&mut log, 20);
        assert_eq!(
            log.fired,
            vec![(EventClass::Timer1, 5), (EventClass::Timer0, 10)]
        );
        assert_eq!(s.now(), 20);
    }

    #[test]
    fn ties_fire_in_insertion_order() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(7, EventClass::Timer1);
        s.add(7, EventClass::Timer0);
        s.add(7, EventClass::Timer1);

        s.run_until(&mut log, 7);
        let order: Vec<_> = log.fired.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![EventClass::Timer1, EventClass::Timer0, EventClass::Timer1]
        );
    }

    #[test]
    fn nothing_fires_before_its_timestamp() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(50, EventClass::Timer0);

        s.run_until(&mut log, 49);
        assert!(log.fired.is_empty());
        assert_eq!(s.next_timestamp(), Some(50));

        s.run_for(&mut log, 1);
        assert_eq!(log.fired, vec![(EventClass::Timer0, 50)]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn self_rearming_handler_keeps_period() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(100, EventClass::ApuSequencer);

        s.run_until(&mut log, 1_000);
        assert_eq!(log.rearms, 10);
        let stamps: Vec<u64> = log.fired.iter().map(|(_, t)| *t).collect();
        assert_eq!(stamps, (1..=10).map(|n| n * 100).collect::<Vec<_>>());
        assert_eq!(s.next_timestamp(), Some(1_100));
    }

    #[test]
    fn coarse_catch_up_fires_every_missed_period_in_order() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(100, EventClass::ApuSequencer);
        s.add(250, EventClass::Timer0);

        s.run_until(&mut log, 300);
        assert_eq!(
            log.fired,
            vec![
                (EventClass::ApuSequencer, 100),
                (EventClass::ApuSequencer, 200),
                (EventClass::Timer0, 250),
                (EventClass::ApuSequencer, 300),
            ]
        );
    }

    #[test]
    fn cancel_removes_only_that_class() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(10, EventClass::Timer0);
        s.add(20, EventClass::Timer1);
        s.add(30, EventClass::Timer0);
        s.cancel(EventClass::Timer0);

        assert!(!s.is_scheduled(EventClass::Timer0));
        assert!(s.is_scheduled(EventClass::Timer1));
        s.run_until(&mut log, 100);
        assert_eq!(log.fired, vec![(EventClass::Timer1, 20)]);
    }

    #[test]
    fn unregistered_class_is_dropped() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(1, EventClass::Timer3);
        s.run_until(&mut log, 5);
        assert!(log.fired.is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn reset_clears_queue_and_clock_but_keeps_handlers() {
        let mut s = scheduler();
        let mut log = Log::default();
        s.add(10, EventClass::Timer0);
        s.run_until(&mut log, 5);
        s.reset();
        assert_eq!(s.now(), 0);
        assert_eq!(s.pending(), 0);

        s.add(3, EventClass::Timer0);
        s.run_until(&mut log, 3);
        assert_eq!(log.fired, vec![(EventClass::Timer0, 3)]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative delay")]
    fn negative_delay_panics_in_debug() {
        let mut s = scheduler();
        s.add(-1, EventClass::Timer0);
    }

    #[test]
    fn timer_classes_map_by_id() {
        assert_eq!(EventClass::timer(2), Some(EventClass::Timer2));
        assert_eq!(EventClass::timer(4), None);
    }
}
