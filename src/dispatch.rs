//! Interrupt dispatch.
//!
//! A node builds its [`Dispatcher`] once, at construction, registering one
//! handler per event source its role listens to. The interrupt entry then only
//! walks that table. For every registered event that is pending it runs the
//! handler and clears the flag before returning. No role check happens per
//! interrupt.

use crate::consts::MAX_HANDLERS;
use crate::error::LinkError;
use core::fmt;

/// Hardware events a node can be interrupted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// An analog conversion finished.
    SampleReady,
    /// Eight bits were shifted each way.
    TransferComplete,
}

/// Owner of the event flags.
pub trait EventSource {
    /// The flag for `event` is raised.
    fn is_pending(&self, event: Event) -> bool;

    /// Lowers the flag for `event`.
    fn clear(&mut self, event: Event);
}

/// An event handler.
pub type Handler<N> = fn(&mut N) -> Result<(), LinkError>;

/// Role-selected handler table.
pub struct Dispatcher<N> {
    slots: [Option<(Event, Handler<N>)>; MAX_HANDLERS],
}

impl<N> Clone for Dispatcher<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Dispatcher<N> {}

impl<N> Default for Dispatcher<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for Dispatcher<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().flatten().map(|(event, _)| event))
            .finish()
    }
}

impl<N> Dispatcher<N> {
    /// Empty table.
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_HANDLERS],
        }
    }

    /// Registers `handler` for `event`, replacing an earlier registration of
    /// the same event.
    pub fn register(&mut self, event: Event, handler: Handler<N>) -> Result<(), LinkError> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Some((registered, _)) if *registered == event))
            .or_else(|| self.slots.iter().position(Option::is_none))
            .ok_or(LinkError::Config("handler table full"))?;
        self.slots[index] = Some((event, handler));
        Ok(())
    }

    /// Events with a registered handler.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.slots.iter().flatten().map(|(event, _)| *event)
    }
}

impl<N> Dispatcher<N>
where
    N: EventSource,
{
    /// Any registered event is pending.
    pub fn any_pending(&self, node: &N) -> bool {
        self.events().any(|event| node.is_pending(event))
    }

    /// Runs the handler of every pending registered event and clears its flag.
    ///
    /// The flag is cleared even when the handler fails; the first failure is
    /// returned after all pending events were handled. Returns the number of
    /// events handled.
    pub fn dispatch(&self, node: &mut N) -> Result<u8, LinkError> {
        let mut handled = 0;
        let mut failure = None;
        for &(event, handler) in self.slots.iter().flatten() {
            if !node.is_pending(event) {
                continue;
            }
            let result = handler(node);
            node.clear(event);
            handled += 1;
            if let Err(err) = result {
                error!("{:?} handler failed: {:?}", event, err);
                let _ = failure.get_or_insert(err);
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(handled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Flags {
        sample: bool,
        transfer: bool,
        seen_set_in_handler: bool,
        calls: u8,
    }

    impl EventSource for Flags {
        fn is_pending(&self, event: Event) -> bool {
            match event {
                Event::SampleReady => self.sample,
                Event::TransferComplete => self.transfer,
            }
        }

        fn clear(&mut self, event: Event) {
            match event {
                Event::SampleReady => self.sample = false,
                Event::TransferComplete => self.transfer = false,
            }
        }
    }

    fn on_sample(flags: &mut Flags) -> Result<(), LinkError> {
        flags.seen_set_in_handler = flags.sample;
        flags.calls += 1;
        Ok(())
    }

    fn on_transfer(flags: &mut Flags) -> Result<(), LinkError> {
        flags.calls += 1;
        Err(LinkError::Sink)
    }

    #[test]
    fn test_not_pending_is_noop() {
        let mut dispatcher: Dispatcher<Flags> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        let mut flags = Flags::default();
        assert_eq!(dispatcher.dispatch(&mut flags), Ok(0));
        assert_eq!(flags.calls, 0);
    }

    #[test]
    fn test_flag_cleared_after_handler() {
        let mut dispatcher: Dispatcher<Flags> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        let mut flags = Flags {
            sample: true,
            ..Flags::default()
        };
        assert_eq!(dispatcher.dispatch(&mut flags), Ok(1));
        assert!(flags.seen_set_in_handler);
        assert!(!flags.sample);
        assert!(!dispatcher.any_pending(&flags));
        // a cleared flag does not fire again
        assert_eq!(dispatcher.dispatch(&mut flags), Ok(0));
        assert_eq!(flags.calls, 1);
    }

    #[test]
    fn test_unregistered_event_is_ignored() {
        let mut dispatcher: Dispatcher<Flags> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        let mut flags = Flags {
            transfer: true,
            ..Flags::default()
        };
        assert!(!dispatcher.any_pending(&flags));
        assert_eq!(dispatcher.dispatch(&mut flags), Ok(0));
        assert!(flags.transfer);
    }

    #[test]
    fn test_failing_handler_still_clears() {
        let mut dispatcher: Dispatcher<Flags> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        dispatcher
            .register(Event::TransferComplete, on_transfer)
            .unwrap();
        let mut flags = Flags {
            sample: true,
            transfer: true,
            ..Flags::default()
        };
        assert_eq!(dispatcher.dispatch(&mut flags), Err(LinkError::Sink));
        assert!(!flags.sample);
        assert!(!flags.transfer);
        assert_eq!(flags.calls, 2);
    }

    #[test]
    fn test_register_replaces_and_fills() {
        let mut dispatcher: Dispatcher<Flags> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        dispatcher.register(Event::SampleReady, on_sample).unwrap();
        assert_eq!(dispatcher.events().count(), 1);
        dispatcher
            .register(Event::TransferComplete, on_transfer)
            .unwrap();
        assert_eq!(dispatcher.events().count(), 2);
    }
}
