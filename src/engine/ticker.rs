/// Token authorising one simulation step. Only the most recently issued
/// generation is honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Ticker {
    generation: u64,
    running: bool,
}

impl Ticker {
    /// Returns the live ticket, starting the loop if it was stopped.
    pub fn start(&mut self) -> FrameTicket {
        self.running = true;
        FrameTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: FrameTicket) -> bool {
        self.running && ticket.generation == self.generation
    }

    /// Stops the loop without invalidating the generation; a later `start`
    /// hands out the same ticket again.
    pub fn park(&mut self) {
        self.running = false;
    }

    /// Invalidates every outstanding ticket.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_invalidates_outstanding_tickets() {
        let mut ticker = Ticker::default();
        let stale = ticker.start();
        assert!(ticker.is_current(stale));

        ticker.cancel();
        assert!(!ticker.running);
        assert!(!ticker.is_current(stale));

        let fresh = ticker.start();
        assert_ne!(fresh, stale);
        assert!(ticker.is_current(fresh));
        assert!(!ticker.is_current(stale));
    }

    #[test]
    fn test_park_and_restart_reuse_generation() {
        let mut ticker = Ticker::default();
        let ticket = ticker.start();
        ticker.park();
        assert!(!ticker.is_current(ticket));

        assert_eq!(ticker.start(), ticket);
        assert!(ticker.is_current(ticket));
    }
}
