use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one outstanding operation at a time.
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` while another permit is alive.
    pub fn try_begin(&self) -> Option<FlightPermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightPermit {
                in_flight: &self.in_flight,
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases its `SingleFlight` on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    in_flight: &'a AtomicBool,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
