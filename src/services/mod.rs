pub mod intervals;
pub mod reservations;
pub mod slots;

pub use reservations::{ReservationOutcome, ReservationService};
pub use slots::SlotService;
