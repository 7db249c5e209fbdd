pub mod reservation;
pub mod slot;
pub mod user;

pub use reservation::{CinemaReservation, ReservationFilter, MAX_PEOPLE_PER_RESERVATION};
pub use slot::{DailySlot, NewDailySlot, ReservationSlot, SlotTemplate};
pub use user::{Role, User};
