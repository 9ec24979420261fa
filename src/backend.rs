use crate::types::{Barber, NewReservation, Reservation, ReservationStatus, TimeSlot};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The store could not be read or written. Callers must surface this
    /// as "could not check availability", never as "fully booked".
    DataUnavailable(String),
    /// An active reservation already holds this (barber, date, slot).
    SlotConflict {
        barber_id: i32,
        date: NaiveDate,
        slot: TimeSlot,
    },
    UnknownBarber(i32),
    InactiveBarber(i32),
    UnknownReservation(Uuid),
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUnavailable(reason) => {
                write!(f, "reservation store unavailable: {reason}")
            }
            Self::SlotConflict {
                barber_id,
                date,
                slot,
            } => write!(
                f,
                "slot {slot} on {date} with barber {barber_id} is no longer available"
            ),
            Self::UnknownBarber(id) => write!(f, "no barber with id {id}"),
            Self::InactiveBarber(id) => write!(f, "barber {id} is not taking appointments"),
            Self::UnknownReservation(id) => write!(f, "no reservation with id {id}"),
            Self::InvalidTransition { from, to } => {
                write!(f, "a {from} reservation cannot become {to}")
            }
        }
    }
}

impl std::error::Error for BookingError {}

/// The reservation store seam. Read side feeds the availability engine,
/// write side carries the commit-path uniqueness guarantee: no two
/// active reservations may share a (barber, date, slot), even under
/// concurrent commits.
pub trait ReservationBackend: Clone + Send + Sync + 'static {
    fn barbers(&self) -> Result<Vec<Barber>, BookingError>;

    /// Reserved times for one barber on one date, restricted to
    /// pending/confirmed reservations. Values may carry seconds; the
    /// engine normalizes them.
    fn active_reservation_times(
        &self,
        barber_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError>;

    /// Inserts a `pending` reservation, or fails with `SlotConflict`
    /// when the slot is already held by an active reservation.
    fn create_reservation(&self, new: NewReservation) -> Result<Reservation, BookingError>;

    fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, BookingError>;

    fn reservations(&self) -> Result<Vec<Reservation>, BookingError>;
}

/// Wall-clock seam so availability computations take an injected "now".
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
