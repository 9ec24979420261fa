use crate::backend::{BookingError, ReservationBackend};
use crate::types::{Barber, NewReservation, Reservation, ReservationStatus};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    barbers: Vec<Barber>,
    reservations: HashMap<Uuid, Reservation>,
}

/// In-memory reservation store. A single mutex covers both the conflict
/// check and the insert, so the commit path is serialized: of two
/// concurrent commits for the same slot, exactly one succeeds.
#[derive(Debug, Clone, Default)]
pub struct LocalReservations {
    store: Arc<Mutex<Store>>,
}

impl LocalReservations {
    pub fn insert_barber(&self, id: i32, name: &str, active: bool) {
        let mut store = self.store.lock().unwrap();
        store.barbers.push(Barber {
            id,
            name: name.to_string(),
            active,
        });
    }

    pub fn insert_example_barbers(&self) {
        self.insert_barber(1, "Carlos", true);
        self.insert_barber(2, "Diego", true);
        self.insert_barber(3, "Rafael", true);
    }
}

impl ReservationBackend for LocalReservations {
    fn barbers(&self) -> Result<Vec<Barber>, BookingError> {
        Ok(self.store.lock().unwrap().barbers.clone())
    }

    fn active_reservation_times(
        &self,
        barber_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let store = self.store.lock().unwrap();
        let mut times: Vec<NaiveTime> = store
            .reservations
            .values()
            .filter(|r| r.barber_id == barber_id && r.date == date && r.status.is_active())
            .map(|r| r.slot.to_naive_time())
            .collect();
        times.sort();
        Ok(times)
    }

    fn create_reservation(&self, new: NewReservation) -> Result<Reservation, BookingError> {
        let mut store = self.store.lock().unwrap();

        let barber = store
            .barbers
            .iter()
            .find(|b| b.id == new.barber_id)
            .ok_or(BookingError::UnknownBarber(new.barber_id))?;
        if !barber.active {
            return Err(BookingError::InactiveBarber(new.barber_id));
        }

        let occupied = store.reservations.values().any(|r| {
            r.barber_id == new.barber_id
                && r.date == new.date
                && r.slot == new.slot
                && r.status.is_active()
        });
        if occupied {
            return Err(BookingError::SlotConflict {
                barber_id: new.barber_id,
                date: new.date,
                slot: new.slot,
            });
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            barber_id: new.barber_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            service: new.service,
            date: new.date,
            slot: new.slot,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        };
        store.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        let mut store = self.store.lock().unwrap();
        let reservation = store
            .reservations
            .get_mut(&id)
            .ok_or(BookingError::UnknownReservation(id))?;
        if !reservation.status.can_transition(status) {
            return Err(BookingError::InvalidTransition {
                from: reservation.status,
                to: status,
            });
        }
        reservation.status = status;
        Ok(reservation.clone())
    }

    fn reservations(&self) -> Result<Vec<Reservation>, BookingError> {
        let store = self.store.lock().unwrap();
        let mut all: Vec<Reservation> = store.reservations.values().cloned().collect();
        all.sort_by_key(|r| (r.date, r.slot));
        Ok(all)
    }
}
