use crate::availability::SlotCatalog;
use crate::backend::{BookingError, Clock, ReservationBackend};
use crate::configuration::Configuration;
use crate::types::{Barber, NewReservation, Reservation, ReservationStatus};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct MockReservationBackendInner {
    pub fail: AtomicBool,
    pub conflict: AtomicBool,
    pub calls_to_barbers: AtomicU64,
    pub calls_to_active_reservation_times: AtomicU64,
    pub calls_to_create_reservation: AtomicU64,
    pub calls_to_update_status: AtomicU64,
    pub calls_to_reservations: AtomicU64,
    pub barbers: Mutex<Vec<Barber>>,
    pub occupied: Mutex<Vec<NaiveTime>>,
    pub reservations: Mutex<Vec<Reservation>>,
}

#[derive(Clone)]
pub struct MockReservationBackend(pub Arc<MockReservationBackendInner>);

impl MockReservationBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockReservationBackendInner {
            fail: AtomicBool::new(false),
            conflict: AtomicBool::new(false),
            calls_to_barbers: AtomicU64::default(),
            calls_to_active_reservation_times: AtomicU64::default(),
            calls_to_create_reservation: AtomicU64::default(),
            calls_to_update_status: AtomicU64::default(),
            calls_to_reservations: AtomicU64::default(),
            barbers: Mutex::new(vec![
                Barber {
                    id: 1,
                    name: "Carlos".into(),
                    active: true,
                },
                Barber {
                    id: 2,
                    name: "Diego".into(),
                    active: false,
                },
            ]),
            occupied: Mutex::default(),
            reservations: Mutex::default(),
        }))
    }

    fn guard(&self) -> Result<(), BookingError> {
        match self.0.fail.load(Ordering::SeqCst) {
            false => Ok(()),
            true => Err(BookingError::DataUnavailable("supposed to fail".into())),
        }
    }
}

impl ReservationBackend for MockReservationBackend {
    fn barbers(&self) -> Result<Vec<Barber>, BookingError> {
        self.0.calls_to_barbers.fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        Ok(self.0.barbers.lock().unwrap().clone())
    }

    fn active_reservation_times(
        &self,
        _barber_id: i32,
        _date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        self.0
            .calls_to_active_reservation_times
            .fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        Ok(self.0.occupied.lock().unwrap().clone())
    }

    fn create_reservation(&self, new: NewReservation) -> Result<Reservation, BookingError> {
        self.0
            .calls_to_create_reservation
            .fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        if self.0.conflict.load(Ordering::SeqCst) {
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
        self.0
            .reservations
            .lock()
            .unwrap()
            .push(reservation.clone());
        Ok(reservation)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        self.0.calls_to_update_status.fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        let mut reservations = self.0.reservations.lock().unwrap();
        match reservations.iter_mut().find(|r| r.id == id) {
            Some(reservation) => {
                reservation.status = status;
                Ok(reservation.clone())
            }
            // The mock does not enforce the state machine; a miss on an
            // empty store still reports success so routing tests can use
            // arbitrary ids.
            None => Ok(Reservation {
                id,
                barber_id: 1,
                customer_name: "Mock".into(),
                customer_email: "mock@example.com".into(),
                customer_phone: "+55 61 90000-0000".into(),
                service: "Corte social".into(),
                date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                slot: crate::types::TimeSlot::new(10, 0).unwrap(),
                status,
                created_at: Utc::now(),
            }),
        }
    }

    fn reservations(&self) -> Result<Vec<Reservation>, BookingError> {
        self.0.calls_to_reservations.fetch_add(1, Ordering::SeqCst);
        self.guard()?;
        Ok(self.0.reservations.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TestConfiguration {
    pub admin_password: String,
    pub frontend_path: PathBuf,
    pub bind_address: String,
    pub catalog: SlotCatalog,
    pub lead_time_minutes: i64,
}

impl TestConfiguration {
    pub fn new(port: u16) -> Self {
        Self {
            admin_password: "123".into(),
            frontend_path: PathBuf::from("frontend/index.html"),
            bind_address: format!("127.0.0.1:{port}"),
            catalog: SlotCatalog::default(),
            lead_time_minutes: 30,
        }
    }
}

impl Configuration for TestConfiguration {
    fn shop_name(&self) -> String {
        "Test Barbershop".into()
    }

    fn admin_password(&self) -> String {
        self.admin_password.clone()
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn bind_address(&self) -> String {
        self.bind_address.clone()
    }

    fn database_url(&self) -> Option<String> {
        None
    }

    fn slot_catalog(&self) -> SlotCatalog {
        self.catalog
    }

    fn booking_lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }
}

pub async fn wait_for_server(port: u16) {
    for _ in 0..200 {
        if tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("server did not start on port {port}");
}
