use crate::types::TimeSlot;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Timelike};
use std::collections::HashSet;
use std::fmt;

/// The fixed catalog of slots in a business day: an operating window
/// (close is inclusive) stepped at a fixed granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCatalog {
    open: TimeSlot,
    close: TimeSlot,
    granularity_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    ZeroGranularity,
    WindowInverted { open: TimeSlot, close: TimeSlot },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroGranularity => write!(f, "slot granularity must be at least one minute"),
            Self::WindowInverted { open, close } => {
                write!(f, "operating window closes ({close}) before it opens ({open})")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl SlotCatalog {
    pub fn new(open: TimeSlot, close: TimeSlot, granularity_minutes: u32) -> Result<Self, CatalogError> {
        if granularity_minutes == 0 {
            return Err(CatalogError::ZeroGranularity);
        }
        if close < open {
            return Err(CatalogError::WindowInverted { open, close });
        }
        Ok(Self {
            open,
            close,
            granularity_minutes,
        })
    }

    /// The full ordered slot list for one business day.
    pub fn slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::new();
        let mut minutes = self.open.minutes_from_midnight();
        while minutes <= self.close.minutes_from_midnight() {
            slots.push(TimeSlot::from_minutes(minutes));
            minutes += self.granularity_minutes;
        }
        slots
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        let minutes = slot.minutes_from_midnight();
        minutes >= self.open.minutes_from_midnight()
            && minutes <= self.close.minutes_from_midnight()
            && (minutes - self.open.minutes_from_midnight()) % self.granularity_minutes == 0
    }
}

impl Default for SlotCatalog {
    // 09:00-20:00 at half-hour steps.
    fn default() -> Self {
        Self {
            open: TimeSlot::from_minutes(9 * 60),
            close: TimeSlot::from_minutes(20 * 60),
            granularity_minutes: 30,
        }
    }
}

/// True when `slot` starts too soon to be booked on a same-day query:
/// strictly before `now` plus the lead time. A slot starting exactly at
/// the cutoff is still bookable.
pub fn cutoff_passed(slot: TimeSlot, now: DateTime<Local>, lead_time: Duration) -> bool {
    let now_minutes = i64::from(now.hour() * 60 + now.minute());
    i64::from(slot.minutes_from_midnight()) < now_minutes + lead_time.num_minutes()
}

/// Computes the bookable slots for one barber on one date.
///
/// `occupied` holds the reserved times for that barber and date, already
/// restricted to active (pending/confirmed) reservations by the store;
/// any seconds in the stored values are dropped before comparison. The
/// result is an ascending, duplicate-free subset of the catalog. Past
/// dates always yield an empty result, and on same-day queries slots
/// inside the lead-time window are withheld. Pure: `now` is injected.
pub fn available_slots(
    catalog: &SlotCatalog,
    lead_time: Duration,
    date: NaiveDate,
    now: DateTime<Local>,
    occupied: &[NaiveTime],
) -> Vec<TimeSlot> {
    let today = now.date_naive();
    if date < today {
        return Vec::new();
    }

    let taken: HashSet<TimeSlot> = occupied
        .iter()
        .copied()
        .map(TimeSlot::from_naive_time)
        .collect();

    let mut slots: Vec<TimeSlot> = catalog
        .slots()
        .into_iter()
        .filter(|slot| !taken.contains(slot))
        .collect();

    if date == today {
        slots.retain(|slot| !cutoff_passed(*slot, now, lead_time));
    }

    slots
}
