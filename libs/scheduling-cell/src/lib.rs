//! Slot generation for the no-backend fallback and for test fixtures.
//!
//! In production, slot availability is wholly backend-owned; this generator
//! only fabricates a plausible 14-day grid when no backend is reachable, or a
//! deterministic one under a seeded random source in tests.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::Rng;
use tracing::debug;

use shared_models::TimeSlot;

/// Forward booking window in calendar days, starting the day after "today".
pub const BOOKING_WINDOW_DAYS: i64 = 14;

const SLOT_STEP_MINUTES: u32 = 30;
const MORNING_AVAILABILITY: f64 = 0.7;
const AFTERNOON_AVAILABILITY: f64 = 0.6;

fn block(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Vec<NaiveTime> {
    let mut times = Vec::new();
    let mut hour = start_h;
    let mut minute = start_m;
    // Both block ends are inclusive: 11:00 and 17:00 are bookable.
    while (hour, minute) <= (end_h, end_m) {
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            times.push(time);
        }
        minute += SLOT_STEP_MINUTES;
        if minute >= 60 {
            minute -= 60;
            hour += 1;
        }
    }
    times
}

/// Morning grid: 08:00 through 11:00 at 30-minute steps.
pub fn morning_times() -> Vec<NaiveTime> {
    block(8, 0, 11, 0)
}

/// Afternoon grid: 13:30 through 17:00 at 30-minute steps. There is no 13:00
/// slot; the first afternoon slot follows the lunch break.
pub fn afternoon_times() -> Vec<NaiveTime> {
    block(13, 30, 17, 0)
}

/// The full canonical time grid for one working day.
pub fn slot_times() -> Vec<NaiveTime> {
    let mut times = morning_times();
    times.extend(afternoon_times());
    times
}

/// Generate the bookable grid for a doctor over the next [`BOOKING_WINDOW_DAYS`]
/// calendar days after `today`, skipping Sundays. Availability is drawn from
/// the injected random source (~70% mornings, ~60% afternoons); pass a seeded
/// generator for deterministic output. Pure over its inputs and never fails,
/// though a day may legitimately end up with zero available slots.
pub fn generate_slots<R: Rng>(doctor_id: &str, today: NaiveDate, rng: &mut R) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    for day in 1..=BOOKING_WINDOW_DAYS {
        let date = today + Duration::days(day);
        if date.weekday() == Weekday::Sun {
            continue;
        }

        for time in morning_times() {
            let available = rng.gen_bool(MORNING_AVAILABILITY);
            slots.push(TimeSlot::new(doctor_id, date, time, available));
        }
        for time in afternoon_times() {
            let available = rng.gen_bool(AFTERNOON_AVAILABILITY);
            slots.push(TimeSlot::new(doctor_id, date, time, available));
        }
    }

    debug!("Generated {} slots for doctor {}", slots.len(), doctor_id);
    slots
}
