//! Link-time providers that `embassy-time` and `critical-section` expect on
//! ESP-IDF.
//!
//! Every task sleep goes through `async_io_mini::Timer`, which reads the
//! `embassy-time` clock and registers wakers through the two
//! `_embassy_time_*` symbols below.  Host builds get both from the
//! `embassy-time` `std` driver instead.

use core::cell::{Cell, RefCell};
use core::task::Waker;
use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};

static CRITICAL_SECTION_MUTEX: Mutex<()> = Mutex::new(());

thread_local! {
    static CRITICAL_SECTION_DEPTH: Cell<u8> = const { Cell::new(0) };
    static CRITICAL_SECTION_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Re-entrant acquire for `critical-section` 1.x, backed by one global mutex.
#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                let lock = CRITICAL_SECTION_MUTEX
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                *guard.borrow_mut() = Some(lock);
            }
            let new_depth = d.saturating_add(1);
            depth.set(new_depth);
            new_depth
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    CRITICAL_SECTION_DEPTH.with(|depth| {
        CRITICAL_SECTION_GUARD.with(|guard| {
            let d = depth.get();
            if d == 0 {
                return;
            }
            let new_depth = d - 1;
            depth.set(new_depth);
            if new_depth == 0 {
                *guard.borrow_mut() = None;
            }
        })
    })
}

/// Monotonic microseconds since boot (`esp_timer`), at the 1 MHz tick
/// rate `embassy-time` defaults to.
#[unsafe(no_mangle)]
pub fn _embassy_time_now() -> u64 {
    // SAFETY: esp_timer is started by the IDF before `main` runs.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

/// Wake `waker` at tick `at`.  The sleep happens on a short-lived helper
/// thread so the executor thread keeps running.
#[unsafe(no_mangle)]
pub fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let waker = waker.clone();
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
