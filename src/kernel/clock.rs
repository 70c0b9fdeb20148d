// Millisecond time sources for the scheduler
//
// The scheduler only ever asks for "now" as a wrapping u32 ms counter
// (~49.7 days per wrap). Elapsed time is always computed with
// wrapping_sub, never compared as absolute timestamps.
//
// UptimeClock reads a counter advanced from a timer ISR. Critical
// section guards the counter since riscv32imc has no atomic RMW.
// ManualClock is a plain Cell for host tests and simulations.

use core::cell::Cell;

// cs: riscv32imc has no atomic add
static UPTIME_MS: critical_section::Mutex<Cell<u32>> = critical_section::Mutex::new(Cell::new(0));

/// Source of monotonic milliseconds.
///
/// Must be non-decreasing apart from the 32-bit wrap. The scheduler
/// samples it once per `tick()` and once per timing control call
/// (`add_task`, `pause_task`, `resume_task`, `reset_task_timer`).
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Adapts any `Fn() -> u32`, e.g. a HAL's `millis()`.
#[derive(Debug, Clone, Copy)]
pub struct FnClock<F>(pub F);

impl<F: Fn() -> u32> Clock for FnClock<F> {
    #[inline]
    fn now_ms(&self) -> u32 {
        (self.0)()
    }
}

// ISR-fed uptime

/// Advance the shared uptime counter. Call from the periodic timer ISR
/// with the timer period in ms.
#[inline]
pub fn advance_uptime(ms: u32) {
    critical_section::with(|cs| {
        let uptime = UPTIME_MS.borrow(cs);
        uptime.set(uptime.get().wrapping_add(ms));
    });
}

pub fn uptime_ms() -> u32 {
    critical_section::with(|cs| UPTIME_MS.borrow(cs).get())
}

#[cfg(test)]
fn set_uptime_ms(ms: u32) {
    critical_section::with(|cs| UPTIME_MS.borrow(cs).set(ms));
}

/// Clock backed by the ISR-advanced uptime counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeClock;

impl Clock for UptimeClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        uptime_ms()
    }
}

/// Idle the core until the next interrupt (the uptime timer, usually).
#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    core::hint::spin_loop();
}

/// Hand-driven clock for tests and host-side simulation.
///
/// Shared by reference: hand `&clock` to the scheduler and keep
/// advancing it from the test.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(ms: u32) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    // wraps like the hardware counter
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}
