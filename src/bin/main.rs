// task-jockey demo firmware (ESP32-C3)
//
// Boot: logger -> uptime timer -> LED -> register tasks
// Main loop: tick scheduler -> WFI until the next timer interrupt
//
// The 10ms timer ISR only advances the uptime counter; every task
// runs from the main loop on the main stack.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::info;

use core::cell::RefCell;
use critical_section::Mutex;

use task_jockey::kernel::clock::{self, UptimeClock};
use task_jockey::{Config, Scheduler, TaskControl, TaskSpec};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

const UPTIME_TICK_MS: u32 = 10;

const HEARTBEAT_MS: u32 = 500;
const STATUS_MS: u32 = 5_000;
const BURST_MS: u32 = 1_000;
const BURST_COUNT: i16 = 6;

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    clock::advance_uptime(UPTIME_TICK_MS);
}

// per-task payload: a label for the status log
type Label = &'static str;

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    esp_alloc::heap_allocator!(size: 32 * 1024);

    info!("booting...");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        if timer0
            .start(Duration::from_millis(UPTIME_TICK_MS as u64))
            .is_err()
        {
            log::error!("uptime timer failed to start");
        }
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
    });
    info!("timer initialized.");

    let mut led = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());

    let mut jockey: Scheduler<UptimeClock, Label> =
        Scheduler::with_config(UptimeClock, Config::new().with_max_tasks(8).preallocated());

    let heartbeat = match jockey.add_task(
        move |_, _| led.toggle(),
        "heartbeat",
        TaskSpec::every(HEARTBEAT_MS).immediately(),
    ) {
        Ok(id) => id,
        Err(e) => panic!("heartbeat: {}", e),
    };

    // pauses the heartbeat on odd runs, resumes on even ones, then dies
    let burst = jockey.add_task(
        move |ctx, me| {
            let left = ctx.task_iterations_remaining(me).unwrap_or(0);
            if left % 2 == 0 {
                ctx.pause_task(heartbeat);
                info!("burst: heartbeat paused ({} left)", left - 1);
            } else {
                ctx.resume_task(heartbeat);
                info!("burst: heartbeat resumed ({} left)", left - 1);
            }
        },
        "burst",
        TaskSpec::every(BURST_MS).times(BURST_COUNT),
    );
    if let Err(e) = burst {
        log::warn!("burst: {}", e);
    }

    let status = jockey.add_task(
        |ctx, _| {
            let stats = esp_alloc::HEAP.stats();
            info!(
                "status: uptime {} ms, {} task(s), heap {} used",
                ctx.now_ms(),
                ctx.task_count(),
                stats.current_usage
            );
        },
        "status",
        TaskSpec::every(STATUS_MS),
    );
    if let Err(e) = status {
        log::warn!("status: {}", e);
    }

    for task in jockey.tasks() {
        info!("task {} '{}' every {} ms", task.id(), task.args(), task.interval());
    }
    info!("jockey ready.");

    loop {
        let report = jockey.tick();
        if report.removed > 0 {
            info!("{}", report);
        }
        clock::wait_for_interrupt();
    }
}
