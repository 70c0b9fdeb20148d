// End-to-end timing scenarios against a hand-driven clock

use std::cell::RefCell;
use std::rc::Rc;

use task_jockey::{Context, ManualClock, Scheduler, TaskControl, TaskId, TaskSpec, TaskState};

type FireLog = Rc<RefCell<Vec<(u8, u32)>>>;

// handler that records (id, fire time)
fn logging(log: &FireLog) -> impl FnMut(&mut Context<'_, ()>, TaskId) + 'static {
    let log = log.clone();
    move |ctx: &mut Context<'_, ()>, id: TaskId| log.borrow_mut().push((id.get(), ctx.now_ms()))
}

fn fires(log: &FireLog) -> usize {
    log.borrow().len()
}

#[test]
fn default_offset_waits_one_interval() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(100).times(3))
        .unwrap();

    clock.set(50);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(100);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    assert_eq!(jockey.task_iterations_remaining(id), Some(2));

    clock.set(199);
    jockey.tick();
    assert_eq!(fires(&log), 1);

    clock.set(200);
    jockey.tick();
    assert_eq!(jockey.task_iterations_remaining(id), Some(1));

    clock.set(300);
    let report = jockey.tick();
    assert_eq!((report.fired, report.removed), (1, 1));
    assert_eq!(*log.borrow(), [(1, 100), (1, 200), (1, 300)]);

    assert!(!jockey.contains_task(id));
    assert_eq!(jockey.task_args(id), None);
    assert_eq!(jockey.task_iterations_remaining(id), None);
    assert_eq!(jockey.task_last_run_time(id), None);
}

#[test]
fn immediate_start_fires_on_first_tick() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    jockey
        .add_task(logging(&log), (), TaskSpec::every(100).offset(100).forever())
        .unwrap();

    jockey.tick();
    assert_eq!(fires(&log), 1);

    clock.set(99);
    jockey.tick();
    assert_eq!(fires(&log), 1);

    clock.set(100);
    jockey.tick();
    assert_eq!(fires(&log), 2);
}

#[test]
fn partial_offset_shortens_first_period() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    jockey
        .add_task(logging(&log), (), TaskSpec::every(100).offset(30))
        .unwrap();

    clock.set(69);
    jockey.tick();
    assert_eq!(fires(&log), 0);
    clock.set(70);
    jockey.tick();
    assert_eq!(fires(&log), 1);
}

#[test]
fn pause_resume_preserves_phase() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(100))
        .unwrap();

    clock.set(40);
    assert!(jockey.pause_task(id));

    clock.set(10_000);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    assert!(jockey.resume_task(id));
    assert_eq!(jockey.task_last_run_time(id), Some(9_960));

    clock.set(10_059);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(10_060);
    jockey.tick();
    assert_eq!(fires(&log), 1);
}

#[test]
fn reset_pushes_next_fire_out() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(100))
        .unwrap();

    clock.set(50);
    assert!(jockey.reset_task_timer(id));

    clock.set(100);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(149);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(150);
    jockey.tick();
    assert_eq!(fires(&log), 1);
}

#[test]
fn reset_while_paused_resumes_with_a_full_period() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(100))
        .unwrap();

    clock.set(90);
    jockey.pause_task(id);
    jockey.reset_task_timer(id);
    assert_eq!(jockey.task_state(id), Some(TaskState::Paused));

    clock.set(500);
    jockey.resume_task(id);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(599);
    jockey.tick();
    assert_eq!(fires(&log), 0);
    clock.set(600);
    jockey.tick();
    assert_eq!(fires(&log), 1);
}

#[test]
fn earlier_task_fires_before_later_one_kills_it() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();

    let b = jockey
        .add_task(logging(&log), (), TaskSpec::every(10).immediately())
        .unwrap();

    let a_log = log.clone();
    let a = jockey
        .add_task(
            move |ctx, me| {
                a_log.borrow_mut().push((me.get(), ctx.now_ms()));
                ctx.kill_task(b);
                assert_eq!(ctx.task_state(b), Some(TaskState::Dead));
            },
            (),
            TaskSpec::every(10).immediately(),
        )
        .unwrap();

    let report = jockey.tick();
    assert_eq!(*log.borrow(), [(b.get(), 0), (a.get(), 0)]);
    assert_eq!(report.removed, 1);
    assert!(!jockey.contains_task(b));
    assert!(jockey.contains_task(a));
}

#[test]
fn later_task_killed_by_earlier_handler_does_not_fire() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();

    // ids are allocated 1, 2 in order; the killer knows its victim is 2
    let victim = TaskId::new(2).unwrap();
    let killer = jockey
        .add_task(
            move |ctx, _| {
                ctx.kill_task(victim);
            },
            (),
            TaskSpec::every(10).immediately(),
        )
        .unwrap();
    let registered = jockey
        .add_task(logging(&log), (), TaskSpec::every(10).immediately())
        .unwrap();
    assert_eq!(registered, victim);

    let report = jockey.tick();
    assert_eq!(report.fired, 1);
    assert_eq!(fires(&log), 0);
    assert!(jockey.contains_task(killer));
    assert!(!jockey.contains_task(victim));
}

#[test]
fn elapsed_time_survives_clock_wrap() {
    let clock = ManualClock::starting_at(u32::MAX - 299);
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(1_000))
        .unwrap();
    assert_eq!(jockey.task_last_run_time(id), Some(u32::MAX - 299));

    // 300 ms to the wrap, then 699 more: 999 elapsed
    clock.set(699);
    jockey.tick();
    assert_eq!(fires(&log), 0);

    clock.set(700);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    assert_eq!(jockey.task_last_run_time(id), Some(700));
}

#[test]
fn pause_across_wrap_keeps_phase() {
    let clock = ManualClock::starting_at(u32::MAX - 49);
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(100))
        .unwrap();

    clock.advance(30);
    jockey.pause_task(id);
    clock.advance(5_000);
    jockey.resume_task(id);

    clock.advance(69);
    jockey.tick();
    assert_eq!(fires(&log), 0);
    clock.advance(1);
    jockey.tick();
    assert_eq!(fires(&log), 1);
}

#[test]
fn zero_iterations_admitted_then_reaped() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let id = jockey
        .add_task(logging(&log), (), TaskSpec::every(10).immediately().times(0))
        .unwrap();
    assert!(jockey.contains_task(id));

    let report = jockey.tick();
    assert_eq!((report.fired, report.removed), (0, 1));
    assert!(!jockey.contains_task(id));
}

#[test]
fn self_pause_then_resume_waits_a_full_period() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let inner = log.clone();
    let id = jockey
        .add_task(
            move |ctx: &mut Context<'_, ()>, me: TaskId| {
                inner.borrow_mut().push((me.get(), ctx.now_ms()));
                ctx.pause_task(me);
            },
            (),
            TaskSpec::every(100),
        )
        .unwrap();

    clock.set(100);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    assert_eq!(jockey.task_state(id), Some(TaskState::Paused));
    assert_eq!(jockey.task_last_run_time(id), Some(100));

    clock.set(150);
    assert!(jockey.resume_task(id));
    assert_eq!(jockey.task_last_run_time(id), Some(150));
    jockey.tick();
    assert_eq!(fires(&log), 1);

    clock.set(249);
    jockey.tick();
    assert_eq!(fires(&log), 1);

    clock.set(250);
    jockey.tick();
    assert_eq!(*log.borrow(), [(id.get(), 100), (id.get(), 250)]);
}

#[test]
fn self_reset_lands_on_the_tick_sample() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();
    let inner = log.clone();
    let id = jockey
        .add_task(
            move |ctx: &mut Context<'_, ()>, me: TaskId| {
                inner.borrow_mut().push((me.get(), ctx.now_ms()));
                ctx.reset_task_timer(me);
            },
            (),
            TaskSpec::every(100),
        )
        .unwrap();

    clock.set(130);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    assert_eq!(jockey.task_last_run_time(id), Some(130));
    assert_eq!(jockey.task_state(id), Some(TaskState::Active));

    clock.set(229);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    clock.set(230);
    jockey.tick();
    assert_eq!(fires(&log), 2);
}

#[test]
fn handler_resumes_a_later_task_in_the_same_pass() {
    let clock = ManualClock::new();
    let mut jockey: Scheduler<&ManualClock> = Scheduler::new(&clock);
    let log = FireLog::default();

    // ids are allocated 1, 2 in order; the waker knows its sleeper is 2
    let sleeper = TaskId::new(2).unwrap();
    let waker = jockey
        .add_task(
            move |ctx: &mut Context<'_, ()>, _: TaskId| {
                assert!(ctx.resume_task(sleeper));
            },
            (),
            TaskSpec::every(1_000),
        )
        .unwrap();
    let registered = jockey
        .add_task(logging(&log), (), TaskSpec::every(100))
        .unwrap();
    assert_eq!(registered, sleeper);

    // paused 150 ms into a 100 ms period: overdue the moment it resumes
    clock.set(150);
    jockey.pause_task(sleeper);

    clock.set(1_000);
    let report = jockey.tick();
    assert_eq!(report.fired, 2);
    assert_eq!(*log.borrow(), [(sleeper.get(), 1_000)]);
    assert_eq!(jockey.task_state(sleeper), Some(TaskState::Active));
    assert!(jockey.contains_task(waker));

    clock.set(1_099);
    jockey.tick();
    assert_eq!(fires(&log), 1);
    clock.set(1_100);
    jockey.tick();
    assert_eq!(fires(&log), 2);
}
