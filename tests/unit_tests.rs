//! Unit tests for the coroutine engines and their collaborators
//!
//! These tests run on the host (not embedded target) and drive the
//! engines' primitives directly.

#[cfg(test)]
mod coroutine_tests {
    use coop::{CoError, CoResult, Coroutine, Coroutines, CFG_CO_POINT_MAX, CO_STOPPED};

    #[test]
    fn test_new_engine_is_stopped() {
        let co: Coroutine<3> = Coroutine::new();
        for id in 0..3 {
            assert!(!co.is_running(id));
        }
        assert!(!co.any_running());
        assert_eq!(co.states(), &[CO_STOPPED; 3]);
    }

    #[test]
    fn test_suspend_marks_running() {
        let mut co: Coroutine<2> = Coroutine::new();

        let frame = co.begin::<1>();
        assert_eq!(frame.slot(), 1);
        assert_eq!(frame.point(), 0);

        let result: CoResult<()> = co.suspend(&frame);
        assert_eq!(result, CoResult::Running);
        assert!(co.is_running(1));
        assert!(!co.is_running(0));
        assert!(co.any_running());
    }

    #[test]
    fn test_resume_at_recorded_point() {
        let mut co: Coroutine<1> = Coroutine::new();

        // Point 0 must still count as running
        let frame = co.begin::<0>();
        let _: CoResult<()> = co.suspend(&frame);
        assert!(co.is_running(0));
        assert_eq!(co.begin::<0>().point(), 0);

        let mut frame = co.begin::<0>();
        frame.goto(7);
        let _: CoResult<()> = co.suspend(&frame);
        assert_eq!(co.begin::<0>().point(), 7);
        assert_eq!(co.state(0), Some(8));
    }

    #[test]
    fn test_finish_resets_slot() {
        let mut co: Coroutine<1> = Coroutine::new();

        let mut frame = co.begin::<0>();
        frame.goto(3);
        let _: CoResult<u8> = co.suspend(&frame);

        let frame = co.begin::<0>();
        assert_eq!(co.finish(&frame, 42u8), CoResult::Stop(42));
        assert!(!co.is_running(0));
        assert_eq!(co.begin::<0>().point(), 0);
    }

    #[test]
    fn test_fail_resets_slot() {
        let mut co: Coroutine<1> = Coroutine::new();

        let frame = co.begin::<0>();
        let _: CoResult<()> = co.suspend(&frame);

        let frame = co.begin::<0>();
        let result: CoResult<()> = co.fail(&frame, CoError::WrongState);
        assert_eq!(result, CoResult::WrongState);
        assert!(!co.is_running(0));
    }

    #[test]
    fn test_suspend_waiting_reports_code() {
        let mut co: Coroutine<1> = Coroutine::new();

        let frame = co.begin::<0>();
        let result: CoResult<()> = co.suspend_waiting(&frame, 120);
        assert_eq!(result, CoResult::Waiting(120));
        assert!(co.is_running(0));
    }

    #[test]
    fn test_advance_stops_at_last_point() {
        let mut co: Coroutine<1> = Coroutine::new();

        let mut frame = co.begin::<0>();
        frame.goto(CFG_CO_POINT_MAX - 1);
        frame.advance();
        assert_eq!(frame.point(), CFG_CO_POINT_MAX);
        frame.advance();
        assert_eq!(frame.point(), CFG_CO_POINT_MAX);

        let _: CoResult<()> = co.suspend(&frame);
        assert_eq!(co.begin::<0>().point(), CFG_CO_POINT_MAX);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "reserved waiting code")]
    fn test_suspend_waiting_rejects_stop_code() {
        let mut co: Coroutine<1> = Coroutine::new();
        let frame = co.begin::<0>();
        let _: CoResult<()> = co.suspend_waiting(&frame, 0);
    }

    fn run_all_slots(co: &mut Coroutine<4>) {
        let f0 = co.begin::<0>();
        let _: CoResult<()> = co.suspend(&f0);
        let f1 = co.begin::<1>();
        let _: CoResult<()> = co.suspend(&f1);
        let f2 = co.begin::<2>();
        let _: CoResult<()> = co.suspend(&f2);
        let f3 = co.begin::<3>();
        let _: CoResult<()> = co.suspend(&f3);
    }

    #[test]
    fn test_stop_single_slot() {
        let mut co: Coroutine<4> = Coroutine::new();
        run_all_slots(&mut co);

        assert!(co.stop(2));
        assert!(!co.is_running(2));
        assert!(co.is_running(0));
        assert!(co.is_running(1));
        assert!(co.is_running(3));
    }

    #[test]
    fn test_stop_out_of_range() {
        let mut co: Coroutine<4> = Coroutine::new();
        run_all_slots(&mut co);
        let before = co.states().to_vec();

        assert!(!co.stop(4));
        assert!(!co.stop(200));
        assert_eq!(co.states(), &before[..]);
        assert!(!co.is_running(4));
    }

    #[test]
    fn test_stop_all_idempotent() {
        let mut co: Coroutine<4> = Coroutine::new();
        run_all_slots(&mut co);

        co.stop_all();
        let once = co.states().to_vec();
        co.stop_all();
        assert_eq!(co.states(), &once[..]);
        assert!(!co.any_running());
        for id in 0..4 {
            assert!(!co.is_running(id));
        }
    }

    #[test]
    fn test_set_queries() {
        let mut co: Coroutine<4> = Coroutine::new();
        let f0 = co.begin::<0>();
        let _: CoResult<()> = co.suspend(&f0);
        let f2 = co.begin::<2>();
        let _: CoResult<()> = co.suspend(&f2);

        assert!(co.any_of_running(&[1, 2]));
        assert!(!co.any_of_running(&[1, 3]));
        assert!(co.all_running(&[0, 2]));
        assert!(!co.all_running(&[0, 1]));
        // Out-of-range ids are never running
        assert!(!co.all_running(&[0, 9]));
        assert!(co.join(&[1, 3, 9]));
        assert!(!co.join(&[3, 0]));

        // Vacuous sets
        assert!(co.all_running(&[]));
        assert!(co.join(&[]));
        assert!(!co.any_of_running(&[]));
    }
}

#[cfg(test)]
mod nested_tests {
    use coop::{CallerId, CoError, CoResult, Coroutines, MethodId, NestedCoroutine};

    const READ: MethodId = MethodId(0);
    const WRITE: MethodId = MethodId(1);

    #[test]
    fn test_claim_and_resume() {
        let mut co: NestedCoroutine<2> = NestedCoroutine::new();
        let a = CallerId::from_raw(0x1001);

        let mut frame = co.begin(READ, a).expect("idle level is claimed");
        assert_eq!(frame.slot(), 0);
        assert_eq!(co.level(), 1);

        frame.goto(2);
        let _: CoResult<()> = co.suspend(&frame);
        assert_eq!(co.level(), 0);
        assert!(co.is_running(0));
        assert_eq!(co.owner(0).map(|o| o.method), Some(READ));

        let frame = co.begin(READ, a).expect("same owner resumes");
        assert_eq!(frame.point(), 2);
    }

    #[test]
    fn test_other_caller_gets_wrong_state() {
        let mut co: NestedCoroutine<2> = NestedCoroutine::new();
        let a = CallerId::from_raw(0x1001);
        let b = CallerId::from_raw(0x1002);

        let mut frame = co.begin(READ, a).unwrap();
        frame.goto(1);
        let _: CoResult<()> = co.suspend(&frame);
        let before = co.states().to_vec();

        assert_eq!(co.begin(READ, b), Err(CoError::WrongState));
        assert_eq!(co.begin(WRITE, a), Err(CoError::WrongState));
        assert_eq!(co.begin(WRITE, b), Err(CoError::WrongState));

        // The call in flight is untouched
        assert_eq!(co.states(), &before[..]);
        assert_eq!(co.level(), 0);
        assert_eq!(co.begin(READ, a).map(|f| f.point()), Ok(1));
    }

    #[test]
    fn test_level_reusable_after_finish() {
        let mut co: NestedCoroutine<2> = NestedCoroutine::new();
        let a = CallerId::from_raw(0x1001);
        let b = CallerId::from_raw(0x1002);

        let frame = co.begin(READ, a).unwrap();
        let _: CoResult<()> = co.suspend(&frame);
        let frame = co.begin(READ, a).unwrap();
        assert_eq!(co.finish(&frame, ()), CoResult::Stop(()));
        assert_eq!(co.owner(0), None);

        let frame = co.begin(WRITE, b).expect("released level is claimable");
        assert_eq!(frame.point(), 0);
    }

    #[test]
    fn test_nested_levels() {
        let mut co: NestedCoroutine<2> = NestedCoroutine::new();
        let a = CallerId::unique();

        let outer = co.begin(READ, a).unwrap();
        let inner = co.begin(WRITE, a).unwrap();
        assert_eq!(outer.slot(), 0);
        assert_eq!(inner.slot(), 1);
        assert_eq!(co.level(), 2);

        assert_eq!(co.begin(READ, a), Err(CoError::NestingError));
        assert_eq!(co.level(), 2);

        let _: CoResult<()> = co.suspend(&inner);
        assert_eq!(co.level(), 1);
        let _: CoResult<()> = co.suspend(&outer);
        assert_eq!(co.level(), 0);
        assert_eq!(co.depth(), 2);
    }

    #[test]
    fn test_stop_clears_deeper_levels() {
        let mut co: NestedCoroutine<3> = NestedCoroutine::new();
        let a = CallerId::unique();

        let f0 = co.begin(READ, a).unwrap();
        let f1 = co.begin(WRITE, a).unwrap();
        let f2 = co.begin(MethodId(2), a).unwrap();
        let _: CoResult<()> = co.suspend(&f2);
        let _: CoResult<()> = co.suspend(&f1);
        let _: CoResult<()> = co.suspend(&f0);
        assert_eq!(co.depth(), 3);

        assert!(co.stop(1));
        assert!(co.is_running(0));
        assert!(!co.is_running(1));
        assert!(!co.is_running(2));
        assert_eq!(co.depth(), 1);

        assert!(!co.stop(3));
        co.stop_all();
        assert!(!co.any_running());
        assert_eq!(co.level(), 0);
    }
}

#[cfg(test)]
mod result_tests {
    use core::task::Poll;

    use coop::{CoError, CoResult, Resume, State};

    #[test]
    fn test_state_tags() {
        assert_eq!(CoResult::<u8>::Running.state(), State::Running);
        assert_eq!(CoResult::<u8>::Waiting(7).state(), State::Waiting(7));
        assert_eq!(CoResult::Stop(1u8).state(), State::Stop);
        assert_eq!(CoResult::<u8>::WrongState.state(), State::WrongState);
        assert_eq!(CoResult::<u8>::NestingError.state(), State::NestingError);

        assert_eq!(State::Stop.code(), 0);
        assert_eq!(State::NestingError.code(), 1);
        assert_eq!(State::WrongState.code(), 100);
        assert_eq!(State::Waiting(150).code(), 150);
        assert_eq!(State::Running.code(), 255);
    }

    #[test]
    fn test_waiting_codes_do_not_alias() {
        for reserved in [0u8, 1, 100, 255] {
            assert!(!State::is_waiting_code(reserved));
        }
        for code in (2u8..=99).chain(101..=254) {
            assert!(State::is_waiting_code(code));
            let state = CoResult::<()>::Waiting(code).state();
            assert_ne!(state.code(), State::Stop.code());
            assert_ne!(state.code(), State::NestingError.code());
            assert_ne!(state.code(), State::WrongState.code());
            assert_ne!(state.code(), State::Running.code());
        }
    }

    #[test]
    fn test_running_and_finished() {
        assert!(CoResult::<()>::Running.is_running());
        assert!(CoResult::<()>::Waiting(3).is_running());
        assert!(CoResult::Stop(()).is_finished());
        assert!(CoResult::<()>::WrongState.is_finished());
        assert!(CoResult::<()>::NestingError.is_finished());
    }

    #[test]
    fn test_value_only_on_stop() {
        assert_eq!(CoResult::Stop(42u8).value(), Some(42));
        assert_eq!(CoResult::<u8>::Running.value(), None);
        assert_eq!(CoResult::<u8>::WrongState.value(), None);

        assert_eq!(CoResult::Stop(42u8).finished(), Some(Ok(42)));
        assert_eq!(CoResult::<u8>::Running.finished(), None);
        assert_eq!(
            CoResult::<u8>::NestingError.finished(),
            Some(Err(CoError::NestingError))
        );
    }

    #[test]
    fn test_map_and_from() {
        assert_eq!(CoResult::Stop(20u8).map(|v| v * 2), CoResult::Stop(40));
        assert_eq!(CoResult::<u8>::Waiting(9).map(|v| v * 2), CoResult::Waiting(9));

        let result: CoResult<bool> = CoError::WrongState.into();
        assert_eq!(result, CoResult::WrongState);
        assert_eq!(State::from(CoError::NestingError), State::NestingError);
        assert!(State::WrongState.is_err());
        assert!(!State::Running.is_err());
    }

    #[test]
    fn test_resume() {
        assert_eq!(CoResult::<u8>::Running.resume(), Poll::Pending);
        assert_eq!(CoResult::<u8>::Waiting(101).resume(), Poll::Pending);
        assert_eq!(CoResult::Stop(5u8).resume(), Poll::Ready(Ok(5)));
        assert_eq!(
            CoResult::<u8>::WrongState.resume(),
            Poll::Ready(Err(CoError::WrongState))
        );

        assert_eq!(true.resume(), Poll::Pending);
        assert_eq!(false.resume(), Poll::Ready(()));
    }
}

#[cfg(test)]
mod protothread_tests {
    use coop::{run_all, Protothread, Thread, CFG_CO_POINT_MAX, PT_START, PT_STOPPED};

    #[test]
    fn test_lifecycle() {
        let mut pt = Protothread::new();
        assert!(pt.is_running());
        assert_eq!(pt.state(), PT_START);

        let mut frame = pt.begin();
        frame.goto(4);
        assert!(pt.suspend(&frame));
        assert_eq!(pt.begin().point(), 4);

        assert!(!pt.exit());
        assert!(!pt.is_running());
        assert_eq!(pt.begin().point(), PT_STOPPED);

        pt.restart();
        assert!(pt.is_running());
        assert_eq!(pt.begin().point(), 0);

        pt.stop();
        assert!(pt.restart_now());
        assert_eq!(pt.state(), PT_START);
    }

    #[test]
    fn test_yield_at_last_point_keeps_running() {
        let mut pt = Protothread::new();

        let mut frame = pt.begin();
        frame.goto(CFG_CO_POINT_MAX);
        frame.advance();
        assert!(pt.suspend(&frame));
        assert!(pt.is_running());
        assert_eq!(pt.state(), CFG_CO_POINT_MAX);
        assert_ne!(pt.state(), PT_STOPPED);
    }

    struct Countdown {
        left: u8,
        runs: u8,
    }

    impl Thread for Countdown {
        fn run(&mut self) -> bool {
            self.runs += 1;
            if self.left == 0 {
                return false;
            }
            self.left -= 1;
            true
        }
    }

    #[test]
    fn test_run_all() {
        let mut a = Countdown { left: 1, runs: 0 };
        let mut b = Countdown { left: 3, runs: 0 };

        let mut rounds = 0;
        while run_all(&mut [&mut a, &mut b]) {
            rounds += 1;
        }

        assert_eq!(rounds, 3);
        assert_eq!(a.runs, 4);
        assert_eq!(b.runs, 4);
    }
}

#[cfg(test)]
mod time_tests {
    use coop::time::{ms_to_ticks, TimeoutState};
    use coop::{Clock, ManualClock, PeriodicTimer, TimeSource, Timeout};

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0);
        clock.advance(5);
        assert_eq!(clock.now(), 5);
        clock.set(100);
        assert_eq!((&clock).now(), 100);
    }

    #[test]
    fn test_global_clock() {
        let before = Clock::now();
        Clock::increment();
        Clock::increment_by(4);
        assert_eq!(Clock::now().wrapping_sub(before), 5);
    }

    #[test]
    fn test_timeout_expiry() {
        let clock = ManualClock::new();
        let mut timeout = Timeout::with_clock(&clock);
        assert!(timeout.is_stopped());
        assert!(!timeout.is_expired());

        timeout.restart(10);
        assert!(timeout.is_armed());
        assert_eq!(timeout.remaining(), 10);

        clock.advance(9);
        assert!(!timeout.is_expired());
        assert_eq!(timeout.remaining(), 1);

        clock.advance(1);
        assert!(timeout.is_expired());
        assert_eq!(timeout.remaining(), 0);

        timeout.stop();
        assert_eq!(timeout.state(), TimeoutState::Stopped);
    }

    #[test]
    fn test_timeout_zero_expires_immediately() {
        let clock = ManualClock::new();
        let mut timeout = Timeout::with_clock(&clock);
        timeout.restart(0);
        assert!(timeout.is_expired());
    }

    #[test]
    fn test_timeout_wraps() {
        let clock = ManualClock::starting_at(u32::MAX - 5);
        let mut timeout = Timeout::with_clock(&clock);
        timeout.restart(10);

        clock.advance(9);
        assert!(timeout.is_armed());
        assert_eq!(timeout.remaining(), 1);

        clock.advance(1);
        assert!(timeout.is_expired());
    }

    #[test]
    fn test_timeout_expiry_latched() {
        let clock = ManualClock::new();
        let mut timeout = Timeout::with_clock(&clock);
        timeout.restart(10);
        clock.advance(10);
        assert!(timeout.is_expired());

        // Elapsed time computed now would be 0
        clock.set(0);
        assert!(timeout.is_expired());
    }

    /// Free-running source that moves on by 3 ticks every time it is read
    struct Racing {
        ticks: core::cell::Cell<u32>,
    }

    impl TimeSource for Racing {
        fn now(&self) -> u32 {
            let now = self.ticks.get();
            self.ticks.set(now + 3);
            now
        }
    }

    #[test]
    fn test_remaining_with_moving_clock() {
        let clock = Racing { ticks: core::cell::Cell::new(0) };
        let mut timeout = Timeout::with_clock(&clock);

        // Armed at 0, read at 3
        timeout.restart(5);
        assert_eq!(timeout.remaining(), 2);

        // Read at 6, past the deadline
        assert_eq!(timeout.remaining(), 0);
        assert!(timeout.is_expired());
        assert_eq!(timeout.remaining(), 0);
    }

    #[test]
    fn test_periodic_timer() {
        let clock = ManualClock::new();
        let mut timer = PeriodicTimer::with_clock(&clock, 10);

        clock.advance(9);
        assert!(!timer.execute());
        clock.advance(1);
        assert!(timer.execute());
        assert!(!timer.execute());

        clock.advance(10);
        assert!(timer.execute());

        // Missed several periods: fire once, then resync
        clock.advance(35);
        assert!(timer.execute());
        assert!(!timer.execute());
        clock.advance(10);
        assert!(timer.execute());

        timer.stop();
        clock.advance(10);
        assert!(!timer.execute());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(250), 250 * coop::CFG_TICK_RATE_HZ / 1000);
        assert_eq!(ms_to_ticks(u32::MAX), ((u32::MAX as u64 * coop::CFG_TICK_RATE_HZ as u64) / 1000) as u32);
    }
}

#[cfg(test)]
mod io_tests {
    use coop::TaskStatus;

    const PING: u8 = 1;
    const READ: u8 = 2;

    #[test]
    fn test_refused_start_stays_idle() {
        let status = TaskStatus::new();
        assert!(status.is_idle());

        assert!(!status.try_start(PING, || false));
        assert!(status.is_idle());
        assert!(!status.is_pending(PING));
    }

    #[test]
    fn test_transfer_lifecycle() {
        let status = TaskStatus::new();

        assert!(status.try_start(PING, || true));
        assert!(status.is_pending(PING));
        assert!(!status.succeeded(PING));

        status.complete(true);
        assert!(status.is_idle());
        assert!(status.succeeded(PING));
        assert!(!status.succeeded(READ));

        assert!(status.try_start(READ, || true));
        assert!(!status.succeeded(PING));
        status.complete(false);
        assert!(status.is_idle());
        assert!(!status.succeeded(READ));
    }
}

#[cfg(test)]
mod types_tests {
    use coop::CallerId;

    #[test]
    fn test_unique_callers() {
        let a = CallerId::unique();
        let b = CallerId::unique();
        assert_ne!(a, b);
        assert_ne!(a.raw(), 0);
        assert_ne!(b.raw(), 0);
        assert_eq!(CallerId::from_raw(7).raw(), 7);
    }

    #[test]
    fn test_callers_do_not_repeat() {
        let mut last = CallerId::unique().raw();
        for _ in 0..70_000 {
            let next = CallerId::unique().raw();
            // Other tests allocate concurrently, so only ordering is checked
            assert!(next > last);
            last = next;
        }
        assert!(last > u16::MAX as u32);
    }
}

#[cfg(test)]
mod config_tests {
    use coop::config::*;

    #[test]
    fn test_config_values() {
        assert!(CFG_TICK_RATE_HZ >= 10, "Tick rate too slow");
        assert!(CFG_TICK_RATE_HZ <= 10000, "Tick rate too fast");

        assert!(CFG_METHODS_DEFAULT >= 1);
        assert!(CFG_NESTING_LEVELS >= 1);
        assert!(CFG_NESTING_LEVELS <= u8::MAX as usize);

        // 0 must stay free for "stopped"
        assert_eq!(CFG_CO_POINT_MAX as u16 + 1, u8::MAX as u16);
    }
}

#[cfg(test)]
mod port_tests {
    use coop::ManualClock;

    #[test]
    fn test_host_port_is_inert() {
        let clock = ManualClock::new();
        coop::port::systick_init(16_000);
        coop::port::wait_for_interrupt();
        // The host has no tick source of its own
        assert_eq!(coop::TimeSource::now(&clock), 0);
    }
}
