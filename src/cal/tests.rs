use super::*;

/// 21 adjustments over 20 bytes: 21 * 15625 / 160 = 2050 ppm.
const FAST_CDR: i16 = 21;
/// 10 adjustments over 20 bytes: 976 ppm, inside the band.
const SLIGHTLY_FAST_CDR: i16 = 10;

fn frame(cdr: i16, if_est: u16, chip_errors: u8) -> FrameObservation {
    FrameObservation {
        packet_len: 20,
        cdr_adjustments: cdr,
        if_zero_crossings: if_est,
        chip_errors,
    }
}

fn run(cal: &mut Calibrator, obs: FrameObservation, n: usize) -> Adjustment {
    let mut last = Adjustment::default();
    for _ in 0..n {
        last = cal.process(&obs);
    }
    last
}

#[test]
fn nothing_changes_before_the_update_point() {
    let mut cal = Calibrator::new(Config::default());
    let ch = cal.state().active_channel;
    let fast = frame(FAST_CDR, 600, 0);

    for i in 1..15u16 {
        let adj = cal.process(&fast);
        assert!(adj.is_empty());
        assert_eq!(cal.state().cooldown, i);
        assert_eq!(cal.state().if_fine, 18);
        assert_eq!(cal.lo_code(ch, Direction::Tx), DEFAULT_TX_LO_CODE);
    }

    let adj = cal.process(&fast);
    assert_eq!(adj.if_fine, Some(Step::Up));
    assert_eq!(adj.lo, Some(Step::Up));
    assert_eq!(cal.state().cooldown, 0);
}

#[test]
fn rate_error_steps_if_fine_once_per_window() {
    let mut cal = Calibrator::new(Config::default());
    let fast = frame(FAST_CDR, 500, 0);

    let adj = run(&mut cal, fast, 15);
    assert!(cal.estimator().rate_ppm() > 1000);
    assert_eq!(adj, Adjustment { if_fine: Some(Step::Up), lo: None });
    assert_eq!(cal.state().if_fine, 19);
    assert_eq!(cal.state().cooldown, 0);

    // frames 16..=29
    for _ in 16..30 {
        assert!(cal.process(&fast).is_empty());
        assert_eq!(cal.state().if_fine, 19);
    }

    // frame 30
    let adj = cal.process(&fast);
    assert_eq!(adj.if_fine, Some(Step::Up));
    assert_eq!(cal.state().if_fine, 20);
}

#[test]
fn negative_rate_error_steps_down() {
    let mut cal = Calibrator::new(Config::default());
    let adj = run(&mut cal, frame(-FAST_CDR, 500, 0), 15);
    assert_eq!(adj.if_fine, Some(Step::Down));
    assert_eq!(cal.state().if_fine, 17);
}

#[test]
fn estimates_inside_the_bands_change_nothing() {
    let mut cal = Calibrator::new(Config::default());
    let ch = cal.state().active_channel;

    for if_est in [480u16, 500, 520] {
        for cdr in [SLIGHTLY_FAST_CDR, 0, -SLIGHTLY_FAST_CDR] {
            let adj = run(&mut cal, frame(cdr, if_est, 0), 15);
            assert!(adj.is_empty(), "cdr {} if {}", cdr, if_est);
        }
    }
    assert_eq!(cal.state().if_fine, 18);
    assert_eq!(cal.lo_code(ch, Direction::Tx), DEFAULT_TX_LO_CODE);
    assert_eq!(cal.lo_code(ch, Direction::Rx), DEFAULT_RX_LO_CODE);
}

#[test]
fn if_error_steps_both_lo_codes_of_active_channel_only() {
    let mut cal = Calibrator::new(Config::default());
    let active = Channel::new(17).unwrap();
    let other = Channel::new(18).unwrap();
    cal.set_active_channel(active);

    let adj = run(&mut cal, frame(0, 540, 0), 15);
    assert_eq!(adj, Adjustment { if_fine: None, lo: Some(Step::Up) });
    assert_eq!(cal.lo_code(active, Direction::Tx), DEFAULT_TX_LO_CODE + 1);
    assert_eq!(cal.lo_code(active, Direction::Rx), DEFAULT_RX_LO_CODE + 1);
    assert_eq!(cal.lo_code(other, Direction::Tx), DEFAULT_TX_LO_CODE);
    assert_eq!(cal.lo_code(other, Direction::Rx), DEFAULT_RX_LO_CODE);

    let adj = run(&mut cal, frame(0, 450, 0), 15);
    assert_eq!(adj.lo, Some(Step::Down));
    assert_eq!(cal.lo_code(active, Direction::Tx), DEFAULT_TX_LO_CODE);
    assert_eq!(cal.lo_code(active, Direction::Rx), DEFAULT_RX_LO_CODE);
}

#[test]
fn noisy_frames_do_not_move_the_lo() {
    let mut cal = Calibrator::new(Config::default());
    let ch = cal.state().active_channel;

    // IF samples are all rejected, rate samples still count
    let adj = run(&mut cal, frame(FAST_CDR, 600, 25), 15);
    assert_eq!(adj, Adjustment { if_fine: Some(Step::Up), lo: None });
    assert_eq!(cal.estimator().if_estimate(), IF_NOMINAL);
    assert_eq!(cal.lo_code(ch, Direction::Rx), DEFAULT_RX_LO_CODE);
}

#[test]
fn empty_frames_still_advance_the_cooldown() {
    let mut cal = Calibrator::new(Config::default());
    let empty = FrameObservation {
        packet_len: 0,
        cdr_adjustments: 100,
        if_zero_crossings: 500,
        chip_errors: 0,
    };
    for i in 1..15u16 {
        cal.process(&empty);
        assert_eq!(cal.state().cooldown, i);
    }
    assert!(cal.process(&empty).is_empty());
    assert_eq!(cal.state().cooldown, 0);
    assert_eq!(cal.estimator().rate_ppm(), 0);
}

#[test]
fn fine_code_clamps_at_the_top() {
    let mut cal = Calibrator::new(Config {
        if_fine: 31,
        ..Config::default()
    });
    let adj = run(&mut cal, frame(FAST_CDR, 500, 0), 15);
    assert_eq!(adj.if_fine, None);
    assert_eq!(cal.state().if_fine, 31);
    assert_eq!(cal.state().cooldown, 0);
}

#[test]
fn fine_code_clamps_at_the_bottom() {
    let mut cal = Calibrator::new(Config {
        if_fine: 0,
        ..Config::default()
    });
    let adj = run(&mut cal, frame(-FAST_CDR, 500, 0), 15);
    assert_eq!(adj.if_fine, None);
    assert_eq!(cal.state().if_fine, 0);
}

#[test]
fn fine_code_wraps_when_asked() {
    let mut cal = Calibrator::new(Config {
        if_fine: 31,
        fine_code_policy: FineCodePolicy::Wrap,
        ..Config::default()
    });
    let adj = run(&mut cal, frame(FAST_CDR, 500, 0), 15);
    assert_eq!(adj.if_fine, Some(Step::Up));
    assert_eq!(cal.state().if_fine, 0);

    let mut cal = Calibrator::new(Config {
        if_fine: 0,
        fine_code_policy: FineCodePolicy::Wrap,
        ..Config::default()
    });
    run(&mut cal, frame(-FAST_CDR, 500, 0), 15);
    assert_eq!(cal.state().if_fine, 31);
}

#[test]
fn custom_update_rate() {
    let mut cal = Calibrator::new(Config {
        update_rate: 20,
        ..Config::default()
    });
    let fast = frame(FAST_CDR, 500, 0);
    assert!(run(&mut cal, fast, 19).is_empty());
    assert_eq!(cal.process(&fast).if_fine, Some(Step::Up));
}
