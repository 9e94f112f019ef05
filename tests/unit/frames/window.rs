use super::*;

fn opts(total_frames: u32, mode: RoundingMode) -> WindowPlanOpts {
    WindowPlanOpts {
        total_frames,
        mode,
        ..WindowPlanOpts::default()
    }
}

#[test]
fn four_n_plus_one_rounding() {
    assert_eq!(down4(81), 81);
    assert_eq!(down4(84), 81);
    assert_eq!(down4(0), -3);
    assert_eq!(up4(81), 81);
    assert_eq!(up4(82), 85);
    assert_eq!(up4(60), 61);
}

#[test]
fn decrease_picks_closest_plan_not_exceeding_total() {
    let plan = plan_windows(&opts(200, RoundingMode::Decrease)).unwrap();
    assert_eq!(plan.window_frames, 69);
    assert_eq!(plan.window_count, 3);
    assert_eq!(plan.overlap, 9);
    assert_eq!(plan.total_frames, 189);
}

#[test]
fn increase_picks_closest_overshoot_and_clamps_total() {
    let plan = plan_windows(&opts(200, RoundingMode::Increase)).unwrap();
    assert_eq!(plan.window_frames, 73);
    assert_eq!(plan.window_count, 3);
    assert_eq!(plan.total_frames, 200);
    assert!(plan.notes.iter().any(|n| n.contains("201")));
}

#[test]
fn short_clip_forces_minimum_plan_when_decreasing() {
    let plan = plan_windows(&opts(100, RoundingMode::Decrease)).unwrap();
    assert_eq!((plan.window_frames, plan.window_count), (61, 2));
    assert_eq!(plan.total_frames, 113);
    assert!(plan.notes.last().unwrap().contains("forcing"));
}

#[test]
fn short_clip_overshoots_when_increasing() {
    let plan = plan_windows(&opts(100, RoundingMode::Increase)).unwrap();
    assert_eq!((plan.window_frames, plan.window_count), (61, 2));
    assert_eq!(plan.total_frames, 100);
}

#[test]
fn window_sizes_are_always_four_n_plus_one() {
    for total in [1, 50, 137, 200, 333, 500] {
        for mode in [RoundingMode::Decrease, RoundingMode::Increase] {
            let plan = plan_windows(&opts(total, mode)).unwrap();
            assert_eq!((plan.window_frames - 1) % 4, 0, "total={total} mode={mode:?}");
        }
    }
}

#[test]
fn out_of_range_options_are_adjusted_with_notes() {
    let plan = plan_windows(&WindowPlanOpts {
        total_frames: 300,
        window_min: 60,
        window_max: 83,
        count_min: 5,
        count_max: 2,
        overlap: 81,
        mode: RoundingMode::Decrease,
    })
    .unwrap();

    assert_eq!(plan.overlap, 40);
    let notes = plan.notes.join("\n");
    assert!(notes.contains("window_min adjusted from 60 to 61"));
    assert!(notes.contains("window_max adjusted from 83 to 81"));
    assert!(notes.contains("swapped"));
    assert!(notes.contains("overlap 81 too large, adjusted to 40"));
}

#[test]
fn min_above_max_lifts_max() {
    let plan = plan_windows(&WindowPlanOpts {
        total_frames: 500,
        window_min: 101,
        window_max: 81,
        ..WindowPlanOpts::default()
    })
    .unwrap();
    assert_eq!(plan.window_frames, 101);
}

#[test]
fn zero_total_is_rejected() {
    let err = plan_windows(&opts(0, RoundingMode::Decrease)).unwrap_err();
    assert!(matches!(err, PinmarkError::Validation(_)));
}

#[test]
fn oversized_counts_and_windows_are_rejected() {
    for o in [
        WindowPlanOpts {
            count_max: u32::MAX,
            ..WindowPlanOpts::default()
        },
        WindowPlanOpts {
            count_min: MAX_WINDOW_COUNT + 1,
            count_max: 2,
            ..WindowPlanOpts::default()
        },
        WindowPlanOpts {
            window_max: MAX_WINDOW_FRAMES + 4,
            ..WindowPlanOpts::default()
        },
    ] {
        let err = plan_windows(&o).unwrap_err();
        assert!(matches!(err, PinmarkError::Validation(_)), "{o:?}");
    }

    let plan = plan_windows(&WindowPlanOpts {
        total_frames: 10_000,
        window_min: MAX_WINDOW_FRAMES,
        window_max: MAX_WINDOW_FRAMES,
        count_min: 1,
        count_max: MAX_WINDOW_COUNT,
        ..WindowPlanOpts::default()
    })
    .unwrap();
    assert_eq!(plan.window_frames, MAX_WINDOW_FRAMES);
    assert!(plan.window_count <= MAX_WINDOW_COUNT);
}

#[test]
fn mode_parses_lowercase() {
    let o: WindowPlanOpts = serde_json::from_str(r#"{"total_frames":10,"mode":"increase"}"#).unwrap();
    assert_eq!(o.mode, RoundingMode::Increase);
    assert_eq!(o.window_max, 81);
}
