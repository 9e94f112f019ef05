//! Sliding-window planning for long video generation.
//!
//! Long clips are generated as `window_count` windows of `window_frames` frames each, with
//! consecutive windows sharing `overlap` frames. Window sizes are always of the form `4n + 1`.

use crate::foundation::error::{PinmarkError, PinmarkResult};

/// Largest accepted `window_min` / `window_max`.
pub const MAX_WINDOW_FRAMES: u32 = 401;
/// Largest accepted `count_min` / `count_max`.
pub const MAX_WINDOW_COUNT: u32 = 100;

/// What to do when no window configuration covers the requested length exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Prefer covering at most `total_frames`.
    #[default]
    Decrease,
    /// Prefer covering more than `total_frames`; the reported total stays at the request.
    Increase,
}

/// Planner input.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowPlanOpts {
    /// Frames to cover.
    pub total_frames: u32,
    /// Smallest window size (rounded up to `4n + 1`).
    pub window_min: u32,
    /// Largest window size (rounded down to `4n + 1`).
    pub window_max: u32,
    /// Fewest windows to consider.
    pub count_min: u32,
    /// Most windows to consider.
    pub count_max: u32,
    /// Frames shared by consecutive windows.
    pub overlap: u32,
    /// Tie-break direction when the length cannot be hit exactly.
    pub mode: RoundingMode,
}

impl Default for WindowPlanOpts {
    fn default() -> Self {
        Self {
            total_frames: 100,
            window_min: 61,
            window_max: 81,
            count_min: 2,
            count_max: 5,
            overlap: 9,
            mode: RoundingMode::Decrease,
        }
    }
}

/// Recommended window configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WindowPlan {
    /// Frames per window, `4n + 1`.
    pub window_frames: u32,
    /// Number of windows.
    pub window_count: u32,
    /// Frames shared by consecutive windows (possibly adjusted).
    pub overlap: u32,
    /// Usable frame count after planning.
    pub total_frames: u32,
    /// Human-readable adjustments and outcome, in order.
    pub notes: Vec<String>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    w: i64,
    n: i64,
    covered: i64,
}

fn down4(v: i64) -> i64 {
    (v - 1).div_euclid(4) * 4 + 1
}

fn up4(v: i64) -> i64 {
    if (v - 1).rem_euclid(4) == 0 {
        v
    } else {
        down4(v) + 4
    }
}

fn coverage(w: i64, n: i64, o: i64) -> i64 {
    w * n - o * (n - 1)
}

/// Pick window size and count so that the windows cover `opts.total_frames` as closely as
/// possible.
///
/// Out-of-range options are adjusted rather than rejected, with each adjustment recorded in
/// [`WindowPlan::notes`]. `total_frames == 0`, zero minimums, window sizes above
/// [`MAX_WINDOW_FRAMES`] and counts above [`MAX_WINDOW_COUNT`] are errors.
pub fn plan_windows(opts: &WindowPlanOpts) -> PinmarkResult<WindowPlan> {
    if opts.total_frames == 0 {
        return Err(PinmarkError::validation("total_frames must be > 0"));
    }
    if opts.window_min == 0 || opts.count_min == 0 || opts.count_max == 0 {
        return Err(PinmarkError::validation(
            "window_min, count_min and count_max must be >= 1",
        ));
    }
    if opts.window_min > MAX_WINDOW_FRAMES || opts.window_max > MAX_WINDOW_FRAMES {
        return Err(PinmarkError::validation(format!(
            "window_min and window_max must be <= {MAX_WINDOW_FRAMES}"
        )));
    }
    if opts.count_min > MAX_WINDOW_COUNT || opts.count_max > MAX_WINDOW_COUNT {
        return Err(PinmarkError::validation(format!(
            "count_min and count_max must be <= {MAX_WINDOW_COUNT}"
        )));
    }

    let t = i64::from(opts.total_frames);
    let mut notes = Vec::new();

    let min_w = up4(i64::from(opts.window_min));
    let mut max_w = down4(i64::from(opts.window_max));
    if min_w != i64::from(opts.window_min) {
        notes.push(format!(
            "window_min adjusted from {} to {min_w} (must be 4n+1)",
            opts.window_min
        ));
    }
    if max_w != i64::from(opts.window_max) {
        notes.push(format!(
            "window_max adjusted from {} to {max_w} (must be 4n+1)",
            opts.window_max
        ));
    }
    if min_w > max_w {
        max_w = min_w;
        notes.push(format!("window_min exceeds window_max, window_max set to {max_w}"));
    }

    let (mut min_n, mut max_n) = (i64::from(opts.count_min), i64::from(opts.count_max));
    if min_n > max_n {
        std::mem::swap(&mut min_n, &mut max_n);
        notes.push("count_min exceeds count_max, swapped".to_string());
    }

    let mut o = i64::from(opts.overlap);
    if o >= max_w {
        o = (max_w / 2).max(1);
        notes.push(format!("overlap {} too large, adjusted to {o}", opts.overlap));
    }

    let mut best_decrease: Option<Candidate> = None;
    let mut best_increase: Option<Candidate> = None;
    for n in min_n..=max_n {
        let allow = (t + o * (n - 1)).div_euclid(n);

        let dec = down4(allow);
        if dec >= min_w {
            let w = dec.min(max_w);
            let covered = coverage(w, n, o);
            let diff = t - covered;
            if diff >= 0 && best_decrease.is_none_or(|b| diff < t - b.covered) {
                best_decrease = Some(Candidate { w, n, covered });
            }
        }

        let w = up4(allow + 1).max(min_w);
        if w <= max_w {
            let covered = coverage(w, n, o);
            if covered > t && best_increase.is_none_or(|b| covered - t < b.covered - t) {
                best_increase = Some(Candidate { w, n, covered });
            }
        }
    }

    let forced = Candidate {
        w: min_w,
        n: min_n,
        covered: coverage(min_w, min_n, o),
    };
    let chosen = match opts.mode {
        RoundingMode::Decrease => match best_decrease {
            Some(c) => {
                notes.push(format!(
                    "recommended {} windows of {} frames, covering {} ({} fewer than requested)",
                    c.n,
                    c.w,
                    c.covered,
                    t - c.covered
                ));
                c
            }
            None => {
                notes.push(format!(
                    "no plan covers at most {t} frames, forcing {} windows of {} frames ({} frames)",
                    forced.n, forced.w, forced.covered
                ));
                forced
            }
        },
        RoundingMode::Increase => match (best_increase, best_decrease) {
            (Some(c), _) => {
                notes.push(format!(
                    "recommended {} windows of {} frames, covering {} ({} more than requested)",
                    c.n,
                    c.w,
                    c.covered,
                    c.covered - t
                ));
                c
            }
            (None, Some(c)) => {
                notes.push(format!(
                    "no plan exceeds {t} frames, falling back to {} windows of {} frames ({} short)",
                    c.n,
                    c.w,
                    t - c.covered
                ));
                c
            }
            (None, None) => {
                notes.push(format!(
                    "no valid plan, forcing {} windows of {} frames",
                    forced.n, forced.w
                ));
                forced
            }
        },
    };

    let mut total = chosen.covered;
    if opts.mode == RoundingMode::Increase && total > t {
        notes.push(format!("covered {total} > {t}, total_frames kept at {t}"));
        total = t;
    }

    tracing::debug!(
        window_frames = chosen.w,
        window_count = chosen.n,
        overlap = o,
        total,
        "planned frame windows"
    );

    Ok(WindowPlan {
        window_frames: to_u32(chosen.w),
        window_count: to_u32(chosen.n),
        overlap: to_u32(o),
        total_frames: to_u32(total),
        notes,
    })
}

fn to_u32(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/frames/window.rs"]
mod tests;
