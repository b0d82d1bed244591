/// Run scoring: stats, the run timer, and the final-time formula.
///
/// ```text
/// final = max(0, raw - toasts*0.10 - kills*0.25 + lives_lost*1.00)
/// ```
///
/// ## Timer
/// ┌──────────────┬────────────────────┬──────────────┐
/// │ State         │ Event               │ Next          │
/// ├──────────────┼────────────────────┼──────────────┤
/// │ NotStarted    │ first control input │ Running       │
/// │ Running       │ death / completion  │ Stopped       │
/// │ Stopped       │ anything            │ Stopped       │
/// │ any           │ level restart       │ NotStarted    │
/// └──────────────┴────────────────────┴──────────────┘

pub const TOAST_BONUS_SECS: f64 = 0.10;
pub const KILL_BONUS_SECS: f64 = 0.25;
pub const LIFE_PENALTY_SECS: f64 = 1.00;

/// Counts accumulated over one run. Reset only by a level restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub toast_count: u32,
    pub sockroach_kills: u32,
    pub lives_lost: u32,
}

/// Non-finite or negative increments count as zero.
fn coerce_increment(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

impl LevelStats {
    pub fn add_toast(&mut self, value: f64) {
        self.toast_count = self.toast_count.saturating_add(coerce_increment(value));
    }

    pub fn add_kill(&mut self) {
        self.sockroach_kills = self.sockroach_kills.saturating_add(1);
    }

    pub fn add_life_lost(&mut self) {
        self.lives_lost = self.lives_lost.saturating_add(1);
    }

    pub fn final_time(&self, raw_secs: f64) -> f64 {
        final_time(raw_secs, self)
    }

    /// Freeze the run into a result for the leaderboard collaborator.
    pub fn finish(&self, raw_secs: f64) -> LevelResult {
        LevelResult {
            final_time: self.final_time(raw_secs),
            raw_time: raw_secs.max(0.0),
            toast_count: self.toast_count,
            sockroach_kills: self.sockroach_kills,
            lives_lost: self.lives_lost,
        }
    }
}

pub fn final_time(raw_secs: f64, stats: &LevelStats) -> f64 {
    let raw = if raw_secs.is_finite() { raw_secs } else { 0.0 };
    let adjusted = raw
        - f64::from(stats.toast_count) * TOAST_BONUS_SECS
        - f64::from(stats.sockroach_kills) * KILL_BONUS_SECS
        + f64::from(stats.lives_lost) * LIFE_PENALTY_SECS;
    adjusted.max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelResult {
    pub final_time: f64,
    pub raw_time: f64,
    pub toast_count: u32,
    pub sockroach_kills: u32,
    pub lives_lost: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunTimer {
    #[default]
    NotStarted,
    Running { started_ms: u64 },
    Stopped { elapsed_ms: u64 },
}

impl RunTimer {
    /// Start on first input. Returns true only on the NotStarted → Running edge.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if *self == RunTimer::NotStarted {
            *self = RunTimer::Running { started_ms: now_ms };
            true
        } else {
            false
        }
    }

    /// Freeze the clock. Stopping before the start freezes it at zero.
    pub fn stop(&mut self, now_ms: u64) {
        let elapsed_ms = self.elapsed_ms(now_ms);
        *self = RunTimer::Stopped { elapsed_ms };
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match *self {
            RunTimer::NotStarted => 0,
            RunTimer::Running { started_ms } => now_ms.saturating_sub(started_ms),
            RunTimer::Stopped { elapsed_ms } => elapsed_ms,
        }
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> f64 {
        self.elapsed_ms(now_ms) as f64 / 1000.0
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunTimer::Running { .. })
    }

    pub fn reset(&mut self) {
        *self = RunTimer::NotStarted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats(toasts: u32, kills: u32, lives: u32) -> LevelStats {
        LevelStats { toast_count: toasts, sockroach_kills: kills, lives_lost: lives }
    }

    #[test]
    fn reference_run_scores_sixty() {
        assert_relative_eq!(final_time(60.0, &stats(10, 4, 2)), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn bonuses_never_go_below_zero() {
        assert_eq!(final_time(1.0, &stats(100, 10, 0)), 0.0);
        assert_eq!(final_time(f64::NAN, &stats(0, 0, 0)), 0.0);
    }

    #[test]
    fn lives_lost_add_a_second_each() {
        assert_relative_eq!(final_time(10.0, &stats(0, 0, 3)), 13.0);
    }

    #[test]
    fn bad_increments_count_as_zero() {
        let mut s = LevelStats::default();
        s.add_toast(f64::NAN);
        s.add_toast(-4.0);
        s.add_toast(f64::INFINITY);
        assert_eq!(s.toast_count, 0);
        s.add_toast(1.0);
        s.add_toast(5.0);
        assert_eq!(s.toast_count, 6);
    }

    #[test]
    fn finish_carries_counts() {
        let mut s = LevelStats::default();
        s.add_kill();
        s.add_life_lost();
        let r = s.finish(20.0);
        assert_relative_eq!(r.final_time, 20.75);
        assert_eq!(r.raw_time, 20.0);
        assert_eq!((r.sockroach_kills, r.lives_lost), (1, 1));
    }

    #[test]
    fn timer_only_starts_once() {
        let mut t = RunTimer::default();
        assert_eq!(t.elapsed_ms(5_000), 0);
        assert!(t.start(1_000));
        assert!(!t.start(2_000));
        assert_eq!(t.elapsed_ms(3_500), 2_500);
    }

    #[test]
    fn stopped_timer_is_frozen() {
        let mut t = RunTimer::default();
        t.start(0);
        t.stop(4_000);
        assert_eq!(t.elapsed_ms(99_000), 4_000);
        assert!(!t.start(100_000));
        assert_relative_eq!(t.elapsed_secs(1), 4.0);
    }

    #[test]
    fn stop_before_start_freezes_at_zero() {
        let mut t = RunTimer::default();
        t.stop(7_000);
        assert_eq!(t, RunTimer::Stopped { elapsed_ms: 0 });
        t.reset();
        assert!(t.start(8_000));
    }
}
