use std::collections::VecDeque;

/// Time-ordered hit history over a trailing window.
///
/// All times are nanoseconds. Hits are strictly increasing; a hit exactly on
/// the window start (`now - window`) is still inside the window.
#[derive(Debug, Clone)]
pub struct HitWindow {
    window: i64,
    interval: i64,
    hits: VecDeque<i64>,
}

impl HitWindow {
    pub fn new(window: i64, interval: i64) -> Self {
        Self {
            window,
            interval,
            hits: VecDeque::new(),
        }
    }

    /// Inserts synthetic hits one interval apart after the last hit while
    /// `now - last >= 2 * interval`, so the stretch up to `now` counts as
    /// above threshold. Hits that would fall before the window start are
    /// skipped, which bounds the work by the window size.
    pub fn fill_gap(&mut self, now: i64) {
        let Some(&last) = self.hits.back() else {
            return;
        };
        let (now, last, interval) = (i128::from(now), i128::from(last), i128::from(self.interval));
        if now - last < 2 * interval {
            return;
        }

        let window_begin = now - i128::from(self.window);
        let first_step = (window_begin - last + interval - 1)
            .div_euclid(interval)
            .max(1);
        let last_step = (now - last) / interval - 1;
        for step in first_step..=last_step {
            // Lies strictly between `last` and `now`.
            self.hits.push_back((last + step * interval) as i64);
        }
    }

    /// Drops every hit older than `now - window`.
    pub fn prune(&mut self, now: i64) {
        let window_begin = now.saturating_sub(self.window);
        let keep_from = self.hits.partition_point(|&hit| hit < window_begin);
        self.hits.drain(..keep_from);
    }

    /// Appends a hit at `now`. Returns `false` and records nothing if `now`
    /// is not after the latest hit.
    pub fn record(&mut self, now: i64) -> bool {
        if self.hits.back().is_some_and(|&last| last >= now) {
            return false;
        }
        self.hits.push_back(now);
        true
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn hits(&self) -> &VecDeque<i64> {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
