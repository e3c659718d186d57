// ABOUTME: Frame pacing and rolling frame statistics.
// ABOUTME: Computes frame deadlines for a target rate and summarizes per-stage timings.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frames the rolling statistics cover
pub const STATS_WINDOW: usize = 100;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Tracks frame delta time and the deadline for the next frame
#[derive(Debug)]
pub struct FramePacer {
    frame_time: Option<Duration>,
    last_tick: Instant,
}

impl FramePacer {
    /// `frame_rate` of 0 means uncapped
    pub fn new(frame_rate: u32) -> Self {
        let frame_time = (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate);
        Self {
            frame_time,
            last_tick: Instant::now(),
        }
    }

    pub fn frame_time(&self) -> Option<Duration> {
        self.frame_time
    }

    /// Seconds since the previous call, advancing the clock
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// When the next frame should start, or None when uncapped
    pub fn next_deadline(&self) -> Option<Instant> {
        self.frame_time.map(|frame| self.last_tick + frame)
    }

    /// Time left in the current frame after `elapsed` of work
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.frame_time
            .map_or(Duration::ZERO, |frame| frame.saturating_sub(elapsed))
    }
}

/// Timings for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSample {
    pub total: Duration,
    pub instructions: Duration,
    pub accumulate: Duration,
    pub render: Duration,
    pub executed: usize,
}

/// Rolling window of recent frames, summarized about once per second
#[derive(Debug)]
pub struct FrameStats {
    samples: VecDeque<FrameSample>,
    last_report: Instant,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            samples: VecDeque::with_capacity(STATS_WINDOW),
            last_report: now,
        }
    }

    pub fn record(&mut self, sample: FrameSample) {
        if self.samples.len() == STATS_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean of every field over the window
    pub fn average(&self) -> FrameSample {
        let count = self.samples.len();
        if count == 0 {
            return FrameSample::default();
        }
        let sum = self.samples.iter().fold(FrameSample::default(), |acc, s| FrameSample {
            total: acc.total + s.total,
            instructions: acc.instructions + s.instructions,
            accumulate: acc.accumulate + s.accumulate,
            render: acc.render + s.render,
            executed: acc.executed + s.executed,
        });
        let n = count as u32;
        FrameSample {
            total: sum.total / n,
            instructions: sum.instructions / n,
            accumulate: sum.accumulate / n,
            render: sum.render / n,
            executed: sum.executed / count,
        }
    }

    pub fn fps(&self) -> f32 {
        let total = self.average().total.as_secs_f32();
        if total > 0.0 {
            1.0 / total
        } else {
            0.0
        }
    }

    /// A one-line summary once per reporting interval
    pub fn summary(&mut self) -> Option<String> {
        self.summary_at(Instant::now())
    }

    pub fn summary_at(&mut self, now: Instant) -> Option<String> {
        if self.samples.is_empty() || now.saturating_duration_since(self.last_report) < REPORT_INTERVAL {
            return None;
        }
        self.last_report = now;

        let avg = self.average();
        Some(format!(
            "{:.0} fps | frame {:.2}ms | instr {:.2}ms | accum {:.2}ms | render {:.2}ms | {} instr/frame",
            self.fps(),
            millis(avg.total),
            millis(avg.instructions),
            millis(avg.accumulate),
            millis(avg.render),
            avg.executed,
        ))
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_has_no_deadline() {
        let pacer = FramePacer::new(0);
        assert_eq!(pacer.frame_time(), None);
        assert_eq!(pacer.next_deadline(), None);
        assert_eq!(pacer.remaining(Duration::from_millis(1)), Duration::ZERO);
    }

    #[test]
    fn capped_rate_leaves_remaining_time() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.frame_time(), Some(Duration::from_millis(20)));
        assert_eq!(pacer.remaining(Duration::from_millis(5)), Duration::from_millis(15));
        assert_eq!(pacer.remaining(Duration::from_millis(30)), Duration::ZERO);
    }

    #[test]
    fn tick_measures_delta() {
        let mut pacer = FramePacer::new(60);
        let start = Instant::now();
        pacer.tick_at(start);
        let delta = pacer.tick_at(start + Duration::from_millis(250));
        assert!((delta - 0.25).abs() < 1e-6);
        assert_eq!(
            pacer.next_deadline(),
            Some(start + Duration::from_millis(250) + Duration::from_secs(1) / 60)
        );
    }

    #[test]
    fn window_is_bounded() {
        let mut stats = FrameStats::new();
        for _ in 0..(STATS_WINDOW * 2) {
            stats.record(FrameSample::default());
        }
        assert_eq!(stats.len(), STATS_WINDOW);
    }

    #[test]
    fn average_and_fps() {
        let mut stats = FrameStats::new();
        stats.record(FrameSample {
            total: Duration::from_millis(10),
            executed: 100,
            ..Default::default()
        });
        stats.record(FrameSample {
            total: Duration::from_millis(30),
            executed: 300,
            ..Default::default()
        });
        let avg = stats.average();
        assert_eq!(avg.total, Duration::from_millis(20));
        assert_eq!(avg.executed, 200);
        assert!((stats.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn summary_once_per_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        assert!(stats.summary_at(start + Duration::from_secs(2)).is_none());

        stats.record(FrameSample {
            total: Duration::from_millis(16),
            ..Default::default()
        });
        assert!(stats.summary_at(start + Duration::from_millis(500)).is_none());

        let line = stats.summary_at(start + Duration::from_secs(1)).unwrap();
        assert!(line.contains("fps"));
        assert!(stats.summary_at(start + Duration::from_millis(1500)).is_none());
    }
}
