//! Progress observers
//!
//! Purely informational: nothing in the transcoder branches on progress.

use tracing::debug;

pub trait Progress {
    /// Report that another `percent` of the overall job has completed
    fn advance(&mut self, percent: f32);
}

/// Discards all progress reports
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&mut self, _percent: f32) {}
}

/// Accumulates progress and logs every `step` percent
#[derive(Debug, Clone)]
pub struct LogProgress {
    label: &'static str,
    total: f32,
    step: f32,
    next: f32,
}

impl LogProgress {
    pub fn new(label: &'static str) -> Self {
        Self::with_step(label, 10.0)
    }

    pub fn with_step(label: &'static str, step: f32) -> Self {
        Self { label, total: 0.0, step, next: step }
    }

    pub fn total(&self) -> f32 {
        self.total
    }
}

impl Progress for LogProgress {
    fn advance(&mut self, percent: f32) {
        self.total += percent;
        while self.total >= self.next {
            debug!("{}: {:.0}%", self.label, self.next);
            self.next += self.step;
        }
    }
}

impl<F: FnMut(f32)> Progress for F {
    fn advance(&mut self, percent: f32) {
        self(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_accumulates() {
        let mut progress = LogProgress::with_step("test", 25.0);
        for _ in 0..10 {
            progress.advance(5.0);
        }
        assert!((progress.total() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |p: f32| seen.push(p);
            let progress: &mut dyn Progress = &mut observer;
            progress.advance(5.0);
            progress.advance(1.5);
        }
        assert_eq!(seen, vec![5.0, 1.5]);
    }
}
