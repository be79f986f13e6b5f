//! Step counter for multi-language operations such as install.

use std::time::Instant;

/// Prints `[n/total] label: item` as each step starts
pub struct Progress {
    total: usize,
    current: usize,
    label: String,
    start_time: Instant,
}

impl Progress {
    pub fn new(total: usize, label: impl Into<String>) -> Self {
        Self {
            total,
            current: 0,
            label: label.into(),
            start_time: Instant::now(),
        }
    }

    /// Start the next step
    pub fn advance(&mut self, item: &str) {
        self.current = (self.current + 1).min(self.total);
        println!("{}", self.line(item));
    }

    fn line(&self, item: &str) -> String {
        format!("[{}/{}] {}: {}", self.current, self.total, self.label, item)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_steps() {
        let mut progress = Progress::new(2, "Installing");

        progress.advance("python");
        assert_eq!(progress.line("python"), "[1/2] Installing: python");

        progress.advance("javascript");
        progress.advance("extra");
        assert_eq!(progress.line("go"), "[2/2] Installing: go");
    }
}
