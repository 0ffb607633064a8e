//! Console progress line for file-to-file runs.
//!
//! Active only when `-o` has redirected the data stream to a file, which
//! leaves stdout free for status. The line is rewritten in place with `\r`
//! and throttled so the terminal is touched at most once per second and
//! once per MiB of new progress.

use std::io::{self, Write};
use std::time::{Duration, Instant};

const BAR_LEN: usize = 32;

/// Minimum new progress between renders.
const MIN_DIFF_BYTES: u64 = 1024 * 1024;

/// Minimum wall-clock gap between renders.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Throttled progress reporter.
pub struct Progress {
    /// Input size in bytes, 0 when unknown (stdin).
    total: u64,
    last_render: Option<Instant>,
    last_processed: u64,
    last_len: usize,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            last_render: None,
            last_processed: 0,
            last_len: 0,
        }
    }

    /// Record progress and maybe render. The first call that clears the
    /// byte threshold only arms the clock; renders happen once the
    /// wall-clock gate opens too. `force` bypasses both gates but still
    /// needs an armed clock, so a short run stays silent.
    pub fn report(&mut self, processed: u64, force: bool) {
        if processed - self.last_processed < MIN_DIFF_BYTES && !force {
            return;
        }
        let now = Instant::now();
        let Some(last) = self.last_render else {
            self.last_render = Some(now);
            return;
        };
        if now.duration_since(last) < MIN_INTERVAL && !force {
            return;
        }

        let line = render_line(processed, self.total);
        let mut out = io::stdout();
        let _ = write!(out, "\r{}", line);
        // Blank out the tail of a longer previous render.
        if self.last_len > line.len() {
            let _ = write!(out, "{}", " ".repeat(self.last_len - line.len()));
        }
        let _ = out.flush();

        self.last_render = Some(now);
        self.last_processed = processed;
        self.last_len = line.len();
    }

    /// Final forced render plus the terminating newline.
    pub fn finish(&mut self, processed: u64) {
        self.report(processed, true);
        println!();
    }
}

/// One status line: bar and percentage when the total is known, then
/// `processed / total` with humanised sizes (`?` for an unknown total).
fn render_line(processed: u64, total: u64) -> String {
    let mut line = String::new();
    if total > 0 {
        // A file can grow while we read it; never show more than 100%.
        let total = total.max(processed);
        let progress = processed as f64 / total as f64;
        let fill = (((BAR_LEN - 2) as f64) * progress) as usize;
        let fill = fill.min(BAR_LEN - 2);
        line.push('|');
        line.push_str(&"*".repeat(fill));
        line.push_str(&" ".repeat(BAR_LEN - 2 - fill));
        line.push('|');
        line.push_str(&format!(" {:.2}%   ", progress * 100.0));
        line.push_str(&format_size(processed));
        line.push_str(" / ");
        line.push_str(&format_size(total));
    } else {
        line.push_str(&format_size(processed));
        line.push_str(" / ?");
    }
    line
}

/// Humanise a byte count: plain under 2 KiB, then K/M/G with two decimals.
pub fn format_size(size: u64) -> String {
    if size >> 11 == 0 {
        format!("{}", size)
    } else if size >> 21 == 0 {
        format!("{:.2}K", size as f64 / 1024.0)
    } else if size >> 31 == 0 {
        format!("{:.2}M", size as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2}G", size as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_thresholds() {
        assert_eq!(format_size(0), "0");
        assert_eq!(format_size(2047), "2047");
        assert_eq!(format_size(2048), "2.00K");
        assert_eq!(format_size(1536 * 1024), "1536.00K");
        assert_eq!(format_size(2 * 1024 * 1024), "2.00M");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00G");
    }

    #[test]
    fn render_line_with_known_total() {
        let line = render_line(2 * 1024 * 1024 * 1024, 4 * 1024 * 1024 * 1024);
        assert!(line.starts_with('|'));
        assert!(line.contains("50.00%"));
        assert!(line.ends_with("2.00G / 4.00G"));
        // Bar is half full.
        assert_eq!(line.matches('*').count(), (BAR_LEN - 2) / 2);
    }

    #[test]
    fn render_line_clamps_overrun() {
        let line = render_line(2048, 1024);
        assert!(line.contains("100.00%"));
        assert_eq!(line.matches('*').count(), BAR_LEN - 2);
    }

    #[test]
    fn render_line_with_unknown_total() {
        let line = render_line(4 * 1024 * 1024, 0);
        assert_eq!(line, "4.00M / ?");
    }

    #[test]
    fn report_arms_before_rendering() {
        let mut progress = Progress::new(0);
        // Below the byte threshold: ignored entirely.
        progress.report(10, false);
        assert!(progress.last_render.is_none());
        // First qualifying call arms the clock without rendering.
        progress.report(MIN_DIFF_BYTES, false);
        assert!(progress.last_render.is_some());
        assert_eq!(progress.last_len, 0);
    }
}
