use std::io::{self, Write};

use chrono::{DateTime, Local};
use sitewalk_crawler::{Progress, ProgressDisplay};

const CLEAR: &str = "\x1B[2J\x1B[1;1H";

/// Full screen dashboard redrawn on every refresh
pub struct ConsoleProgress {
    seed: String,
    started: DateTime<Local>,
}

impl ConsoleProgress {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            started: Local::now(),
        }
    }

    fn render(&self, progress: &Progress<'_>) -> String {
        let Progress {
            phase,
            stats,
            queue_len,
            next,
        } = progress;

        let secs = stats.elapsed.as_secs();
        let mut out = format!(
            "sitewalk {}\n\
             Started: {}  Elapsed: {:02}:{:02}:{:02}  Phase: {phase:?}\n\n\
             URLs found:      {}\n\
             URLs processed:  {}\n\
             URLs failed:     {}\n\
             Queue length:    {queue_len}\n\
             Max depth:       {}\n\
             Ending links:    {}\n\
             Document URLs:   {}\n",
            self.seed,
            self.started.format("%Y-%m-%d %H:%M:%S"),
            secs / 3600,
            secs % 3600 / 60,
            secs % 60,
            stats.urls_found,
            stats.urls_processed,
            stats.urls_failed,
            stats.max_depth,
            stats.ending_links_count,
            stats.document_urls_found,
        );

        if !stats.depth_counts.is_empty() {
            out.push_str("\nPages per depth:\n");
            for (depth, count) in &stats.depth_counts {
                out.push_str(&format!("  {depth:>3}: {count}\n"));
            }
        }
        if let Some(task) = next {
            out.push_str(&format!("\nNext: {} (depth {})\n", task.url, task.depth));
        }
        out
    }
}

impl ProgressDisplay for ConsoleProgress {
    fn refresh(&mut self, progress: &Progress<'_>) {
        let mut stdout = io::stdout().lock();
        let drawn = write!(stdout, "{CLEAR}{}", self.render(progress))
            .and_then(|()| stdout.flush());
        if let Err(e) = drawn {
            log::debug!("Couldn't draw progress: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use sitewalk_crawler::{CrawlTask, Phase, StatsSnapshot};

    use super::*;

    #[test]
    fn dashboard_lists_counters_and_next_task() {
        let next = CrawlTask::new("https://example.com/a", 2);
        let progress = Progress {
            phase: Phase::Running,
            stats: StatsSnapshot {
                elapsed: Duration::from_secs(3725),
                urls_found: 12,
                urls_processed: 5,
                urls_failed: 1,
                max_depth: 2,
                depth_counts: BTreeMap::from([(0, 1), (1, 3), (2, 1)]),
                ending_links_count: 2,
                document_urls_found: 4,
            },
            queue_len: 7,
            next: Some(&next),
        };

        let out = ConsoleProgress::new("https://example.com/").render(&progress);
        assert!(out.contains("Elapsed: 01:02:05"));
        assert!(out.contains("Phase: Running"));
        assert!(out.contains("URLs processed:  5"));
        assert!(out.contains("Queue length:    7"));
        assert!(out.contains("    1: 3\n"));
        assert!(out.contains("Next: https://example.com/a (depth 2)"));
    }
}
