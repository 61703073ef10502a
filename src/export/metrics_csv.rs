//! CSV export of per-episode training metrics
//!
//! Streams one row per episode so external plotting tools can consume the
//! reward/steps/success series without the crate growing a plotting stack.

use std::{fs::File, path::Path};

use crate::{
    pipeline::training::{EpisodeRecord, TrainingResult},
    ports::{Observer, Signal},
    Result,
};

/// Observer that writes each episode record as a CSV row
pub struct CsvMetricsObserver {
    writer: csv::Writer<File>,
}

impl CsvMetricsObserver {
    /// Create the CSV sink and write the header row
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "episode",
            "total_reward",
            "steps",
            "success",
            "duration_secs",
            "exploration_rate",
            "running_success_rate",
        ])?;
        Ok(Self { writer })
    }
}

impl Observer for CsvMetricsObserver {
    fn on_episode_end(&mut self, record: &EpisodeRecord, success_rate: f64) -> Result<Signal> {
        self.writer.write_record([
            record.episode.to_string(),
            record.total_reward.to_string(),
            record.steps.to_string(),
            record.success.to_string(),
            record.duration.as_secs_f64().to_string(),
            record.exploration_rate.to_string(),
            success_rate.to_string(),
        ])?;
        Ok(Signal::Continue)
    }

    fn on_training_end(&mut self, _result: &TrainingResult) -> Result<()> {
        self.writer.flush().map_err(crate::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("metrics.csv");

        let mut observer = CsvMetricsObserver::create(&path).unwrap();
        for episode in 0..3 {
            let record = EpisodeRecord {
                episode,
                total_reward: -0.05 * episode as f64,
                steps: 5 + episode,
                success: episode == 2,
                duration: Duration::from_millis(2),
                exploration_rate: 0.99f64.powi(episode as i32 + 1),
            };
            observer
                .on_episode_end(&record, if episode == 2 { 1.0 / 3.0 } else { 0.0 })
                .unwrap();
        }
        observer
            .on_training_end(&TrainingResult {
                episodes_completed: 3,
                successes: 1,
                success_rate: 1.0 / 3.0,
                mean_steps: 6.0,
                mean_reward: -0.05,
                total_duration_secs: 0.01,
                stopped_early: false,
            })
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("episode,total_reward,steps,success"));
        assert!(lines[3].starts_with("2,"));
    }
}
