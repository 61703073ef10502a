//! Training pipeline: episodic loop, observers, and the `train` entry point

pub mod observers;
pub mod training;

pub use observers::{
    CallbackObserver, MetricsObserver, MetricsSummary, ProgressObserver, TrainLogObserver,
};
pub use training::{
    greedy_rollout, train, train_with_observers, EpisodeRecord, ProgressCallback, Rollout,
    TrainOptions, TrainOutcome, Trainer, TrainingResult,
};
