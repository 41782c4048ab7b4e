use burn::train::renderer::{MetricState, MetricsRenderer, TrainingProgress};
use derive_new::new;

/// Reports training progress through the logger instead of a terminal dashboard
#[derive(new)]
pub struct Logged {}

impl MetricsRenderer for Logged {
    fn update_train(&mut self, _state: MetricState) {}

    fn update_valid(&mut self, _state: MetricState) {}

    fn render_train(&mut self, item: TrainingProgress) {
        log::debug!("Training: {:?}", item);
    }

    fn render_valid(&mut self, item: TrainingProgress) {
        log::debug!("Validating: {:?}", item);
    }
}
