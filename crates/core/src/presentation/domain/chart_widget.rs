use crate::emotion::domain::emotion_tally::TallySnapshot;

/// Bar chart of the emotion tally.
pub trait ChartWidget: Send {
    /// Replaces the dataset with `snapshot` and repaints.
    fn update(&mut self, snapshot: &TallySnapshot) -> Result<(), Box<dyn std::error::Error>>;
}

/// Chart that draws nothing, for headless runs.
pub struct NullChart;

impl ChartWidget for NullChart {
    fn update(&mut self, _snapshot: &TallySnapshot) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
