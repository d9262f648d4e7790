use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::emotion::domain::emotion_tally::TallySnapshot;
use crate::presentation::domain::chart_widget::ChartWidget;
use crate::shared::constants::{CHART_BAR_COLORS, CHART_DATASET_LABEL};

/// Bar chart document written by [`JsonChartSink`].
///
/// Shaped like a Chart.js bar config so any dashboard can render it as-is.
#[derive(Debug, Serialize)]
pub struct ChartDocument {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub labels: Vec<&'static str>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: &'static str,
    pub data: Vec<u64>,
    pub background_color: &'static [&'static str],
    pub border_width: u32,
}

impl ChartDocument {
    pub fn from_snapshot(snapshot: &TallySnapshot) -> Self {
        Self {
            kind: "bar",
            labels: snapshot.labels(),
            datasets: vec![ChartDataset {
                label: CHART_DATASET_LABEL,
                data: snapshot.values(),
                background_color: &CHART_BAR_COLORS,
                border_width: 1,
            }],
        }
    }
}

/// Rewrites a JSON chart file on every update.
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so a
/// reader never sees a half-written document.
pub struct JsonChartSink {
    path: PathBuf,
}

impl JsonChartSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartWidget for JsonChartSink {
    fn update(&mut self, snapshot: &TallySnapshot) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&ChartDocument::from_snapshot(snapshot))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::emotion_tally::EmotionTally;
    use crate::emotion::domain::expression::Expression;

    fn read(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_writes_chart_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chart.json");
        let mut sink = JsonChartSink::new(&path);
        assert_eq!(sink.path(), path.as_path());

        let mut tally = EmotionTally::new();
        tally.record(Expression::Happy);
        tally.record(Expression::Happy);
        tally.record(Expression::Surprised);
        sink.update(&tally.snapshot()).unwrap();

        let doc = read(&path);
        assert_eq!(doc["type"], "bar");
        assert_eq!(
            doc["labels"],
            serde_json::json!(["happy", "sad", "angry", "neutral", "surprised"])
        );
        let dataset = &doc["datasets"][0];
        assert_eq!(dataset["label"], "Emotion Trends");
        assert_eq!(dataset["data"], serde_json::json!([2, 0, 0, 0, 1]));
        assert_eq!(dataset["backgroundColor"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_update_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let mut sink = JsonChartSink::new(&path);
        let mut tally = EmotionTally::new();

        sink.update(&tally.snapshot()).unwrap();
        tally.record(Expression::Angry);
        sink.update(&tally.snapshot()).unwrap();

        assert_eq!(read(&path)["datasets"][0]["data"][2], 1);
        assert!(!path.with_extension("tmp").exists());
    }
}
