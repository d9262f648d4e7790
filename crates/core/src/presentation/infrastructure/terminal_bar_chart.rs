use crate::emotion::domain::emotion_tally::TallySnapshot;
use crate::presentation::domain::chart_widget::ChartWidget;
use crate::shared::constants::CHART_DATASET_LABEL;

pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Renders the tally as horizontal text bars through the `log` facade.
///
/// The default chart repaints on every update, like the live chart it
/// stands in for. A larger `repaint_every` throttles output; the rendering
/// of the latest snapshot is always available via [`TerminalBarChart::last`].
pub struct TerminalBarChart {
    bar_width: usize,
    repaint_every: usize,
    updates: usize,
    repaints: usize,
    last: Option<String>,
}

impl TerminalBarChart {
    pub fn new(bar_width: usize, repaint_every: usize) -> Self {
        Self {
            bar_width: bar_width.max(1),
            repaint_every: repaint_every.max(1),
            updates: 0,
            repaints: 0,
            last: None,
        }
    }

    pub fn repaints(&self) -> usize {
        self.repaints
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Bars scale to the largest count so the tallest bar spans `bar_width`.
    pub fn render(&self, snapshot: &TallySnapshot) -> String {
        let label_width = snapshot
            .bars
            .iter()
            .map(|b| b.emotion.label().len())
            .max()
            .unwrap_or(0);
        let max = snapshot.max_count();

        let mut lines = vec![format!("{CHART_DATASET_LABEL}:")];
        for bar in &snapshot.bars {
            let len = if max == 0 {
                0
            } else {
                ((bar.count as f64 / max as f64) * self.bar_width as f64).round() as usize
            };
            lines.push(format!(
                "  {:label_width$} | {}{} {}",
                bar.emotion.label(),
                "#".repeat(len),
                " ".repeat(self.bar_width - len),
                bar.count
            ));
        }
        lines.join("\n")
    }
}

impl Default for TerminalBarChart {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH, 1)
    }
}

impl ChartWidget for TerminalBarChart {
    fn update(&mut self, snapshot: &TallySnapshot) -> Result<(), Box<dyn std::error::Error>> {
        let rendered = self.render(snapshot);
        if self.updates % self.repaint_every == 0 {
            log::info!("\n{rendered}");
            self.repaints += 1;
        }
        self.updates += 1;
        self.last = Some(rendered);
        Ok(())
    }
}
