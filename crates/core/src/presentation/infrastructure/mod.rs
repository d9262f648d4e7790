pub mod json_chart_sink;
pub mod log_status_display;
pub mod stderr_alert;
pub mod terminal_bar_chart;
