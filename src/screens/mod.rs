pub mod dashboard;

// Single-screen TUI: header, summary cards, activity tables and trend
// sparklines for the selected bridge network. Help overlay on '?'.

pub use dashboard::Dashboard;
