//! TUI widgets.

mod backtest_chart;
mod bookmark_list;
mod common;
mod constraint_table;
mod help;
mod notifications;
mod portfolio_list;
mod status_bar;
mod tab_bar;

pub use backtest_chart::BacktestChart;
pub use bookmark_list::BookmarkList;
pub use constraint_table::ConstraintTable;
pub use help::HelpPanel;
pub use notifications::{render_error, render_notification};
pub use portfolio_list::PortfolioList;
pub use status_bar::StatusBar;
pub use tab_bar::TabBar;
