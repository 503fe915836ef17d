pub mod app;
pub mod config;
pub mod costs;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod money;
pub mod state;
pub mod storage;
pub mod trips;

pub use app::router;
pub use config::AppConfig;
pub use costs::{compute_cost_breakdown, CostBreakdown};
pub use dates::{duration_days, nights_between};
pub use state::AppState;
pub use storage::{load_data, persist_data};
