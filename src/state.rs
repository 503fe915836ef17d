use crate::config::AppConfig;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handler state. Writers hold the lock across mutation and the file
/// write so the data file never lags behind memory.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(config: &AppConfig, data: AppData) -> Self {
        Self {
            data_path: config.data_path.clone(),
            data: Arc::new(Mutex::new(data)),
        }
    }
}
