use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Trip, TripSnapshot};

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load_data(&dir.path().join("absent.json")).await;
        assert!(data.trips.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.json");
        fs::write(&path, b"{ not json").await.unwrap();
        assert!(load_data(&path).await.trips.is_empty());
    }

    #[tokio::test]
    async fn persisted_trips_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.json");
        let mut data = AppData::default();
        data.trips.insert(
            "abc".into(),
            TripSnapshot::new(Trip {
                id: "abc".into(),
                name: "Sicily".into(),
                ..Trip::default()
            }),
        );

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        assert_eq!(loaded.trips.get("abc"), data.trips.get("abc"));
    }
}
