use crate::costs::{TripCosts, TripSummary};
use crate::dates::{reconcile_hotel_prices, HotelPriceRequest, HotelPrices};
use crate::errors::AppError;
use crate::models::{
    AppData, Collection, ExpenseCategory, ItemCreated, MessageResponse, NewTripRequest,
    TripCreated, TripItem, TripSnapshot,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::trips;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

fn collection(name: &str) -> Result<Collection, AppError> {
    Collection::parse(name).ok_or_else(|| {
        warn!("rejected unknown collection {name}");
        AppError::not_found(format!("unknown collection '{name}'"))
    })
}

/// Writes `staged` to disk and only then makes it the live data, so a
/// failed write leaves memory matching the file.
async fn commit(state: &AppState, data: &mut AppData, staged: AppData) -> Result<(), AppError> {
    persist_data(&state.data_path, &staged).await.inspect_err(|err| {
        error!("failed to persist {}: {err}", state.data_path.display());
    })?;
    *data = staged;
    Ok(())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn expense_categories() -> Json<Vec<&'static str>> {
    Json(ExpenseCategory::ALL.iter().map(|category| category.label()).collect())
}

pub async fn hotel_prices(Json(request): Json<HotelPriceRequest>) -> Json<HotelPrices> {
    Json(reconcile_hotel_prices(&request))
}

pub async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<NewTripRequest>,
) -> Result<(StatusCode, Json<TripCreated>), AppError> {
    let mut data = state.data.lock().await;
    let mut staged = data.clone();
    let trip_id = trips::create_trip(&mut staged, request)?;
    commit(&state, &mut data, staged).await?;

    info!(%trip_id, "trip created");
    Ok((
        StatusCode::CREATED,
        Json(TripCreated {
            message: "Trip created".to_string(),
            trip_id,
        }),
    ))
}

pub async fn trips_summary(State(state): State<AppState>) -> Json<Vec<TripSummary>> {
    let data = state.data.lock().await;
    Json(trips::summaries(&data))
}

pub async fn all_data(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripSnapshot>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(trips::snapshot(&data, &trip_id)?))
}

pub async fn costs(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripCosts>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(trips::costs(&data, &trip_id)?))
}

pub async fn list_items(
    State(state): State<AppState>,
    Path((trip_id, name)): Path<(String, String)>,
) -> Result<Json<Vec<TripItem>>, AppError> {
    let collection = collection(&name)?;
    let data = state.data.lock().await;
    Ok(Json(trips::list_items(&data, &trip_id, collection)?))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path((trip_id, name)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ItemCreated>), AppError> {
    let collection = collection(&name)?;
    let mut data = state.data.lock().await;
    let mut staged = data.clone();
    let id = trips::add_item(&mut staged, &trip_id, collection, body)?;
    commit(&state, &mut data, staged).await?;

    info!(%trip_id, %collection, %id, "item added");
    Ok((
        StatusCode::CREATED,
        Json(ItemCreated {
            message: "Item added".to_string(),
            id,
        }),
    ))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((trip_id, name, item_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<MessageResponse>, AppError> {
    let collection = collection(&name)?;
    let mut data = state.data.lock().await;
    let mut staged = data.clone();
    trips::update_item(&mut staged, &trip_id, collection, &item_id, body)?;
    commit(&state, &mut data, staged).await?;

    info!(%trip_id, %collection, %item_id, "item updated");
    Ok(Json(MessageResponse::new("Item updated")))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path((trip_id, name, item_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let collection = collection(&name)?;
    let mut data = state.data.lock().await;
    let mut staged = data.clone();
    trips::delete_item(&mut staged, &trip_id, collection, &item_id)?;
    commit(&state, &mut data, staged).await?;

    info!(%trip_id, %collection, %item_id, "item deleted");
    Ok(Json(MessageResponse::new("Item deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::path::PathBuf;

    fn state_at(data_path: PathBuf, data: AppData) -> AppState {
        let config = AppConfig {
            listen_addr: ([127, 0, 0, 1], 0).into(),
            data_path,
        };
        AppState::new(&config, data)
    }

    #[tokio::test]
    async fn writes_reach_memory_and_disk_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.json");
        let state = state_at(path.clone(), AppData::default());

        let (status, Json(created)) = create_trip(State(state.clone()), Json(NewTripRequest::default()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        assert!(state.data.lock().await.trips.contains_key(&created.trip_id));
        let on_disk = crate::storage::load_data(&path).await;
        assert!(on_disk.trips.contains_key(&created.trip_id));
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let unwritable = dir.path().join("missing").join("trips.json");
        let state = state_at(unwritable.clone(), AppData::default());

        let err = create_trip(State(state.clone()), Json(NewTripRequest::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert!(state.data.lock().await.trips.is_empty());

        let mut data = AppData::default();
        let trip_id = trips::create_trip(&mut data, NewTripRequest::default()).unwrap();
        let state = state_at(unwritable, data);

        let err = add_item(
            State(state.clone()),
            Path((trip_id.clone(), "expenses".to_string())),
            Json(json!({ "category": "Food", "amount": "12" })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));

        let err = delete_item(
            State(state.clone()),
            Path((trip_id.clone(), "expenses".to_string(), "nothing".to_string())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let data = state.data.lock().await;
        assert!(trips::list_items(&data, &trip_id, Collection::Expenses).unwrap().is_empty());
    }
}
