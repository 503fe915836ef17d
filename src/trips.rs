//! Trip store operations over the in-memory data set.
//!
//! Everything here is synchronous; handlers own locking and persistence.

use crate::costs::{summarize_trip, trip_costs, TripCosts, TripSummary};
use crate::errors::AppError;
use crate::models::{
    non_negative, AppData, Collection, NewTripRequest, Trip, TripItem, TripSnapshot,
    DEFAULT_TRIP_NAME,
};
use serde_json::Value;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn trip<'a>(data: &'a AppData, trip_id: &str) -> Result<&'a TripSnapshot, AppError> {
    data.trips
        .get(trip_id)
        .ok_or_else(|| AppError::not_found(format!("trip {trip_id} not found")))
}

fn trip_mut<'a>(data: &'a mut AppData, trip_id: &str) -> Result<&'a mut TripSnapshot, AppError> {
    data.trips
        .get_mut(trip_id)
        .ok_or_else(|| AppError::not_found(format!("trip {trip_id} not found")))
}

fn parse_item(collection: Collection, body: Value) -> Result<TripItem, AppError> {
    let item = TripItem::from_json(collection, body)
        .map_err(|err| AppError::bad_request(format!("invalid {collection} item: {err}")))?;
    item.validate().map_err(AppError::bad_request)?;
    Ok(item)
}

pub fn create_trip(data: &mut AppData, request: NewTripRequest) -> Result<String, AppError> {
    non_negative("totalBudget", &request.total_budget).map_err(AppError::bad_request)?;

    let name = request
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TRIP_NAME.to_string());

    let id = new_id();
    let trip = Trip {
        id: id.clone(),
        name,
        start_date: request.start_date,
        end_date: request.end_date,
        total_budget: request.total_budget,
        description: request.description,
    };
    data.trips.insert(id.clone(), TripSnapshot::new(trip));
    Ok(id)
}

pub fn snapshot(data: &AppData, trip_id: &str) -> Result<TripSnapshot, AppError> {
    trip(data, trip_id).cloned()
}

pub fn costs(data: &AppData, trip_id: &str) -> Result<TripCosts, AppError> {
    Ok(trip_costs(trip(data, trip_id)?))
}

pub fn list_items(
    data: &AppData,
    trip_id: &str,
    collection: Collection,
) -> Result<Vec<TripItem>, AppError> {
    Ok(trip(data, trip_id)?.items(collection))
}

/// Stores a new record under a fresh id; any id in the body is ignored.
pub fn add_item(
    data: &mut AppData,
    trip_id: &str,
    collection: Collection,
    body: Value,
) -> Result<String, AppError> {
    let snapshot = trip_mut(data, trip_id)?;
    let mut item = parse_item(collection, body)?;
    let id = new_id();
    item.set_id(id.clone());
    snapshot.insert(item);
    Ok(id)
}

/// Merges the body's top-level fields over the stored record, then checks
/// the result against the collection schema again.
pub fn update_item(
    data: &mut AppData,
    trip_id: &str,
    collection: Collection,
    item_id: &str,
    body: Value,
) -> Result<(), AppError> {
    let snapshot = trip_mut(data, trip_id)?;
    let existing = snapshot
        .find(collection, item_id)
        .ok_or_else(|| AppError::not_found(format!("{collection} item {item_id} not found")))?;

    let Value::Object(changes) = body else {
        return Err(AppError::bad_request("update body must be a JSON object"));
    };

    let mut merged = serde_json::to_value(&existing)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in changes {
            if key != "id" {
                fields.insert(key, value);
            }
        }
    }

    let mut item = parse_item(collection, merged)?;
    item.set_id(item_id.to_string());
    snapshot.replace(item);
    Ok(())
}

pub fn delete_item(
    data: &mut AppData,
    trip_id: &str,
    collection: Collection,
    item_id: &str,
) -> Result<(), AppError> {
    if trip_mut(data, trip_id)?.remove(collection, item_id) {
        Ok(())
    } else {
        Err(AppError::not_found(format!("{collection} item {item_id} not found")))
    }
}

/// Summaries of every trip, earliest start first.
pub fn summaries(data: &AppData) -> Vec<TripSummary> {
    let mut summaries: Vec<TripSummary> = data.trips.values().map(summarize_trip).collect();
    summaries.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}
