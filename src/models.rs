use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_TRIP_NAME: &str = "New trip";

/// Built-in expense categories, in display order.
///
/// Expenses store their category as free text; this list only seeds forms
/// and the cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    Transport,
    Lodging,
    Activities,
    Shopping,
    Misc,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Lodging,
        ExpenseCategory::Activities,
        ExpenseCategory::Shopping,
        ExpenseCategory::Misc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Lodging => "Lodging",
            Self::Activities => "Activities",
            Self::Shopping => "Shopping",
            Self::Misc => "Misc",
        }
    }

    pub fn default_labels() -> Vec<String> {
        Self::ALL.iter().map(|category| category.label().to_string()).collect()
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional numeric form fields. Browsers post every input as text, so a
/// number, a numeric string, a blank string and null are all accepted.
mod form_number {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct OptionalNumber;

    impl<'de> Visitor<'de> for OptionalNumber {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string, a blank string or null")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Option<f64>, E> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(Some)
                .ok_or_else(|| E::custom(format!("'{value}' is not a number")))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Option<f64>, E> {
            Ok(Some(value as f64))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Option<f64>, E> {
            Ok(Some(value as f64))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Option<f64>, E> {
            Ok(Some(value))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Option<f64>, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Option<f64>, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Option<f64>, D::Error> {
            deserializer.deserialize_any(OptionalNumber)
        }
    }

    pub fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        deserializer.deserialize_any(OptionalNumber)
    }

    /// Whole numbers only; the 1 to 5 range is checked by validation.
    pub fn stars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        match deserializer.deserialize_any(OptionalNumber)? {
            None => Ok(None),
            Some(number) if number.fract() == 0.0 && (0.0..=255.0).contains(&number) => {
                Ok(Some(number as u8))
            }
            Some(number) => Err(de::Error::custom(format!(
                "stars must be a whole number, got {number}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub total_budget: Amount,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(deserialize_with = "form_number::stars")]
    pub stars: Option<u8>,
    pub check_in_date: String,
    pub check_out_date: String,
    pub price_per_night: Amount,
    pub total_price: Amount,
    pub info: String,
    pub booking_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub arrival: String,
    #[serde(flatten)]
    pub fare: TransportFare,
}

/// Cost fields depend on the `type` tag of a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransportFare {
    Plane(ScheduledFare),
    Train(ScheduledFare),
    Car(CarEstimate),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduledFare {
    pub company: String,
    pub number: String,
    pub seat: String,
    pub price: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarEstimate {
    pub estimated_fuel: Amount,
    pub estimated_toll: Amount,
    /// Informational total entered by the user; costs use fuel + toll.
    pub price: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Expense {
    pub id: String,
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapPoint {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "form_number::coordinate")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "form_number::coordinate")]
    pub lon: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub arrival_date: String,
    pub departure_date: String,
    pub hotel_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Route {
    pub id: String,
    pub from: String,
    pub to: String,
    pub transport_id: String,
    pub duration: String,
    pub distance: String,
    pub maps_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryStep {
    pub id: String,
    pub date: String,
    pub description: String,
}

/// The per-trip record lists addressable under `/api/trips/{id}/{collection}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Itinerary,
    Hotels,
    Transports,
    Expenses,
    MapPoints,
    Routes,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Itinerary,
        Collection::Hotels,
        Collection::Transports,
        Collection::Expenses,
        Collection::MapPoints,
        Collection::Routes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Itinerary => "itinerary",
            Self::Hotels => "hotels",
            Self::Transports => "transports",
            Self::Expenses => "expenses",
            Self::MapPoints => "mapPoints",
            Self::Routes => "routes",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of any collection, each variant carrying its own schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TripItem {
    Itinerary(ItineraryStep),
    Hotel(Hotel),
    Transport(Transport),
    Expense(Expense),
    MapPoint(MapPoint),
    Route(Route),
}

impl TripItem {
    /// Decodes a JSON body against the schema of `collection`.
    pub fn from_json(
        collection: Collection,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match collection {
            Collection::Itinerary => Self::Itinerary(serde_json::from_value(value)?),
            Collection::Hotels => Self::Hotel(serde_json::from_value(value)?),
            Collection::Transports => Self::Transport(serde_json::from_value(value)?),
            Collection::Expenses => Self::Expense(serde_json::from_value(value)?),
            Collection::MapPoints => Self::MapPoint(serde_json::from_value(value)?),
            Collection::Routes => Self::Route(serde_json::from_value(value)?),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Itinerary(item) => &item.id,
            Self::Hotel(item) => &item.id,
            Self::Transport(item) => &item.id,
            Self::Expense(item) => &item.id,
            Self::MapPoint(item) => &item.id,
            Self::Route(item) => &item.id,
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            Self::Itinerary(item) => item.id = id,
            Self::Hotel(item) => item.id = id,
            Self::Transport(item) => item.id = id,
            Self::Expense(item) => item.id = id,
            Self::MapPoint(item) => item.id = id,
            Self::Route(item) => item.id = id,
        }
    }

    /// Field rules beyond what the schema enforces. Unparseable amounts are
    /// accepted (they count as zero); negative ones are not.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Hotel(hotel) => {
                if let Some(stars) = hotel.stars {
                    if !(1..=5).contains(&stars) {
                        return Err(format!("stars must be between 1 and 5, got {stars}"));
                    }
                }
                non_negative("pricePerNight", &hotel.price_per_night)?;
                non_negative("totalPrice", &hotel.total_price)
            }
            Self::Transport(transport) => match &transport.fare {
                TransportFare::Plane(fare) | TransportFare::Train(fare) => {
                    non_negative("price", &fare.price)
                }
                TransportFare::Car(estimate) => {
                    non_negative("estimatedFuel", &estimate.estimated_fuel)?;
                    non_negative("estimatedToll", &estimate.estimated_toll)?;
                    non_negative("price", &estimate.price)
                }
            },
            Self::Expense(expense) => {
                if expense.category.trim().is_empty() {
                    return Err("category is required".to_string());
                }
                non_negative("amount", &expense.amount)
            }
            Self::MapPoint(point) => {
                if point.lat.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
                    return Err("lat must be between -90 and 90".to_string());
                }
                if point.lon.is_some_and(|lon| !(-180.0..=180.0).contains(&lon)) {
                    return Err("lon must be between -180 and 180".to_string());
                }
                Ok(())
            }
            Self::Itinerary(_) | Self::Route(_) => Ok(()),
        }
    }
}

pub fn non_negative(field: &str, amount: &Amount) -> Result<(), String> {
    match amount.parsed() {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            Err(format!("{field} must not be negative"))
        }
        _ => Ok(()),
    }
}

trait Keyed {
    fn key(&self) -> &str;
}

macro_rules! keyed {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }
        })*
    };
}

keyed!(ItineraryStep, Hotel, Transport, Expense, MapPoint, Route);

fn replace_keyed<T: Keyed>(items: &mut [T], item: T) -> bool {
    match items.iter_mut().find(|existing| existing.key() == item.key()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

fn remove_keyed<T: Keyed>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.key() != id);
    items.len() != before
}

/// Everything stored for one trip. Handlers clone it out of the store whole;
/// nothing outside the store patches it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    #[serde(flatten)]
    pub trip: Trip,
    #[serde(default)]
    pub itinerary: Vec<ItineraryStep>,
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(default)]
    pub transports: Vec<Transport>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub map_points: Vec<MapPoint>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl TripSnapshot {
    pub fn new(trip: Trip) -> Self {
        Self {
            trip,
            ..Self::default()
        }
    }

    pub fn items(&self, collection: Collection) -> Vec<TripItem> {
        match collection {
            Collection::Itinerary => self.itinerary.iter().cloned().map(TripItem::Itinerary).collect(),
            Collection::Hotels => self.hotels.iter().cloned().map(TripItem::Hotel).collect(),
            Collection::Transports => self.transports.iter().cloned().map(TripItem::Transport).collect(),
            Collection::Expenses => self.expenses.iter().cloned().map(TripItem::Expense).collect(),
            Collection::MapPoints => self.map_points.iter().cloned().map(TripItem::MapPoint).collect(),
            Collection::Routes => self.routes.iter().cloned().map(TripItem::Route).collect(),
        }
    }

    pub fn find(&self, collection: Collection, id: &str) -> Option<TripItem> {
        self.items(collection).into_iter().find(|item| item.id() == id)
    }

    pub fn insert(&mut self, item: TripItem) {
        match item {
            TripItem::Itinerary(step) => self.itinerary.push(step),
            TripItem::Hotel(hotel) => self.hotels.push(hotel),
            TripItem::Transport(transport) => self.transports.push(transport),
            TripItem::Expense(expense) => self.expenses.push(expense),
            TripItem::MapPoint(point) => self.map_points.push(point),
            TripItem::Route(route) => self.routes.push(route),
        }
    }

    /// Swaps in `item` for the stored record with the same id.
    pub fn replace(&mut self, item: TripItem) -> bool {
        match item {
            TripItem::Itinerary(step) => replace_keyed(&mut self.itinerary, step),
            TripItem::Hotel(hotel) => replace_keyed(&mut self.hotels, hotel),
            TripItem::Transport(transport) => replace_keyed(&mut self.transports, transport),
            TripItem::Expense(expense) => replace_keyed(&mut self.expenses, expense),
            TripItem::MapPoint(point) => replace_keyed(&mut self.map_points, point),
            TripItem::Route(route) => replace_keyed(&mut self.routes, route),
        }
    }

    pub fn remove(&mut self, collection: Collection, id: &str) -> bool {
        match collection {
            Collection::Itinerary => remove_keyed(&mut self.itinerary, id),
            Collection::Hotels => remove_keyed(&mut self.hotels, id),
            Collection::Transports => remove_keyed(&mut self.transports, id),
            Collection::Expenses => remove_keyed(&mut self.expenses, id),
            Collection::MapPoints => remove_keyed(&mut self.map_points, id),
            Collection::Routes => remove_keyed(&mut self.routes, id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub trips: BTreeMap<String, TripSnapshot>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTripRequest {
    pub name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub total_budget: Amount,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCreated {
    pub message: String,
    pub trip_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemCreated {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
