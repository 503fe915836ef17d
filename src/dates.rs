use crate::money::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Reads a calendar date (`2024-07-16`) or a local date-time as sent by
/// `datetime-local` inputs (`2024-07-16T09:30`).
pub fn parse_calendar(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn ceil_days(seconds: i64) -> i64 {
    seconds / SECONDS_PER_DAY + i64::from(seconds % SECONDS_PER_DAY > 0)
}

/// Nights of a stay. Zero unless check-out parses and falls strictly after
/// check-in.
pub fn nights_between(check_in: &str, check_out: &str) -> i64 {
    match (parse_calendar(check_in), parse_calendar(check_out)) {
        (Some(start), Some(end)) if end > start => ceil_days((end - start).num_seconds()),
        _ => 0,
    }
}

/// Days spanned by a trip, whichever order the bounds come in. Zero when
/// either bound fails to parse.
pub fn duration_days(start: &str, end: &str) -> i64 {
    match (parse_calendar(start), parse_calendar(end)) {
        (Some(start), Some(end)) => ceil_days((end - start).num_seconds().abs()),
        _ => 0,
    }
}

/// Which hotel price field the user just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceEdit {
    PricePerNight,
    TotalPrice,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelPriceRequest {
    #[serde(default)]
    pub check_in_date: String,
    #[serde(default)]
    pub check_out_date: String,
    #[serde(default)]
    pub price_per_night: Amount,
    #[serde(default)]
    pub total_price: Amount,
    pub edited: PriceEdit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelPrices {
    pub nights: i64,
    pub price_per_night: Option<Decimal>,
    pub total_price: Option<Decimal>,
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Keeps the nightly rate and the stay total consistent after one of them
/// is edited. Both are cleared when the dates do not describe a stay.
pub fn reconcile_hotel_prices(request: &HotelPriceRequest) -> HotelPrices {
    let nights = nights_between(&request.check_in_date, &request.check_out_date);
    if nights == 0 {
        return HotelPrices {
            nights,
            price_per_night: None,
            total_price: None,
        };
    }

    let count = Decimal::from(nights);
    match request.edited {
        PriceEdit::PricePerNight if !request.price_per_night.is_blank() => {
            let nightly = request.price_per_night.value();
            HotelPrices {
                nights,
                price_per_night: Some(nightly),
                total_price: Some(round_cents(nightly.saturating_mul(count))),
            }
        }
        PriceEdit::TotalPrice if !request.total_price.is_blank() => {
            let total = request.total_price.value();
            HotelPrices {
                nights,
                price_per_night: Some(round_cents(total / count)),
                total_price: Some(total),
            }
        }
        _ => HotelPrices {
            nights,
            price_per_night: request.price_per_night.parsed(),
            total_price: request.total_price.parsed(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(edited: PriceEdit, nightly: &str, total: &str) -> HotelPriceRequest {
        HotelPriceRequest {
            check_in_date: "2024-07-16".into(),
            check_out_date: "2024-07-19".into(),
            price_per_night: Amount::new(nightly),
            total_price: Amount::new(total),
            edited,
        }
    }

    #[test]
    fn nights_count_whole_days() {
        assert_eq!(nights_between("2024-07-16", "2024-07-18"), 2);
        assert_eq!(nights_between("2024-02-28", "2024-03-01"), 2);
    }

    #[test]
    fn reversed_or_equal_dates_give_no_nights() {
        assert_eq!(nights_between("2024-07-18", "2024-07-16"), 0);
        assert_eq!(nights_between("2024-07-16", "2024-07-16"), 0);
    }

    #[test]
    fn unparseable_dates_give_zero() {
        assert_eq!(nights_between("", "2024-07-16"), 0);
        assert_eq!(nights_between("2024-07-16", "next week"), 0);
        assert_eq!(duration_days("2024-13-01", "2024-07-16"), 0);
    }

    #[test]
    fn partial_days_round_up() {
        assert_eq!(nights_between("2024-07-16T22:00", "2024-07-17T10:00"), 1);
        assert_eq!(duration_days("2024-07-16T08:00", "2024-07-18T09:00:00"), 3);
    }

    #[test]
    fn duration_ignores_order() {
        assert_eq!(duration_days("2024-07-16", "2024-07-23"), 7);
        assert_eq!(duration_days("2024-07-23", "2024-07-16"), 7);
        assert_eq!(duration_days("2024-07-16", "2024-07-16"), 0);
    }

    #[test]
    fn nightly_edit_recomputes_total() {
        let prices = reconcile_hotel_prices(&request(PriceEdit::PricePerNight, "89.90", "1"));
        assert_eq!(prices.nights, 3);
        assert_eq!(prices.price_per_night, Some(dec!(89.90)));
        assert_eq!(prices.total_price, Some(dec!(269.70)));
    }

    #[test]
    fn total_edit_recomputes_nightly_rate() {
        let prices = reconcile_hotel_prices(&request(PriceEdit::TotalPrice, "", "100"));
        assert_eq!(prices.price_per_night, Some(dec!(33.33)));
        assert_eq!(prices.total_price, Some(dec!(100)));
    }

    #[test]
    fn blank_edited_field_leaves_prices_alone() {
        let prices = reconcile_hotel_prices(&request(PriceEdit::TotalPrice, "50", ""));
        assert_eq!(prices.price_per_night, Some(dec!(50)));
        assert_eq!(prices.total_price, None);
    }

    #[test]
    fn invalid_stay_clears_both_prices() {
        let mut invalid = request(PriceEdit::PricePerNight, "80", "240");
        invalid.check_out_date = "2024-07-15".into();
        let prices = reconcile_hotel_prices(&invalid);
        assert_eq!(
            prices,
            HotelPrices {
                nights: 0,
                price_per_night: None,
                total_price: None,
            }
        );
    }
}
