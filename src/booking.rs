// 🧾 Booking Calculator - price breakdown + printable receipt
//
// Booking has no side effects: the catalog is untouched, nothing is reserved
// and the receipt is never stored. The same car can be booked any number of
// times.

use crate::catalog::{Car, Catalog};
use crate::error::{RentalError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tax applied on the base cost
pub const TAX_RATE: f64 = 0.20;

/// Service charge applied on the base cost
pub const SERVICE_CHARGE_RATE: f64 = 0.05;

// ============================================================================
// REQUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub car_code: String,
    pub renter_name: String,
    /// Signed so that zero and negative counts can be rejected explicitly
    pub days: i64,
}

impl BookingRequest {
    pub fn new(car_code: &str, renter_name: &str, days: i64) -> Self {
        BookingRequest {
            car_code: car_code.to_string(),
            renter_name: renter_name.to_string(),
            days,
        }
    }
}

/// Parse a day count typed by the user. Only plain digits are accepted.
pub fn parse_days(input: &str) -> Result<u32> {
    let text = input.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RentalError::InvalidDayCount(input.to_string()));
    }

    match text.parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(RentalError::InvalidDayCount(input.to_string())),
    }
}

// ============================================================================
// PRICE BREAKDOWN
// ============================================================================

/// Unrounded amounts; rounding happens only when rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_cost: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total_cost: f64,
}

impl PriceBreakdown {
    pub fn compute(daily_rate: f64, days: u32) -> Self {
        let base_cost = f64::from(days) * daily_rate;
        let tax = TAX_RATE * base_cost;
        let service_charge = SERVICE_CHARGE_RATE * base_cost;

        PriceBreakdown {
            base_cost,
            tax,
            service_charge,
            total_cost: base_cost + tax + service_charge,
        }
    }
}

// ============================================================================
// RECEIPT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub car: Car,
    pub days: u32,
    pub renter_name: String,
    pub breakdown: PriceBreakdown,
    pub issued_at: DateTime<Local>,
}

impl Receipt {
    pub fn base_cost(&self) -> f64 {
        self.breakdown.base_cost
    }

    pub fn tax(&self) -> f64 {
        self.breakdown.tax
    }

    pub fn service_charge(&self) -> f64 {
        self.breakdown.service_charge
    }

    pub fn total_cost(&self) -> f64 {
        self.breakdown.total_cost
    }

    /// Issue date as YYYY-MM-DD
    pub fn date_string(&self) -> String {
        self.issued_at.format("%Y-%m-%d").to_string()
    }

    pub fn render(&self) -> String {
        let b = &self.breakdown;
        format!(
            "\n********** Car Rental Receipt **********\n\
             Car: {} ({}) from {}\n\
             Days rented: {}\n\
             Rate per day: ${:.2}\n\
             Base cost: ${:.2}\n\
             Tax (20%): ${:.2}\n\
             Service charge (5%): ${:.2}\n\
             Total cost: ${:.2}\n\
             Rented by: {}\n\
             Date: {}\n\
             ***************************************\n\
             Thank you for using Car Rental Service!",
            self.car.name,
            self.car.year,
            self.car.company,
            self.days,
            self.car.rate,
            b.base_cost,
            b.tax,
            b.service_charge,
            b.total_cost,
            self.renter_name,
            self.date_string(),
        )
    }
}

pub fn render_receipt(receipt: &Receipt) -> String {
    receipt.render()
}

// ============================================================================
// BOOKING
// ============================================================================

/// Car lookup, then renter name. Day count is checked after both.
fn resolve_car<'a>(catalog: &'a Catalog, code: &str, renter_name: &str) -> Result<&'a Car> {
    let car = catalog
        .find_by_code(code)
        .ok_or_else(|| RentalError::CarNotFound(code.to_string()))?;

    if renter_name.trim().is_empty() {
        return Err(RentalError::InvalidRenterName);
    }

    Ok(car)
}

/// Same as `book_car` with an explicit issue time
pub fn book_car_at(
    catalog: &Catalog,
    request: &BookingRequest,
    issued_at: DateTime<Local>,
) -> Result<Receipt> {
    let car = resolve_car(catalog, &request.car_code, &request.renter_name)?;

    let days = u32::try_from(request.days)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| RentalError::InvalidDayCount(request.days.to_string()))?;

    let breakdown = PriceBreakdown::compute(car.rate, days);
    debug!(code = %car.code, days, total = breakdown.total_cost, "Booking priced");

    Ok(Receipt {
        car: car.clone(),
        days,
        renter_name: request.renter_name.clone(),
        breakdown,
        issued_at,
    })
}

/// Book from raw form text. Checks run in the same order as `book_car_at`,
/// so an unknown code is reported before unparseable days.
pub fn book_from_form_at(
    catalog: &Catalog,
    car_code: &str,
    renter_name: &str,
    days: &str,
    issued_at: DateTime<Local>,
) -> Result<Receipt> {
    let car_code = car_code.trim();
    resolve_car(catalog, car_code, renter_name)?;
    let days = parse_days(days)?;

    book_car_at(
        catalog,
        &BookingRequest::new(car_code, renter_name, i64::from(days)),
        issued_at,
    )
}

/// Price a booking of `days` days for the first car with `code`
pub fn book_car(catalog: &Catalog, code: &str, renter_name: &str, days: i64) -> Result<Receipt> {
    book_car_at(
        catalog,
        &BookingRequest::new(code, renter_name, days),
        Local::now(),
    )
}

// ============================================================================
// TESTS
// ============================================================================
