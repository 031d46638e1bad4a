// End-to-end: catalog file -> search -> booking -> receipt

use car_rental::{
    book_car, load, load_catalog, save, save_catalog, search, search_cars, Car, Catalog,
    RentalError, RowIssueKind, SearchQuery,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn sample_catalog() -> Catalog {
    Catalog::from(vec![
        Car::new("C001", 2022, "Sedan X", "Acme Rentals", 45.0),
        Car::new("C002", 2021, "Truck Y", "Budget Co", 60.5),
        Car::new("C003", 2022, "Compact, Deluxe", "Budget Co", 29.99),
        Car::new("C004", 2019, "Van \"Big\" Z", "Acme Rentals", 0.0),
        Car::new("C001", 2018, "Duplicate Code", "Acme Rentals", 12.125),
    ])
}

#[test]
fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("car_catalog.csv");
    let catalog = sample_catalog();

    save(&path, &catalog).unwrap();
    let report = load(&path).unwrap();

    assert_eq!(report.catalog, catalog);
    assert_eq!(report.rejected_count(), 0);
}

#[test]
fn bad_rows_do_not_stop_later_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("car_catalog.csv");
    fs::write(
        &path,
        "C001,2022,Sedan X,Acme Rentals,45.00\n\
         C002,2021,Truck Y,Budget Co\n\
         C003,2020,Van Z,Acme,30,extra\n\
         C004,abc,Coupe,Acme,50\n\
         C005,2020,Roadster,Acme,n/a\n\
         C006,2023,Hatch,Budget Co,33.50\n",
    )
    .unwrap();

    let report = load(&path).unwrap();
    let codes: Vec<&str> = report.catalog.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["C001", "C006"]);

    let lines: Vec<u64> = report.rejected().map(|i| i.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 5]);
    assert!(matches!(report.issues[2].kind, RowIssueKind::InvalidYear(_)));
    assert!(matches!(report.issues[3].kind, RowIssueKind::InvalidRate(_)));
}

#[test]
fn missing_file_gives_file_not_found_and_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let (report, err) = load_catalog(&dir.path().join("missing.csv"));

    assert!(report.catalog.is_empty());
    assert!(report.issues.is_empty());
    assert!(matches!(err, Some(RentalError::FileNotFound { .. })));
}

#[test]
fn failed_save_leaves_target_in_place() {
    let dir = TempDir::new().unwrap();

    // A non-empty directory can't be replaced by a file, so the rename fails
    let blocked = dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep.txt"), "x").unwrap();

    let err = save_catalog(&blocked, &sample_catalog());
    assert!(matches!(err, Some(RentalError::FileIo { .. })));
    assert_eq!(fs::read_to_string(blocked.join("keep.txt")).unwrap(), "x");

    // No temp files left behind next to the target
    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn search_by_year_name_and_empty_filters() {
    let catalog = sample_catalog();

    let by_year: Vec<&str> = search(&catalog, &SearchQuery::new().with_year(2022))
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(by_year, vec!["C001", "C003"]);

    let sedans = search_cars(&catalog, None, Some("sedan"), None);
    assert_eq!(sedans.len(), 1);
    assert_eq!(sedans[0].name, "Sedan X");

    assert_eq!(search_cars(&catalog, None, Some(""), Some("")), catalog.cars().to_vec());
}

#[test]
fn booking_from_loaded_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("car_catalog.csv");
    fs::write(&path, "C001,2022,Sedan X,Acme Rentals,45.00\n").unwrap();
    let report = load(&path).unwrap();

    let receipt = book_car(&report.catalog, "C001", "Jane Doe", 3).unwrap();
    assert_eq!(format!("{:.2}", receipt.base_cost()), "135.00");
    assert_eq!(format!("{:.2}", receipt.tax()), "27.00");
    assert_eq!(format!("{:.2}", receipt.service_charge()), "6.75");
    assert_eq!(format!("{:.2}", receipt.total_cost()), "168.75");

    let text = receipt.render();
    assert!(text.contains("Car: Sedan X (2022) from Acme Rentals"));
    assert!(text.contains("Total cost: $168.75"));
    assert!(text.contains(&format!("Date: {}", receipt.date_string())));

    // Nothing about the booking reaches the file
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "C001,2022,Sedan X,Acme Rentals,45.00\n"
    );
}

#[test]
fn invalid_bookings_are_distinct_errors() {
    let catalog = sample_catalog();

    assert!(matches!(
        book_car(&catalog, "ZZZ", "Jane Doe", 3),
        Err(RentalError::CarNotFound(_))
    ));
    assert!(matches!(
        book_car(&catalog, "C001", "", 3),
        Err(RentalError::InvalidRenterName)
    ));
    assert!(matches!(
        book_car(&catalog, "C001", "Jane Doe", 0),
        Err(RentalError::InvalidDayCount(_))
    ));
    assert!(matches!(
        book_car(&catalog, "C001", "Jane Doe", -1),
        Err(RentalError::InvalidDayCount(_))
    ));
}

#[test]
fn receipt_serializes_to_json() {
    let catalog = sample_catalog();
    let receipt = book_car(&catalog, "C002", "Jane Doe", 2).unwrap();

    let value = serde_json::to_value(&receipt).unwrap();
    assert_eq!(value["car"]["code"], "C002");
    assert_eq!(value["days"], 2);
    assert_eq!(value["breakdown"]["base_cost"], 121.0);
}
