//! Synthetic listings shared by unit tests.

use autovalue_io::{Listing, ListingTable, VehicleCategory};

const MODELS: [(&str, &str, f64); 4] = [
    ("Honda", "Civic", 90_000.0),
    ("Toyota", "Vios", 80_000.0),
    ("Perodua", "Myvi", 45_000.0),
    ("Proton", "Saga", 35_000.0),
];

/// `n` complete car listings whose price rises with year and falls with mileage.
pub(crate) fn car_listings(n: usize) -> Vec<Listing> {
    (0..n)
        .map(|i| {
            let (make, model, base) = MODELS[i % MODELS.len()];
            let year = 2012 + (i * 7 % 12) as i32;
            let mileage = 10_000.0 + ((i * 13) % 15) as f64 * 8_000.0;
            let transmission = if i % 5 == 0 { "Manual" } else { "Automatic" };
            let fuel = if i % 9 == 0 { "diesel" } else { "petrol" };
            let price = base + f64::from(year - 2012) * 4_000.0 - mileage * 0.1;
            Listing::new(make, model, year, price)
                .with_mileage(mileage)
                .with_transmission(transmission)
                .with_fuel_type(fuel)
        })
        .collect()
}

pub(crate) fn car_table(n: usize) -> ListingTable {
    ListingTable::from_listings(VehicleCategory::Car, car_listings(n))
}

/// `n` motorcycle listings carrying only make, model, year and price.
pub(crate) fn motorcycle_listings(n: usize) -> Vec<Listing> {
    (0..n)
        .map(|i| {
            let year = 2010 + (i % 12) as i32;
            let (make, model) = if i % 2 == 0 { ("Yamaha", "Y15ZR") } else { ("Honda", "RS150R") };
            Listing::new(make, model, year, 3_000.0 + f64::from(year - 2010) * 600.0)
        })
        .collect()
}

pub(crate) fn motorcycle_table(n: usize) -> ListingTable {
    ListingTable::from_listings(VehicleCategory::Motorcycle, motorcycle_listings(n))
}
