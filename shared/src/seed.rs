//! The illustrative records the directory starts with.

use chrono::NaiveDate;

use crate::data::{Address, Owner, Vehicle, VehicleStatus, VehicleType};

const fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("seed dates must be valid calendar dates"),
    }
}

const REGISTRATION_DATES: [NaiveDate; 5] = [
    date(2023, 6, 15),
    date(2022, 11, 8),
    date(2021, 3, 22),
    date(2023, 9, 10),
    date(2022, 1, 30),
];

#[must_use]
pub fn seed_vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: "1".into(),
            registration_number: "ABC-1234".into(),
            make: "Tesla".into(),
            model: "Model 3".into(),
            year: 2023,
            color: "Midnight Silver".into(),
            vin: "5YJ3E1EA1JF006789".into(),
            vehicle_type: VehicleType::Sedan,
            status: VehicleStatus::Active,
            registration_date: REGISTRATION_DATES[0],
            owner: Owner {
                id: "101".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john.doe@example.com".into(),
                phone: "555-123-4567".into(),
                license_number: "DL123456789".into(),
                address: Address {
                    street: "123 Main St".into(),
                    city: "San Francisco".into(),
                    state: "CA".into(),
                    zip_code: "94105".into(),
                    country: "USA".into(),
                },
            },
        },
        Vehicle {
            id: "2".into(),
            registration_number: "XYZ-9876".into(),
            make: "BMW".into(),
            model: "X5".into(),
            year: 2022,
            color: "Alpine White".into(),
            vin: "WBAJA5C55KEX39023".into(),
            vehicle_type: VehicleType::Suv,
            status: VehicleStatus::Active,
            registration_date: REGISTRATION_DATES[1],
            owner: Owner {
                id: "102".into(),
                first_name: "Jane".into(),
                last_name: "Smith".into(),
                email: "jane.smith@example.com".into(),
                phone: "555-987-6543".into(),
                license_number: "DL987654321".into(),
                address: Address {
                    street: "456 Park Ave".into(),
                    city: "New York".into(),
                    state: "NY".into(),
                    zip_code: "10022".into(),
                    country: "USA".into(),
                },
            },
        },
        Vehicle {
            id: "3".into(),
            registration_number: "DEF-5678".into(),
            make: "Toyota".into(),
            model: "Camry".into(),
            year: 2021,
            color: "Celestial Silver".into(),
            vin: "4T1BF1FK5MU123456".into(),
            vehicle_type: VehicleType::Sedan,
            status: VehicleStatus::Active,
            registration_date: REGISTRATION_DATES[2],
            owner: Owner {
                id: "103".into(),
                first_name: "Robert".into(),
                last_name: "Johnson".into(),
                email: "robert.johnson@example.com".into(),
                phone: "555-456-7890".into(),
                license_number: "DL456789012".into(),
                address: Address {
                    street: "789 Oak Dr".into(),
                    city: "Chicago".into(),
                    state: "IL".into(),
                    zip_code: "60601".into(),
                    country: "USA".into(),
                },
            },
        },
        Vehicle {
            id: "4".into(),
            registration_number: "GHI-9012".into(),
            make: "Honda".into(),
            model: "Civic".into(),
            year: 2023,
            color: "Cosmic Blue".into(),
            vin: "2HGFC2F70PH123456".into(),
            vehicle_type: VehicleType::Sedan,
            status: VehicleStatus::Pending,
            registration_date: REGISTRATION_DATES[3],
            owner: Owner {
                id: "104".into(),
                first_name: "Emily".into(),
                last_name: "Brown".into(),
                email: "emily.brown@example.com".into(),
                phone: "555-789-0123".into(),
                license_number: "DL789012345".into(),
                address: Address {
                    street: "101 Pine St".into(),
                    city: "Seattle".into(),
                    state: "WA".into(),
                    zip_code: "98101".into(),
                    country: "USA".into(),
                },
            },
        },
        Vehicle {
            id: "5".into(),
            registration_number: "JKL-3456".into(),
            make: "Audi".into(),
            model: "Q7".into(),
            year: 2022,
            color: "Daytona Gray".into(),
            vin: "WA1VAAF77LD123456".into(),
            vehicle_type: VehicleType::Suv,
            status: VehicleStatus::Expired,
            registration_date: REGISTRATION_DATES[4],
            owner: Owner {
                id: "105".into(),
                first_name: "Michael".into(),
                last_name: "Williams".into(),
                email: "michael.williams@example.com".into(),
                phone: "555-234-5678".into(),
                license_number: "DL234567890".into(),
                address: Address {
                    street: "222 Maple Ave".into(),
                    city: "Austin".into(),
                    state: "TX".into(),
                    zip_code: "78701".into(),
                    country: "USA".into(),
                },
            },
        },
    ]
}
