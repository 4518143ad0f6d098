//! # Seed Data Generator
//!
//! Populates the database with sample provinces, agents, customers and
//! deliveries for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p caravan-db --bin seed
//!
//! # Specify database path and delivery count
//! cargo run -p caravan-db --bin seed -- --db ./data/caravan.db --count 200
//! ```

use std::env;

use caravan_core::{CommissionRate, DeliveryStatus};
use caravan_db::repository::agent::NewAgent;
use caravan_db::repository::customer::NewCustomer;
use caravan_db::repository::delivery::{NewDelivery, NewDeliveryItem};
use caravan_db::{Database, DbConfig};

/// Provinces the sample business delivers to.
const PROVINCES: &[&str] = &[
    "Kabul",
    "Herat",
    "Kandahar",
    "Balkh",
    "Nangarhar",
    "Badakhshan",
    "Bamyan",
    "Ghazni",
];

/// Sample agents: (name, phone, commission rate in bps).
const AGENTS: &[(&str, &str, u32)] = &[
    ("Ahmad Rahimi", "+93 70 000 0001", 1500),
    ("Farid Noori", "+93 70 000 0002", 1000),
    ("Zahra Karimi", "+93 70 000 0003", 1250),
    ("Omar Safi", "+93 70 000 0004", 800),
];

/// Sample customers: (name, phone).
const CUSTOMERS: &[(&str, &str)] = &[
    ("Hamid Traders", "+93 78 000 0001"),
    ("Ariana Bazaar", "+93 78 000 0002"),
    ("Pamir Wholesale", "+93 78 000 0003"),
    ("Khyber Imports", "+93 78 000 0004"),
    ("Silk Road Goods", "+93 78 000 0005"),
];

/// Sample goods: (name, unit cost in cents).
const GOODS: &[(&str, i64)] = &[
    ("Rice 25kg", 3_200),
    ("Cooking Oil 10L", 2_400),
    ("Flour 50kg", 4_100),
    ("Sugar 10kg", 1_300),
    ("Green Tea 5kg", 5_500),
    ("Dried Fruit Box", 7_800),
    ("Textile Bale", 15_000),
    ("Soap Carton", 2_100),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./caravan_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caravan Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of deliveries to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./caravan_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Caravan Seed Data Generator");
    println!("===========================");
    println!("Database:   {}", db_path);
    println!("Deliveries: {}", count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.provinces().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} provinces", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Provinces
    let mut province_ids = Vec::new();
    for name in PROVINCES {
        let province = db.provinces().create(name).await?;
        province_ids.push(province.id);
    }
    println!("✓ Created {} provinces", province_ids.len());

    // Agents, each covering a couple of provinces
    let mut agent_ids = Vec::new();
    for (idx, (name, phone, rate_bps)) in AGENTS.iter().enumerate() {
        let agent = db
            .agents()
            .create(&NewAgent {
                name: name.to_string(),
                phone: phone.to_string(),
                email: Some(format!(
                    "{}@caravan.example",
                    name.to_lowercase().replace(' ', ".")
                )),
                commission_rate_bps: *rate_bps,
            })
            .await?;

        db.agents()
            .assign_province(&agent.id, &province_ids[idx % province_ids.len()])
            .await?;
        db.agents()
            .assign_province(&agent.id, &province_ids[(idx + 1) % province_ids.len()])
            .await?;

        agent_ids.push(agent.id);
    }
    println!("✓ Created {} agents with province assignments", agent_ids.len());

    // Customers
    let mut customer_ids = Vec::new();
    for (idx, (name, phone)) in CUSTOMERS.iter().enumerate() {
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: name.to_string(),
                email: None,
                phone: Some(phone.to_string()),
                address: Some(format!("Shop {}, Main Bazaar", idx + 1)),
                province_id: Some(province_ids[idx % province_ids.len()].clone()),
            })
            .await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Created {} customers", customer_ids.len());

    // Deliveries with one to three items each
    println!();
    println!("Generating deliveries...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let item_count = 1 + seed % 3;
        let items: Vec<NewDeliveryItem> = (0..item_count)
            .map(|n| {
                let (name, unit_cost) = GOODS[(seed + n) % GOODS.len()];
                NewDeliveryItem {
                    item_name: name.to_string(),
                    description: None,
                    unit_cost_cents: unit_cost,
                    // Every other item gets the default 30% markup
                    selling_price_cents: if n % 2 == 0 {
                        None
                    } else {
                        Some(unit_cost + unit_cost / 2)
                    },
                    quantity: 1 + (seed % 5) as i64,
                }
            })
            .collect();

        let status = DeliveryStatus::ALL[seed % DeliveryStatus::ALL.len()];

        let delivery = NewDelivery {
            customer_id: Some(customer_ids[seed % customer_ids.len()].clone()),
            agent_id: Some(agent_ids[seed % agent_ids.len()].clone()),
            province_id: Some(province_ids[seed % province_ids.len()].clone()),
            delivery_date: None,
            status: Some(status),
            items,
        };

        if let Err(e) = db.deliveries().create(&delivery).await {
            eprintln!("Failed to insert delivery #{}: {}", seed, e);
            continue;
        }

        generated += 1;
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} deliveries in {:?}", generated, elapsed);

    // Sanity-check the rollups
    let stats = db.deliveries().stats().await?;
    println!();
    println!("Dashboard check:");
    println!("  deliveries: {}", stats.total_deliveries);
    println!("  items:      {}", stats.total_items);
    println!(
        "  commission: {}",
        caravan_core::Money::from_cents(stats.total_commission_cents)
    );
    println!(
        "  sample rate: {}%",
        CommissionRate::from_bps(AGENTS[0].2).percentage()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
