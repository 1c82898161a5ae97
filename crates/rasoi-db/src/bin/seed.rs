//! # Menu Seeder
//!
//! Loads a development menu into the database.
//!
//! ## Usage
//! ```bash
//! cargo run -p rasoi-db --bin seed
//!
//! # Specify database path
//! cargo run -p rasoi-db --bin seed -- --db ./data/rasoi.db
//! ```
//!
//! ## Generated Menu
//! - Food at 5% GST (split 2.5% CGST / 2.5% SGST on the bill)
//! - Soft beverages at 5% GST
//! - Liquor and beer outside GST
//! - A couple of exempt items (mineral water, packed items at MRP)

use std::env;

use rasoi_core::{GstCategory, GstRate, MenuItem, Money};
use rasoi_db::{Database, DbConfig};

/// (code, name, rupees, category, gst %)
const MENU: &[(&str, &str, i64, GstCategory, u32)] = &[
    ("PNT", "Paneer Tikka", 280, GstCategory::General, 5),
    ("DAL", "Dal Makhani", 220, GstCategory::General, 5),
    ("BCK", "Butter Chicken", 340, GstCategory::General, 5),
    ("JRC", "Jeera Rice", 160, GstCategory::General, 5),
    ("BNN", "Butter Naan", 60, GstCategory::General, 5),
    ("TRT", "Tandoori Roti", 30, GstCategory::General, 5),
    ("GLB", "Gulab Jamun", 90, GstCategory::General, 5),
    ("LIM", "Fresh Lime Soda", 80, GstCategory::General, 5),
    ("MTE", "Masala Tea", 40, GstCategory::General, 5),
    ("WSK-30", "Blended Whisky 30ml", 180, GstCategory::Liquor, 0),
    ("RUM-30", "Dark Rum 30ml", 150, GstCategory::Liquor, 0),
    ("WIN-GL", "House Red (glass)", 350, GstCategory::Liquor, 0),
    ("BER-PT", "Draught Beer (pint)", 260, GstCategory::Beer, 0),
    ("BER-BT", "Strong Beer (650ml)", 300, GstCategory::Beer, 0),
    ("WTR", "Mineral Water 1L", 20, GstCategory::Exempt, 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rasoi_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Rasoi POS Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rasoi_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Rasoi POS Menu Seeder");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Menu already has {} items", existing);
        println!("  Skipping seed to avoid overwriting edits.");
        return Ok(());
    }

    for (code, name, rupees, category, gst) in MENU {
        let item = MenuItem {
            code: code.to_string(),
            name: name.to_string(),
            rate: Money::from_rupees(*rupees),
            gst_category: *category,
            gst_rate: GstRate::from_percent(*gst),
            active: true,
        };

        if let Err(e) = db.menu().upsert(&item).await {
            eprintln!("Failed to insert {}: {}", item.code, e);
        }
    }

    println!("✓ Seeded {} menu items", db.menu().count().await?);

    db.close().await;
    Ok(())
}
