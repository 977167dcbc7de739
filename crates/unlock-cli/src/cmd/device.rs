use crate::output::{print_json, print_table};
use anyhow::Result;
use clap::Subcommand;
use std::path::Path;
use unlock_core::device::{CatalogDevice, RegisteredDevice};

#[derive(Subcommand)]
pub enum DeviceSubcommand {
    /// Add a model to the catalog
    Add {
        slug: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        model: String,
        /// Price in credits charged at registration
        #[arg(long)]
        cost: u32,
    },
    /// List the catalog
    List,
    /// List registered customer devices
    Registered,
    /// Show one registered device by IMEI or serial
    Show { identifier: String },
}

pub fn run(root: &Path, subcmd: DeviceSubcommand, json: bool) -> Result<()> {
    match subcmd {
        DeviceSubcommand::Add {
            slug,
            brand,
            model,
            cost,
        } => add(root, &slug, &brand, &model, cost, json),
        DeviceSubcommand::List => list(root, json),
        DeviceSubcommand::Registered => list_registered(root, json),
        DeviceSubcommand::Show { identifier } => show(root, &identifier, json),
    }
}

fn add(root: &Path, slug: &str, brand: &str, model: &str, cost: u32, json: bool) -> Result<()> {
    let device = CatalogDevice::create(root, slug, brand, model, cost)?;
    if json {
        print_json(&device)?;
    } else {
        println!("Added '{}' ({} {}) at {} credits", device.slug, device.brand, device.model, device.credit_cost);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> Result<()> {
    let devices = CatalogDevice::list(root)?;
    if json {
        print_json(&devices)?;
    } else {
        let rows = devices
            .iter()
            .map(|d| {
                vec![
                    d.slug.clone(),
                    d.brand.clone(),
                    d.model.clone(),
                    d.credit_cost.to_string(),
                ]
            })
            .collect();
        print_table(&["SLUG", "BRAND", "MODEL", "CREDITS"], rows);
    }
    Ok(())
}

fn list_registered(root: &Path, json: bool) -> Result<()> {
    let devices = RegisteredDevice::list(root)?;
    if json {
        print_json(&devices)?;
    } else {
        let rows = devices
            .iter()
            .map(|d| {
                vec![
                    d.identifier.clone(),
                    d.kind.to_string(),
                    d.user_id.clone(),
                    d.model.clone(),
                    d.last_outcome
                        .map(|o| o.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();
        print_table(&["IDENTIFIER", "KIND", "USER", "MODEL", "LAST OUTCOME"], rows);
    }
    Ok(())
}

fn show(root: &Path, identifier: &str, json: bool) -> Result<()> {
    let device = RegisteredDevice::load(root, identifier)?;
    if json {
        print_json(&device)?;
    } else {
        println!("{} ({})", device.identifier, device.kind);
        println!("  user:       {}", device.user_id);
        println!("  model:      {}", device.model);
        println!("  spent:      {} credits", device.credits_spent);
        println!("  registered: {}", device.registered_at.to_rfc3339());
        if let Some(outcome) = device.last_outcome {
            println!("  last run:   {outcome}");
        }
    }
    Ok(())
}

/// `unlockhub register <identifier> --user <id> --device <slug>`
pub fn register(root: &Path, identifier: &str, user: &str, catalog_slug: &str, json: bool) -> Result<()> {
    let device = RegisteredDevice::register(root, identifier, user, catalog_slug)?;
    if json {
        print_json(&device)?;
    } else {
        println!(
            "Registered {} ({}) for '{}': {} credits deducted",
            device.identifier, device.model, device.user_id, device.credits_spent
        );
    }
    Ok(())
}
