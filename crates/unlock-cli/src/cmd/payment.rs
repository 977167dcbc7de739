use crate::output::{print_json, print_table};
use anyhow::{anyhow, Result};
use clap::Subcommand;
use std::path::Path;
use unlock_core::payment::PaymentRequest;
use unlock_core::types::PaymentMethod;

#[derive(Subcommand)]
pub enum PaymentSubcommand {
    /// File a payment request for manual confirmation
    Add {
        #[arg(long)]
        user: String,
        /// Payment rail: crypto | kofi
        #[arg(long)]
        method: String,
        /// Transaction hash or receipt id supplied by the customer
        #[arg(long)]
        reference: String,
        #[arg(long)]
        amount: f64,
        /// Credits to mint on confirmation
        #[arg(long)]
        credits: u32,
    },
    /// List payment requests
    List,
    /// Confirm a pending payment and mint its credits (admin)
    Confirm { id: String },
    /// Reject a pending payment (admin)
    Reject { id: String },
}

pub fn run(root: &Path, subcmd: PaymentSubcommand, json: bool) -> Result<()> {
    match subcmd {
        PaymentSubcommand::Add {
            user,
            method,
            reference,
            amount,
            credits,
        } => add(root, &user, &method, &reference, amount, credits, json),
        PaymentSubcommand::List => list(root, json),
        PaymentSubcommand::Confirm { id } => confirm(root, &id, json),
        PaymentSubcommand::Reject { id } => reject(root, &id, json),
    }
}

fn add(
    root: &Path,
    user: &str,
    method: &str,
    reference: &str,
    amount: f64,
    credits: u32,
    json: bool,
) -> Result<()> {
    let method: PaymentMethod = method.parse().map_err(|e| anyhow!("{e}"))?;
    let payment = PaymentRequest::create(root, user, method, reference, amount, credits)?;
    if json {
        print_json(&payment)?;
    } else {
        println!(
            "Filed {} payment {} for '{}': ${:.2} -> {} credits (pending)",
            payment.method, payment.id, payment.user_id, payment.amount_usd, payment.credits
        );
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> Result<()> {
    let payments = PaymentRequest::list(root)?;
    if json {
        print_json(&payments)?;
    } else {
        let rows = payments
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.user_id.clone(),
                    p.method.to_string(),
                    format!("{:.2}", p.amount_usd),
                    p.credits.to_string(),
                    p.status.to_string(),
                ]
            })
            .collect();
        print_table(&["ID", "USER", "METHOD", "USD", "CREDITS", "STATUS"], rows);
    }
    Ok(())
}

fn confirm(root: &Path, id: &str, json: bool) -> Result<()> {
    let mut payment = PaymentRequest::load(root, id)?;
    payment.confirm(root)?;
    if json {
        print_json(&payment)?;
    } else {
        println!("Confirmed payment {}: {} credits minted for '{}'", payment.id, payment.credits, payment.user_id);
    }
    Ok(())
}

fn reject(root: &Path, id: &str, json: bool) -> Result<()> {
    let mut payment = PaymentRequest::load(root, id)?;
    payment.reject(root)?;
    if json {
        print_json(&payment)?;
    } else {
        println!("Rejected payment {}", payment.id);
    }
    Ok(())
}
