use crate::output::{print_json, print_table};
use anyhow::Result;
use clap::Subcommand;
use std::path::Path;
use unlock_core::user::UserAccount;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Create a user account
    Add {
        id: String,
        #[arg(long)]
        email: String,
    },
    /// Show one account
    Show { id: String },
    /// List all accounts
    List,
    /// Grant credits to an account (admin)
    Credit { id: String, amount: u32 },
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> Result<()> {
    match subcmd {
        UserSubcommand::Add { id, email } => add(root, &id, &email, json),
        UserSubcommand::Show { id } => show(root, &id, json),
        UserSubcommand::List => list(root, json),
        UserSubcommand::Credit { id, amount } => credit(root, &id, amount, json),
    }
}

fn add(root: &Path, id: &str, email: &str, json: bool) -> Result<()> {
    let user = UserAccount::create(root, id, email)?;
    if json {
        print_json(&user)?;
    } else {
        println!("Created user '{}' <{}>", user.id, user.email);
    }
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> Result<()> {
    let user = UserAccount::load(root, id)?;
    if json {
        print_json(&user)?;
    } else {
        println!("{} <{}>", user.id, user.email);
        println!("  credits: {}", user.credits);
        println!("  created: {}", user.created_at.to_rfc3339());
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> Result<()> {
    let users = UserAccount::list(root)?;
    if json {
        print_json(&users)?;
    } else {
        let rows = users
            .iter()
            .map(|u| vec![u.id.clone(), u.email.clone(), u.credits.to_string()])
            .collect();
        print_table(&["ID", "EMAIL", "CREDITS"], rows);
    }
    Ok(())
}

fn credit(root: &Path, id: &str, amount: u32, json: bool) -> Result<()> {
    let mut user = UserAccount::load(root, id)?;
    user.grant_credits(amount);
    user.save(root)?;
    if json {
        print_json(&user)?;
    } else {
        println!("Granted {} credits to '{}' (balance: {})", amount, user.id, user.credits);
    }
    Ok(())
}
