use crate::output::{print_json, print_table};
use anyhow::Result;
use clap::Subcommand;
use std::path::Path;
use unlock_core::ticket::Ticket;

#[derive(Subcommand)]
pub enum TicketSubcommand {
    /// List tickets
    List,
    /// Show one ticket
    Show { id: String },
    /// Close a ticket (admin)
    Close { id: String },
    /// File a complaint for a registered device (the post-failure handoff)
    Complain {
        /// IMEI or serial of the registered device
        identifier: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
}

pub fn run(root: &Path, subcmd: TicketSubcommand, json: bool) -> Result<()> {
    match subcmd {
        TicketSubcommand::List => list(root, json),
        TicketSubcommand::Show { id } => show(root, &id, json),
        TicketSubcommand::Close { id } => close(root, &id, json),
        TicketSubcommand::Complain {
            identifier,
            title,
            description,
        } => complain(root, &identifier, &title, &description, json),
    }
}

fn list(root: &Path, json: bool) -> Result<()> {
    let tickets = Ticket::list(root)?;
    if json {
        print_json(&tickets)?;
    } else {
        let rows = tickets
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.kind.to_string(),
                    t.priority.to_string(),
                    t.status.to_string(),
                    t.title.clone(),
                ]
            })
            .collect();
        print_table(&["ID", "KIND", "PRIORITY", "STATUS", "TITLE"], rows);
    }
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> Result<()> {
    let ticket = Ticket::load(root, id)?;
    if json {
        print_json(&ticket)?;
    } else {
        println!("{} [{}] {}", ticket.id, ticket.priority, ticket.title);
        println!("  kind:    {}", ticket.kind);
        println!("  status:  {}", ticket.status);
        println!("  from:    {} <{}>", ticket.user_id, ticket.user_email);
        if let Some(imei) = &ticket.imei {
            println!("  device:  {imei}");
        }
        if let Some(model) = &ticket.model {
            println!("  model:   {model}");
        }
        println!("  created: {}", ticket.created_at.to_rfc3339());
        println!("\n{}", ticket.description);
    }
    Ok(())
}

fn close(root: &Path, id: &str, json: bool) -> Result<()> {
    let mut ticket = Ticket::load(root, id)?;
    ticket.close(root)?;
    if json {
        print_json(&ticket)?;
    } else {
        println!("Closed ticket {}", ticket.id);
    }
    Ok(())
}

fn complain(root: &Path, identifier: &str, title: &str, description: &str, json: bool) -> Result<()> {
    let ticket = Ticket::file_complaint(root, identifier, title, description)?;
    if json {
        print_json(&ticket)?;
    } else {
        println!("Filed complaint {} ({} priority) for {}", ticket.id, ticket.priority, identifier);
    }
    Ok(())
}
