//! Customer commands

use crate::app::App;
use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;
use rentacar_api_client::endpoints::clients::selectable;
use rentacar_api_client::endpoints::{Client, ClientDraft};
use rentacar_cli::output::{format_count, format_flag, print_json};
use rentacar_cli::Table;

#[derive(Subcommand)]
pub enum ClientsCommand {
    /// List customers who can rent
    List {
        /// Include deactivated customers
        #[arg(short, long)]
        all: bool,
    },

    /// Register a customer
    Create {
        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Identity document number
        #[arg(short, long)]
        document: String,

        /// Contact e-mail
        #[arg(short, long)]
        email: Option<String>,

        /// Contact phone
        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Remove a customer
    Delete {
        /// Customer id
        id: i64,
    },
}

pub async fn run(app: &App, command: ClientsCommand) -> Result<()> {
    let api = app.client.clients();
    match command {
        ClientsCommand::List { all } => {
            let outcome = App::require(api.list().await)?;
            let clients = outcome.data.unwrap_or_default();
            let shown: Vec<&Client> = if all {
                clients.iter().collect()
            } else {
                selectable(&clients).collect()
            };

            if app.json() {
                print_json(&shown)?;
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME", "DOCUMENT", "E-MAIL", "ACTIVE"]);
            for client in &shown {
                table.row([
                    client.id.to_string(),
                    format!("{} {}", client.first_name, client.last_name),
                    client.document.clone(),
                    client.email.clone().unwrap_or_default(),
                    format_flag(client.is_active).to_string(),
                ]);
            }
            table.print();
            println!("{}", format_count(shown.len(), "client", "clients").dimmed());
            Ok(())
        }
        ClientsCommand::Create {
            first_name,
            last_name,
            document,
            email,
            phone,
        } => {
            let draft = ClientDraft {
                first_name,
                last_name,
                document,
                email,
                phone,
            };
            app.report(api.create(&draft).await)
        }
        ClientsCommand::Delete { id } => app.report(api.delete(id).await),
    }
}
