//! Rental commands

use crate::app::App;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use owo_colors::OwoColorize;
use rentacar_api_client::endpoints::RentalDraft;
use rentacar_api_client::RentalsStore;
use rentacar_cli::output::{format_count, print_json};
use rentacar_cli::Table;

#[derive(Subcommand)]
pub enum RentalsCommand {
    /// List rentals
    List,

    /// Book a car for a client
    Create {
        /// Client id
        #[arg(long)]
        client: i64,

        /// Car id
        #[arg(long)]
        car: i64,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },

    /// Cancel a rental
    Delete {
        /// Rental id
        id: i64,
    },
}

pub async fn run(app: &App, command: RentalsCommand) -> Result<()> {
    let mut store = RentalsStore::new(app.client.rentals());
    match command {
        RentalsCommand::List => {
            App::require(store.fetch(&[]).await)?;
            let rentals = store.catalog().items();
            if app.json() {
                print_json(rentals)?;
                return Ok(());
            }
            let mut table = Table::new(["ID", "CAR", "CLIENT", "FROM", "TO", "DAYS"]);
            for rental in rentals {
                table.row([
                    rental.id.to_string(),
                    rental.car_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                    rental.client_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                    rental.start.to_string(),
                    rental.end.to_string(),
                    rental.days().to_string(),
                ]);
            }
            table.print();
            println!("{}", format_count(rentals.len(), "rental", "rentals").dimmed());
            Ok(())
        }
        RentalsCommand::Create {
            client,
            car,
            start,
            end,
        } => {
            let draft = RentalDraft {
                client_id: Some(client),
                car_id: Some(car),
                start: Some(start),
                end: Some(end),
            };
            app.report(store.create(&draft).await)
        }
        RentalsCommand::Delete { id } => app.report(store.delete(id).await),
    }
}
