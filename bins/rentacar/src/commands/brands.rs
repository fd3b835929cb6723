//! Brand commands

use crate::app::App;
use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;
use rentacar_api_client::endpoints::BrandDraft;
use rentacar_cli::output::{format_count, print_json};
use rentacar_cli::Table;

#[derive(Subcommand)]
pub enum BrandsCommand {
    /// List brands
    List,

    /// Register a brand
    Create {
        /// Brand name
        name: String,
    },

    /// Rename a brand
    Rename {
        /// Brand id
        id: i64,
        /// New name
        name: String,
    },

    /// Remove a brand
    Delete {
        /// Brand id
        id: i64,
    },
}

pub async fn run(app: &App, command: BrandsCommand) -> Result<()> {
    let api = app.client.brands();
    match command {
        BrandsCommand::List => {
            let outcome = App::require(api.list().await)?;
            let brands = outcome.data.unwrap_or_default();
            if app.json() {
                print_json(&brands)?;
                return Ok(());
            }
            let mut table = Table::new(["ID", "NAME"]);
            for brand in &brands {
                table.row([brand.id.to_string(), brand.display_name()]);
            }
            table.print();
            println!("{}", format_count(brands.len(), "brand", "brands").dimmed());
            Ok(())
        }
        BrandsCommand::Create { name } => app.report(api.create(&BrandDraft::new(name)).await),
        BrandsCommand::Rename { id, name } => {
            app.report(api.update(id, &BrandDraft::new(name)).await)
        }
        BrandsCommand::Delete { id } => app.report(api.delete(id).await),
    }
}
