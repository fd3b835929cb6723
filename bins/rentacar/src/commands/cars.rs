//! Vehicle commands

use crate::app::App;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;
use rentacar_api_client::endpoints::brands::name_map;
use rentacar_api_client::endpoints::{Car, CarDraft};
use rentacar_api_client::CarsStore;
use rentacar_cli::output::{format_count, format_flag, format_price, print_json};
use rentacar_cli::{Status, Table};
use std::collections::HashMap;

#[derive(Subcommand)]
pub enum CarsCommand {
    /// List vehicles
    List {
        /// Only vehicles that can be rented now
        #[arg(short, long)]
        available: bool,
    },

    /// Show one vehicle
    Show {
        /// Vehicle id
        id: i64,
    },

    /// Register a vehicle
    Create(CarFields),

    /// Change a vehicle; omitted fields keep their value
    Update {
        /// Vehicle id
        id: i64,

        #[command(flatten)]
        fields: CarFields,
    },

    /// Remove a vehicle
    Delete {
        /// Vehicle id
        id: i64,
    },
}

#[derive(Args, Debug, Default)]
pub struct CarFields {
    /// Brand id
    #[arg(short, long)]
    brand: Option<i64>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Model year
    #[arg(short, long)]
    year: Option<i64>,

    /// Daily price
    #[arg(short, long)]
    price: Option<f64>,

    /// Mark as not available for rental
    #[arg(long)]
    unavailable: bool,

    /// Mark as removed from the fleet
    #[arg(long)]
    inactive: bool,
}

impl CarFields {
    fn apply(&self, mut draft: CarDraft) -> CarDraft {
        if self.brand.is_some() {
            draft.brand_id = self.brand;
        }
        if let Some(ref model) = self.model {
            draft.model = model.clone();
        }
        if self.year.is_some() {
            draft.year = self.year;
        }
        if self.price.is_some() {
            draft.daily_price = self.price;
        }
        if self.unavailable {
            draft.available = false;
        }
        if self.inactive {
            draft.is_active = false;
        }
        draft
    }
}

pub async fn run(app: &App, command: CarsCommand) -> Result<()> {
    let mut store = CarsStore::new(app.client.cars());
    match command {
        CarsCommand::List { available } => list(app, &mut store, available).await,
        CarsCommand::Show { id } => {
            let outcome = App::require(store.get(id).await)?;
            let Some(car) = outcome.data else {
                bail!("Vehicle {id} not found");
            };
            if app.json() {
                print_json(&car)?;
            } else {
                let names = brand_names(app, std::slice::from_ref(&car)).await;
                print_car(app, &car, &names);
            }
            Ok(())
        }
        CarsCommand::Create(fields) => {
            let draft = fields.apply(CarDraft::default());
            app.report(store.create(&draft).await)
        }
        CarsCommand::Update { id, fields } => {
            let current = App::require(store.get(id).await)?;
            let Some(car) = current.data else {
                bail!("Vehicle {id} not found");
            };
            let draft = fields.apply(CarDraft::from_car(&car, store.api().brand_key()));
            app.report(store.update(id, &draft).await)
        }
        CarsCommand::Delete { id } => app.report(store.delete(id).await),
    }
}

async fn list(app: &App, store: &mut CarsStore, available: bool) -> Result<()> {
    let params = if available {
        vec![("disponible".to_string(), "true".to_string())]
    } else {
        Vec::new()
    };
    App::require(store.fetch(&params).await)?;
    let cars = store.catalog().items();

    if app.json() {
        print_json(cars)?;
        return Ok(());
    }

    let names = brand_names(app, cars).await;
    let key = store.api().brand_key();
    let mut table = Table::new(["ID", "BRAND", "MODEL", "YEAR", "PRICE", "AVAILABLE"]);
    for car in cars {
        table.row([
            car.id.to_string(),
            car.brand_label(key, &names),
            car.model.clone(),
            car.year.map_or_else(|| "-".to_string(), |y| y.to_string()),
            format_price(car.daily_price),
            format_flag(car.available).to_string(),
        ]);
    }
    table.print();
    println!("{}", format_count(cars.len(), "vehicle", "vehicles").dimmed());
    Ok(())
}

/// Brand names, fetched only when some car lacks an embedded brand
async fn brand_names(app: &App, cars: &[Car]) -> HashMap<i64, String> {
    if cars.iter().all(|c| c.embedded_brand_name().is_some()) {
        return HashMap::new();
    }
    let outcome = app.client.brands().list().await;
    if !outcome.ok {
        Status::warning(&format!("Brand names unavailable: {}", outcome.message));
    }
    outcome.data.map(|b| name_map(&b)).unwrap_or_default()
}

fn print_car(app: &App, car: &Car, names: &HashMap<i64, String>) {
    let key = app.client.config().brand_key.clone();
    Status::header(&format!("Vehicle #{}", car.id));
    println!("  Brand:     {}", car.brand_label(&key, names));
    println!("  Model:     {}", car.model);
    println!(
        "  Year:      {}",
        car.year.map_or_else(|| "-".to_string(), |y| y.to_string())
    );
    println!("  Price:     {}", format_price(car.daily_price));
    println!("  Available: {}", format_flag(car.available));
    println!("  Active:    {}", format_flag(car.is_active));
}
