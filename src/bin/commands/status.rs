use anyhow::Result;
use clap::Args;
use std::path::Path;
use store_results::{format_size, inspect_storage, StorageReport, StoreConfig};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Arguments for the Status command
#[derive(Args)]
pub struct StatusArgs {
    /// Print the report as pretty JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Table")]
    name: String,
    #[tabled(rename = "Rows")]
    rows: String,
}

pub fn run(config: &StoreConfig, args: StatusArgs) -> Result<()> {
    let report = inspect_storage(Path::new(&config.db_path))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_status_table(config, &report);
    }
    Ok(())
}

fn print_status_table(config: &StoreConfig, report: &StorageReport) {
    println!("{}", config.summary());
    println!();
    println!(
        "Status:             {}",
        if report.exists {
            "exists"
        } else {
            "not created"
        }
    );
    if let Some(size) = report.size_bytes {
        println!("Size:               {}", format_size(size));
    }
    println!("Schema:             {}", report.schema);
    println!();

    let rows: Vec<TableRow> = report
        .tables
        .iter()
        .map(|t| TableRow {
            name: t.name.clone(),
            rows: t
                .rows
                .map(|n| n.to_string())
                .unwrap_or_else(|| "missing".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    if !report.exists {
        eprintln!();
        eprintln!("Run `store-results` to create the database.");
    }
}
