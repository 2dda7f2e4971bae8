use anyhow::Result;
use clap::{Parser, Subcommand};
use store::{
    defaults::default_machines,
    settings::{load_settings, open_remote_store, open_store},
    MachineStore,
};

#[derive(Parser, Debug)]
#[command(name = "tools", about = "Status board operations toolbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert the fixed default machine set into the hosted table.
    Seed,
    /// Fetch and tabulate every machine for manual inspection.
    Dump,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed => seed().await,
        Command::Dump => dump().await,
    }
}

async fn seed() -> Result<()> {
    let settings = load_settings();
    let outcome = async {
        let store = open_remote_store(&settings)?;
        store.upsert_machines(&default_machines()).await
    }
    .await;

    match outcome {
        Ok(rows) => {
            println!("seeded {} machines into the hosted table", rows.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("seeding failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn dump() -> Result<()> {
    let settings = load_settings();
    let store = open_store(&settings).await?;
    let machines = store.get_machines().await?;

    println!(
        "{:>13}  {:<8}  {:<12}  {:<10}  {:<16}  {:>8}  {:>8}",
        "id", "building", "name", "status", "item", "count", "target"
    );
    for m in &machines {
        println!(
            "{:>13}  {:<8}  {:<12}  {:<10}  {:<16}  {:>8}  {:>8}",
            m.id.0,
            m.building.label(),
            m.name,
            m.status.label(),
            if m.item_name.is_empty() { "-" } else { &m.item_name },
            m.count,
            m.target
        );
    }
    println!("{} machines", machines.len());
    Ok(())
}
