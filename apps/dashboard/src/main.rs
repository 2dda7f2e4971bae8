use std::{
    collections::HashSet,
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{anyhow, Context, Result};
use board::{view, DetailEditor, ManageEditor, SheetEditor};
use clap::{Parser, Subcommand};
use shared::domain::{Building, Machine, MachineId, MachineStatus};
use store::{
    settings::{load_settings, open_store},
    MachineStore,
};

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Factory-floor machine status board")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the status board for one building.
    Board { building: Building },
    /// List every machine the way the management screen does.
    List,
    /// Reassign the produced item straight from the board.
    Assign { id: i64, item: String },
    /// Edit one machine's status, item, and counts.
    Detail {
        id: i64,
        #[arg(long)]
        status: Option<MachineStatus>,
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        count: Option<String>,
        #[arg(long)]
        target: Option<String>,
        /// Nudge the count by a signed amount, e.g. --nudge=-10.
        #[arg(long, allow_hyphen_values = true)]
        nudge: Option<i32>,
    },
    /// Register a new machine.
    Add {
        name: String,
        #[arg(long, default_value = "B")]
        building: Building,
        #[arg(long, default_value = "idle")]
        status: MachineStatus,
        #[arg(long, default_value = "")]
        item: String,
        #[arg(long, default_value_t = 0)]
        count: u32,
        #[arg(long, default_value_t = 0)]
        target: u32,
    },
    /// Rewrite an existing machine through the management form.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        building: Option<Building>,
        #[arg(long)]
        status: Option<MachineStatus>,
        #[arg(long)]
        item: Option<String>,
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        target: Option<u32>,
    },
    /// Remove a machine after confirmation.
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Bulk sheet editing over the whole floor.
    #[command(subcommand)]
    Sheet(SheetCommand),
}

#[derive(Subcommand, Debug)]
enum SheetCommand {
    /// Print every row as tab-separated values for offline editing.
    Export,
    /// Read an edited sheet back and replace the whole floor.
    Apply {
        file: PathBuf,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let settings = load_settings();
    let store = open_store(&settings).await?;
    let store = store.as_ref();

    match cli.command {
        Command::Board { building } => show_board(store, building).await,
        Command::List => list_machines(store).await,
        Command::Assign { id, item } => assign_item(store, id, &item).await,
        Command::Detail {
            id,
            status,
            item,
            count,
            target,
            nudge,
        } => edit_detail(store, id, status, item, count, target, nudge).await,
        Command::Add {
            name,
            building,
            status,
            item,
            count,
            target,
        } => add_machine(store, name, building, status, item, count, target).await,
        Command::Edit {
            id,
            name,
            building,
            status,
            item,
            count,
            target,
        } => edit_machine(store, id, name, building, status, item, count, target).await,
        Command::Delete { id, yes } => delete_machine(store, id, yes).await,
        Command::Sheet(SheetCommand::Export) => export_sheet(store).await,
        Command::Sheet(SheetCommand::Apply { file, yes }) => apply_sheet(store, &file, yes).await,
    }
}

async fn show_board(store: &dyn MachineStore, building: Building) -> Result<()> {
    let machines = store.get_machines().await?;
    let board = view::board_for_building(&machines, building);

    println!("== {} ==", building.label());
    if board.is_empty() {
        println!("등록된 기계가 없습니다.");
        return Ok(());
    }
    for machine in &board {
        let percent = view::progress_fraction(machine.count, machine.target) * 100.0;
        let item = if machine.item_name.is_empty() {
            "-"
        } else {
            &machine.item_name
        };
        println!(
            "{:>13}  {:<12} [{}] {}  {} / {}  ({:.0}%)",
            machine.id.0,
            machine.name,
            machine.status.label(),
            item,
            machine.count,
            machine.target,
            percent
        );
    }
    Ok(())
}

async fn list_machines(store: &dyn MachineStore) -> Result<()> {
    let machines = store.get_machines().await?;
    for machine in &machines {
        let item = if machine.item_name.is_empty() {
            "-"
        } else {
            &machine.item_name
        };
        println!(
            "{:>13}  [{}] {:<12} {:<16} {}",
            machine.id.0,
            machine.building.label(),
            machine.name,
            item,
            machine.status.label()
        );
    }
    println!("{} machines", machines.len());
    Ok(())
}

async fn assign_item(store: &dyn MachineStore, id: i64, item: &str) -> Result<()> {
    let machine = find_machine(store, id).await?;
    let mut editor = DetailEditor::new(machine);
    editor.set_item(item)?;
    let stored = editor.save(store).await?;
    println!("{} now produces {}", stored.name, stored.item_name);
    Ok(())
}

async fn edit_detail(
    store: &dyn MachineStore,
    id: i64,
    status: Option<MachineStatus>,
    item: Option<String>,
    count: Option<String>,
    target: Option<String>,
    nudge: Option<i32>,
) -> Result<()> {
    let machine = find_machine(store, id).await?;
    let mut editor = DetailEditor::new(machine);

    if let Some(status) = status {
        editor.set_status(status);
    }
    if let Some(item) = item {
        editor.set_item(&item)?;
    }
    if let Some(count) = count {
        editor.set_count_text(&count)?;
    }
    if let Some(target) = target {
        editor.set_target_text(&target)?;
    }
    if let Some(delta) = nudge {
        editor.adjust_count(delta);
    }

    let stored = editor.save(store).await?;
    println!(
        "saved {}: [{}] {} / {}",
        stored.name,
        stored.status.label(),
        stored.count,
        stored.target
    );
    Ok(())
}

async fn add_machine(
    store: &dyn MachineStore,
    name: String,
    building: Building,
    status: MachineStatus,
    item: String,
    count: u32,
    target: u32,
) -> Result<()> {
    let mut editor = ManageEditor::new();
    let form = editor.form_mut();
    form.name = name;
    form.building = building;
    form.status = status;
    form.item_name = item;
    form.count = count;
    form.target = target;

    let stored = editor.submit(store).await?;
    println!("created machine {} ({})", stored.name, stored.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn edit_machine(
    store: &dyn MachineStore,
    id: i64,
    name: Option<String>,
    building: Option<Building>,
    status: Option<MachineStatus>,
    item: Option<String>,
    count: Option<u32>,
    target: Option<u32>,
) -> Result<()> {
    let machine = find_machine(store, id).await?;
    let mut editor = ManageEditor::new();
    editor.begin_edit(&machine);

    let form = editor.form_mut();
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(building) = building {
        form.building = building;
    }
    if let Some(status) = status {
        form.status = status;
    }
    if let Some(item) = item {
        form.item_name = item;
    }
    if let Some(count) = count {
        form.count = count;
    }
    if let Some(target) = target {
        form.target = target;
    }

    let stored = editor.submit(store).await?;
    println!("updated machine {} ({})", stored.name, stored.id);
    Ok(())
}

async fn delete_machine(store: &dyn MachineStore, id: i64, yes: bool) -> Result<()> {
    let machine = find_machine(store, id).await?;
    if !yes && !confirm(&format!("정말 삭제하시겠습니까? ({})", machine.name))? {
        println!("aborted");
        return Ok(());
    }
    ManageEditor::delete(store, machine.id).await?;
    println!("deleted machine {} ({})", machine.name, machine.id);
    Ok(())
}

async fn export_sheet(store: &dyn MachineStore) -> Result<()> {
    let sheet = SheetEditor::load(store).await?;
    println!("id\tbuilding\tname\titems");
    for row in sheet.rows() {
        println!(
            "{}\t{}\t{}\t{}",
            row.machine.id,
            row.machine.building.label(),
            row.machine.name,
            row.item_string
        );
    }
    Ok(())
}

async fn apply_sheet(store: &dyn MachineStore, file: &PathBuf, yes: bool) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("cannot read sheet file '{}'", file.display()))?;
    let parsed = parse_sheet(&raw)?;

    let mut sheet = SheetEditor::load(store).await?;

    let keep: HashSet<i64> = parsed.iter().filter_map(|r| r.id).collect();
    let existing: Vec<MachineId> = sheet.rows().iter().map(|r| r.machine.id).collect();
    for id in existing {
        if !keep.contains(&id.0) {
            sheet.remove_row(id);
        }
    }

    for entry in parsed {
        let row_id = match entry.id {
            Some(raw_id) => {
                let id = MachineId(raw_id);
                if sheet.row_mut(id).is_none() {
                    return Err(anyhow!("unknown machine id {raw_id} in sheet"));
                }
                id
            }
            None => sheet.add_row(),
        };
        let row = sheet
            .row_mut(row_id)
            .ok_or_else(|| anyhow!("sheet row {row_id} vanished"))?;
        row.machine.building = entry.building;
        row.machine.name = entry.name;
        row.item_string = entry.item_string;
    }

    let pending = sheet.rows().len();
    if !yes && !confirm(&format!("모든 변경사항을 저장하시겠습니까? ({pending} rows)"))? {
        println!("aborted");
        return Ok(());
    }

    let saved = sheet.save_all(store).await?;
    println!("saved {} machines", saved.len());
    Ok(())
}

struct SheetEntry {
    id: Option<i64>,
    building: Building,
    name: String,
    item_string: String,
}

fn parse_sheet(raw: &str) -> Result<Vec<SheetEntry>> {
    let mut entries = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') || line.starts_with("id\t") {
            continue;
        }
        entries.push(
            parse_sheet_line(line)
                .with_context(|| format!("sheet line {} is malformed", index + 1))?,
        );
    }
    Ok(entries)
}

// Expected columns: id (blank for new rows), building, name, items.
fn parse_sheet_line(line: &str) -> Result<SheetEntry> {
    let mut fields = line.split('\t');
    let id = fields.next().unwrap_or_default().trim();
    let building = fields
        .next()
        .ok_or_else(|| anyhow!("missing building column"))?;
    let name = fields.next().ok_or_else(|| anyhow!("missing name column"))?;
    let item_string = fields.next().unwrap_or_default();

    Ok(SheetEntry {
        id: if id.is_empty() {
            None
        } else {
            Some(id.parse::<i64>().context("id must be an integer")?)
        },
        building: building.trim().parse()?,
        name: name.trim().to_string(),
        item_string: item_string.trim().to_string(),
    })
}

async fn find_machine(store: &dyn MachineStore, id: i64) -> Result<Machine> {
    let machines = store.get_machines().await?;
    machines
        .into_iter()
        .find(|m| m.id == MachineId(id))
        .ok_or_else(|| anyhow!("no machine with id {id}"))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
