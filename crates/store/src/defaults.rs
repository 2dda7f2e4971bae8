use shared::domain::{Building, Machine, MachineId, MachineStatus};

/// Fixed key the local store files the whole machine list under.
pub const STORAGE_KEY: &str = "dashboard_machines";

/// The seed set written into an empty store. Ids are fixed so repeated
/// seeding upserts instead of duplicating.
pub fn default_machines() -> Vec<Machine> {
    vec![
        machine(
            1,
            "Press-01",
            Building::B,
            MachineStatus::Running,
            "Bracket-A",
            &["Bracket-A", "Bracket-B"],
            1250,
            2000,
        ),
        machine(2, "Press-02", Building::B, MachineStatus::Idle, "", &[], 0, 0),
        machine(
            3,
            "Press-03",
            Building::B,
            MachineStatus::Done,
            "Cover-B",
            &["Cover-B", "Cover-C"],
            500,
            500,
        ),
        machine(
            4,
            "Press-04",
            Building::D,
            MachineStatus::Running,
            "Panel-X",
            &["Panel-X", "Panel-Y"],
            3400,
            5000,
        ),
        machine(
            5,
            "Press-05",
            Building::D,
            MachineStatus::Running,
            "Panel-Y",
            &["Panel-Y", "Panel-Z"],
            2100,
            3000,
        ),
        machine(
            6,
            "Mori-01",
            Building::Mori,
            MachineStatus::Idle,
            "",
            &["Part-A", "Part-B"],
            100,
            1000,
        ),
        machine(
            7,
            "Wiz-01",
            Building::Wiz,
            MachineStatus::Done,
            "Gear-Z",
            &["Gear-Z"],
            800,
            800,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn machine(
    id: i64,
    name: &str,
    building: Building,
    status: MachineStatus,
    item_name: &str,
    possible_items: &[&str],
    count: u32,
    target: u32,
) -> Machine {
    Machine {
        id: MachineId(id),
        name: name.to_string(),
        building,
        status,
        item_name: item_name.to_string(),
        possible_items: possible_items.iter().map(|s| s.to_string()).collect(),
        count,
        target,
    }
}
