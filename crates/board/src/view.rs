use shared::domain::{Building, Machine};

/// Machines shown for the active building tab: filtered, then ordered by
/// status rank. The sort is stable, so equal-status machines keep their
/// stored relative order.
pub fn board_for_building(machines: &[Machine], building: Building) -> Vec<Machine> {
    let mut selected: Vec<Machine> = machines
        .iter()
        .filter(|m| m.building == building)
        .cloned()
        .collect();
    selected.sort_by_key(|m| m.status.rank());
    selected
}

/// Progress toward the production goal, clamped to `[0, 1]`. A target of
/// zero means no goal is defined and reads as zero progress.
pub fn progress_fraction(count: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (f64::from(count) / f64::from(target)).min(1.0)
}

/// The editable text form of a producible-item menu.
pub fn format_item_list(items: &[String]) -> String {
    items.join(", ")
}

/// Parses the editable text back into a menu: split on commas, trim, drop
/// empty segments. Order is preserved and duplicates are kept.
pub fn parse_item_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
