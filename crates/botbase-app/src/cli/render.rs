//! Table rendering, sorting and user-facing messages.

use std::cmp::Ordering;
use std::fmt;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use botbase_types::bot::{Bot, BotSortKey};
use botbase_types::error::RecordError;
use botbase_types::knowledge::{EntrySortKey, KnowledgeBaseEntry};

/// Longest text shown in a table cell before it is cut with `...`.
pub const CELL_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::Ascending, SortOrder::Descending];

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Single-line preview of `text`, at most `max` characters long.
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if flat.chars().count() <= max {
        return flat;
    }

    let kept: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn sort_bots(bots: &mut [Bot], key: BotSortKey, order: SortOrder) {
    bots.sort_by(|a, b| {
        let ordering = match key {
            BotSortKey::Id => a.id.cmp(&b.id),
            BotSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            BotSortKey::Description => a.description.cmp(&b.description),
        };
        order.apply(ordering)
    });
}

pub fn sort_entries(entries: &mut [KnowledgeBaseEntry], key: EntrySortKey, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ordering = match key {
            EntrySortKey::Id => a.id.cmp(&b.id),
            EntrySortKey::BotId => a.bot_id.cmp(&b.bot_id).then(a.id.cmp(&b.id)),
            EntrySortKey::Content => a.content.cmp(&b.content),
            EntrySortKey::Metadata => a.metadata.cmp(&b.metadata),
        };
        order.apply(ordering)
    });
}

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(v) => Cell::new(truncate(v, CELL_WIDTH)),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Columns to display, in table order: every picked index of `all`, plus
/// `id`, which cannot be hidden.
///
/// The second value is true when `id` was left unpicked.
pub fn visible_columns<K: Copy + PartialEq>(
    all: &[K],
    picked: &[usize],
    id: K,
) -> (Vec<K>, bool) {
    let id_dropped = !picked.iter().any(|&i| all.get(i) == Some(&id));
    let columns = all
        .iter()
        .enumerate()
        .filter(|(i, key)| **key == id || picked.contains(i))
        .map(|(_, key)| *key)
        .collect();
    (columns, id_dropped)
}

fn bot_header(key: BotSortKey) -> &'static str {
    match key {
        BotSortKey::Id => "ID",
        BotSortKey::Name => "Name",
        BotSortKey::Description => "Description",
    }
}

fn bot_cell(bot: &Bot, key: BotSortKey) -> Cell {
    match key {
        BotSortKey::Id => Cell::new(bot.id).fg(Color::DarkGrey),
        BotSortKey::Name => Cell::new(truncate(&bot.name, CELL_WIDTH)).fg(Color::Cyan),
        BotSortKey::Description => optional_cell(bot.description.as_deref()),
    }
}

fn entry_header(key: EntrySortKey) -> &'static str {
    match key {
        EntrySortKey::Id => "ID",
        EntrySortKey::BotId => "Bot",
        EntrySortKey::Content => "Content",
        EntrySortKey::Metadata => "Metadata",
    }
}

fn entry_cell(entry: &KnowledgeBaseEntry, key: EntrySortKey) -> Cell {
    match key {
        EntrySortKey::Id => Cell::new(entry.id).fg(Color::DarkGrey),
        EntrySortKey::BotId => Cell::new(entry.bot_id).fg(Color::Cyan),
        EntrySortKey::Content => Cell::new(truncate(&entry.content, CELL_WIDTH)),
        EntrySortKey::Metadata => optional_cell(entry.metadata.as_deref()),
    }
}

pub fn bots_table(bots: &[Bot], columns: &[BotSortKey]) -> Table {
    let headers: Vec<&str> = columns.iter().map(|&k| bot_header(k)).collect();
    let mut table = base_table(&headers);
    for bot in bots {
        table.add_row(columns.iter().map(|&k| bot_cell(bot, k)).collect::<Vec<_>>());
    }
    table
}

pub fn entries_table(entries: &[KnowledgeBaseEntry], columns: &[EntrySortKey]) -> Table {
    let headers: Vec<&str> = columns.iter().map(|&k| entry_header(k)).collect();
    let mut table = base_table(&headers);
    for entry in entries {
        table.add_row(columns.iter().map(|&k| entry_cell(entry, k)).collect::<Vec<_>>());
    }
    table
}

/// Menu label for a bot in selection prompts.
pub fn bot_label(bot: &Bot) -> String {
    format!("#{} {}", bot.id, truncate(&bot.name, CELL_WIDTH))
}

/// Menu label for an entry in selection prompts.
pub fn entry_label(entry: &KnowledgeBaseEntry) -> String {
    format!(
        "#{} (bot {}) {}",
        entry.id,
        entry.bot_id,
        truncate(&entry.content, CELL_WIDTH)
    )
}

pub fn error_message(err: &RecordError) -> String {
    match err {
        RecordError::Validation { field, message } => {
            format!("Invalid {field}: {message}")
        }
        RecordError::NotFound { kind, id } => {
            format!("No {kind} with id {id} exists. It may have been deleted.")
        }
        RecordError::IntegrityViolation(msg) => {
            format!("The store rejected the change, nothing was saved ({msg})")
        }
        RecordError::StoreUnavailable(msg) => format!("The store is unavailable: {msg}"),
        RecordError::Storage(msg) => format!("Unexpected storage error: {msg}"),
    }
}

pub fn print_record_error(err: &RecordError) {
    println!();
    if err.is_recoverable() {
        println!("  {} {}", style("!").yellow().bold(), error_message(err));
    } else {
        println!("  {} {}", style("✗").red().bold(), error_message(err));
    }
    println!();
}

pub fn print_success(message: &str) {
    println!();
    println!("  {} {}", style("✓").green().bold(), message);
    println!();
}

pub fn print_info(message: &str) {
    println!();
    println!("  {} {}", style("i").blue().bold(), message);
    println!();
}

pub fn print_table(table: &Table, count: usize, noun: &str) {
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} {noun}{}",
        style(count).bold(),
        if count == 1 { "" } else { "s" }
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbase_types::bot::BotId;
    use botbase_types::error::RecordKind;
    use botbase_types::knowledge::EntryId;

    fn bot(id: i64, name: &str, description: Option<&str>) -> Bot {
        Bot {
            id: BotId(id),
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    fn entry(id: i64, bot_id: i64, content: &str) -> KnowledgeBaseEntry {
        KnowledgeBaseEntry {
            id: EntryId(id),
            bot_id: BotId(bot_id),
            content: content.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate("Helper", 10), "Helper");
    }

    #[test]
    fn truncate_long_text_adds_ellipsis() {
        let out = truncate(&"x".repeat(80), CELL_WIDTH);
        assert_eq!(out.chars().count(), CELL_WIDTH);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncate_is_char_aware_and_single_line() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("Q: hours?\nA: 9-5", 40), "Q: hours? A: 9-5");
    }

    #[test]
    fn sort_bots_by_name_descending() {
        let mut bots = vec![
            bot(1, "beta", None),
            bot(2, "Alpha", None),
            bot(3, "gamma", None),
        ];
        sort_bots(&mut bots, BotSortKey::Name, SortOrder::Descending);
        let names: Vec<&str> = bots.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn sort_bots_missing_description_first() {
        let mut bots = vec![bot(1, "a", Some("zzz")), bot(2, "b", None)];
        sort_bots(&mut bots, BotSortKey::Description, SortOrder::Ascending);
        assert_eq!(bots[0].id, BotId(2));
    }

    #[test]
    fn sort_entries_by_bot_keeps_id_order_within_bot() {
        let mut entries = vec![entry(1, 2, "a"), entry(2, 1, "b"), entry(3, 2, "c")];
        sort_entries(&mut entries, EntrySortKey::BotId, SortOrder::Ascending);
        let ids: Vec<i64> = entries.iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn tables_render_rows() {
        let rendered = bots_table(&[bot(1, "Helper", Some("FAQ bot"))], &BotSortKey::ALL).to_string();
        assert!(rendered.contains("Helper"));
        assert!(rendered.contains("FAQ bot"));

        let rendered =
            entries_table(&[entry(1, 1, "Q: hours? A: 9-5")], &EntrySortKey::ALL).to_string();
        assert!(rendered.contains("Q: hours? A: 9-5"));
    }

    #[test]
    fn visible_columns_always_keep_id() {
        let (columns, id_dropped) = visible_columns(&BotSortKey::ALL, &[2], BotSortKey::Id);
        assert_eq!(columns, vec![BotSortKey::Id, BotSortKey::Description]);
        assert!(id_dropped);

        let (columns, id_dropped) =
            visible_columns(&EntrySortKey::ALL, &[3, 0], EntrySortKey::Id);
        assert_eq!(columns, vec![EntrySortKey::Id, EntrySortKey::Metadata]);
        assert!(!id_dropped);
    }

    #[test]
    fn reduced_column_set_hides_other_fields() {
        let bots = [bot(7, "Helper", Some("FAQ bot"))];
        let (columns, _) = visible_columns(&BotSortKey::ALL, &[1], BotSortKey::Id);
        let rendered = bots_table(&bots, &columns).to_string();
        assert!(rendered.contains("ID"));
        assert!(rendered.contains("Helper"));
        assert!(!rendered.contains("Description"));
        assert!(!rendered.contains("FAQ bot"));

        let mut with_meta = entry(1, 2, "Q: hours? A: 9-5");
        with_meta.metadata = Some("tag:faq".to_string());
        let rendered = entries_table(&[with_meta], &[EntrySortKey::Id, EntrySortKey::Metadata])
            .to_string();
        assert!(rendered.contains("tag:faq"));
        assert!(!rendered.contains("Q: hours?"));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let msg = error_message(&RecordError::not_found(RecordKind::Bot, 4));
        assert_eq!(msg, "No bot with id 4 exists. It may have been deleted.");

        let msg = error_message(&RecordError::validation("name", "name cannot be empty"));
        assert_eq!(msg, "Invalid name: name cannot be empty");
    }

    #[test]
    fn labels() {
        assert_eq!(bot_label(&bot(3, "Helper", None)), "#3 Helper");
        assert_eq!(entry_label(&entry(1, 3, "text")), "#1 (bot 3) text");
    }
}
