//! Commands listing implementation.

use console::style;
use glide_go_core::{CommandCategory, CommandDefinition};
use glide_go_engine::Catalogue;
use miette::Result;

use crate::output;

/// Lists the catalogue, grouped by category.
pub fn execute(category: Option<CommandCategory>) -> Result<()> {
    let catalogue = Catalogue::go();

    if catalogue.is_empty() {
        output::info("This build ships no commands (detection only)");
        return Ok(());
    }

    println!("{}", style("Available commands:").bold());

    for (category, entries) in grouped(&catalogue, category) {
        output::section_header(category.as_str());
        for (name, definition) in entries {
            output::command(name, &definition.cmd, &definition.description);
        }
    }

    Ok(())
}

/// Non-empty groups in category order, optionally narrowed to one category.
fn grouped(
    catalogue: &Catalogue,
    only: Option<CommandCategory>,
) -> Vec<(CommandCategory, Vec<(&str, &CommandDefinition)>)> {
    CommandCategory::ALL
        .into_iter()
        .filter(|category| only.is_none_or(|only| only == *category))
        .map(|category| (category, catalogue.by_category(category)))
        .filter(|(_, entries)| !entries.is_empty())
        .collect()
}
