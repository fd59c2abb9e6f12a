pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Context, Result};
pub use std::format as f;

pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .padding(1, 1)
        .build();

    table.set_format(format);

    table
}

/// Heavy rule under report titles.
pub fn rule() -> String {
    "=".repeat(80)
}

/// Light rule under report sections.
pub fn thin_rule() -> String {
    "-".repeat(50)
}

/// Cut `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Fireball", 20), "Fireball");
        assert_eq!(truncate("Fireball", 4), "Fire...");
        assert_eq!(truncate("Épée", 3), "Épé...");
    }
}
