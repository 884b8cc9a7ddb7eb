use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::classify::classify;
use crate::models::{Section, ShoppingItem, ShoppingSection, item_key};

/// Build the sectioned shopping list for the given grid assignments.
///
/// Every ingredient of every assigned recipe is accumulated under its
/// normalized `(name, unit)` key, scaled by how many cells the recipe
/// occupies. Assignments whose recipe is no longer in the catalog contribute
/// nothing. The result is rebuilt from scratch on each call; nothing is
/// cached across grid mutations.
#[must_use]
pub fn aggregate(cells: &BTreeMap<String, String>, catalog: &Catalog) -> Vec<ShoppingSection> {
    // Occurrence count per recipe across the whole week
    let mut frequency: HashMap<&str, u32> = HashMap::new();
    for id in cells.values() {
        *frequency.entry(id.as_str()).or_insert(0) += 1;
    }

    // Walk recipes in catalog order so the first-seen display spelling of a
    // shared key is deterministic.
    let mut items: HashMap<String, ShoppingItem> = HashMap::new();
    for recipe in catalog.all() {
        let Some(&count) = frequency.get(recipe.id.as_str()) else {
            continue;
        };
        for ing in &recipe.ingredients {
            let key = item_key(&ing.name, &ing.unit);
            let scaled = ing.quantity * f64::from(count);
            if let Some(existing) = items.get_mut(&key) {
                existing.quantity += scaled;
            } else {
                let section = ing.section.unwrap_or_else(|| classify(&ing.name));
                items.insert(
                    key.clone(),
                    ShoppingItem {
                        key,
                        name: ing.name.trim().to_string(),
                        quantity: scaled,
                        unit: ing.unit.clone(),
                        section,
                    },
                );
            }
        }
    }

    let mut items: Vec<ShoppingItem> = items.into_values().collect();
    let mut sections = Vec::new();
    for &section in &Section::SHOP_ORDER {
        let mut group: Vec<ShoppingItem> = Vec::new();
        items.retain(|item| {
            if item.section == section {
                group.push(item.clone());
                false
            } else {
                true
            }
        });
        if group.is_empty() {
            continue;
        }
        group.sort_by(|a, b| a.name.cmp(&b.name));
        sections.push(ShoppingSection {
            section,
            items: group,
        });
    }
    sections
}

/// Total number of entries across all sections.
#[must_use]
pub fn item_count(sections: &[ShoppingSection]) -> usize {
    sections.iter().map(|s| s.items.len()).sum()
}

/// Format a quantity for display: one decimal, with a trailing `.0` dropped.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Write the sectioned list as CSV (`Section,Item,Quantity,Unit`).
pub fn write_csv<W: Write>(sections: &[ShoppingSection], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Section", "Item", "Quantity", "Unit"])?;
    for section in sections {
        for item in &section.items {
            let quantity = format_quantity(item.quantity);
            wtr.write_record([
                section.section.label(),
                item.name.as_str(),
                quantity.as_str(),
                item.unit.as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
