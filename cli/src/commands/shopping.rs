use std::fs::File;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use serde::Serialize;

use cesta_core::service::PlannerService;
use cesta_core::shopping::{format_quantity, item_count, write_csv};

pub(crate) fn cmd_shopping_list(svc: &PlannerService, plan: &str, json: bool) -> Result<()> {
    let sections = svc.shopping_list(plan)?;
    let checks = svc.checklist(plan)?;

    if json {
        #[derive(Serialize)]
        struct ItemOut<'a> {
            key: &'a str,
            name: &'a str,
            quantity: f64,
            unit: &'a str,
            checked: bool,
        }
        #[derive(Serialize)]
        struct SectionOut<'a> {
            section: &'static str,
            items: Vec<ItemOut<'a>>,
        }

        let out: Vec<SectionOut> = sections
            .iter()
            .map(|s| SectionOut {
                section: s.section.label(),
                items: s
                    .items
                    .iter()
                    .map(|i| ItemOut {
                        key: &i.key,
                        name: &i.name,
                        quantity: i.quantity,
                        unit: &i.unit,
                        checked: checks.get(&i.key).copied().unwrap_or(false),
                    })
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if sections.is_empty() {
        eprintln!("Nothing planned yet. Use `cesta plan set` to fill the week first.");
        process::exit(2);
    }

    let total = item_count(&sections);
    let mut checked_count = 0usize;

    for section in &sections {
        let label = section.section.label().to_uppercase();
        let n = section.items.len();
        println!("{label} ({n} items)");
        for item in &section.items {
            let checked = checks.get(&item.key).copied().unwrap_or(false);
            if checked {
                checked_count += 1;
            }
            let mark = if checked { "x" } else { " " };
            let name = &item.name;
            if item.quantity > 0.0 {
                let qty = format_quantity(item.quantity);
                let unit = &item.unit;
                println!("  [{mark}] {name} — {qty} {unit}");
            } else {
                println!("  [{mark}] {name}");
            }
        }
        println!();
    }

    println!("  {total} items, {checked_count} checked");
    Ok(())
}

pub(crate) fn cmd_shopping_export(svc: &PlannerService, plan: &str, file: &Path) -> Result<()> {
    let sections = svc.shopping_list(plan)?;

    if sections.is_empty() {
        eprintln!("Nothing planned yet. Use `cesta plan set` to fill the week first.");
        process::exit(2);
    }

    let out = File::create(file)
        .with_context(|| format!("Failed to create file: {}", file.display()))?;
    write_csv(&sections, out)?;

    let total = item_count(&sections);
    println!("Exported {total} items to {}", file.display());
    Ok(())
}
