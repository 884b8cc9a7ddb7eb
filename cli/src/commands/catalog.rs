use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use cesta_core::classify::classify;
use cesta_core::models::MealSlot;
use cesta_core::service::PlannerService;
use cesta_core::shopping::format_quantity;

use super::helpers::truncate;

pub(crate) fn cmd_catalog_list(
    svc: &PlannerService,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let recipes = match category {
        Some(c) => svc.catalog().recipes_in(MealSlot::parse(c)?),
        None => svc.catalog().all(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        eprintln!("No recipes found");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: &'static str,
        #[tabled(rename = "Kcal")]
        kcal: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.clone(),
            name: truncate(&r.name, 35),
            category: r.category.as_str(),
            kcal: r.calories.map_or("-".into(), |c| format!("{c:.0}")),
            ingredients: r.ingredients.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_catalog_show(svc: &PlannerService, recipe_id: &str, json: bool) -> Result<()> {
    let Some(recipe) = svc.catalog().resolve(recipe_id) else {
        bail!("No recipe '{recipe_id}' in the catalog");
    };
    let notes = svc.catalog().override_notes(recipe_id);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "recipe": recipe,
                "notes": notes,
            }))?
        );
        return Ok(());
    }

    let name = &recipe.name;
    let category = recipe.category;
    println!("=== {name} ({category}) ===");
    if let Some(cal) = recipe.calories {
        let p = recipe.protein.unwrap_or(0.0);
        let c = recipe.carbs.unwrap_or(0.0);
        let f = recipe.fat.unwrap_or(0.0);
        println!("  {cal:.0} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g");
    }
    println!();

    for ing in &recipe.ingredients {
        let section = ing.section.unwrap_or_else(|| classify(&ing.name));
        let label = section.label();
        let ing_name = &ing.name;
        if ing.quantity > 0.0 {
            let qty = format_quantity(ing.quantity);
            let unit = &ing.unit;
            println!("  - {ing_name} — {qty} {unit} ({label})");
        } else {
            println!("  - {ing_name} ({label})");
        }
    }

    if let Some(prep) = &recipe.preparation {
        println!("\n{prep}");
    }
    if let Some(notes) = notes {
        println!("\nNote: {notes}");
    }

    Ok(())
}
