use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use cesta_core::models::MealSlot;
use cesta_core::service::PlannerService;

use super::helpers::{day_name, parse_day, truncate};

pub(crate) fn cmd_plan_set(
    svc: &PlannerService,
    plan: &str,
    day: &str,
    slot: &str,
    recipe_id: &str,
    json: bool,
) -> Result<()> {
    let day = parse_day(day)?;
    let slot = MealSlot::parse(slot)?;

    svc.set_cell(plan, day, slot, Some(recipe_id))?;
    let recipe = svc.recipe_for_cell(plan, day, slot)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "day": day,
                "slot": slot,
                "recipe": recipe,
            })
        );
    } else {
        let name = recipe.map_or_else(|| recipe_id.to_string(), |r| r.name);
        println!("{} {slot}: {name}", day_name(day));
    }
    Ok(())
}

pub(crate) fn cmd_plan_clear(
    svc: &PlannerService,
    plan: &str,
    day: &str,
    slot: &str,
    json: bool,
) -> Result<()> {
    let day = parse_day(day)?;
    let slot = MealSlot::parse(slot)?;

    svc.set_cell(plan, day, slot, None)?;

    if json {
        println!("{}", serde_json::json!({ "day": day, "slot": slot, "cleared": true }));
    } else {
        println!("Cleared {} {slot}", day_name(day));
    }
    Ok(())
}

pub(crate) fn cmd_plan_clear_all(svc: &PlannerService, plan: &str, json: bool) -> Result<()> {
    let cleared = svc.clear_plan(plan)?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("Week cleared");
    } else {
        eprintln!("Nothing was planned");
    }
    Ok(())
}

pub(crate) fn cmd_plan_show(svc: &PlannerService, plan: &str, json: bool) -> Result<()> {
    let week = svc.week(plan)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
        return Ok(());
    }

    if week.filled_cells() == 0 {
        eprintln!("Nothing planned yet. Use `cesta plan set <day> <slot> <recipe-id>`.");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Day")]
        day: &'static str,
        #[tabled(rename = "Breakfast")]
        breakfast: String,
        #[tabled(rename = "Lunch")]
        lunch: String,
        #[tabled(rename = "Dinner")]
        dinner: String,
        #[tabled(rename = "Snack")]
        snack: String,
        #[tabled(rename = "Kcal")]
        kcal: String,
    }

    let cell = |day: &cesta_core::models::DayPlan, slot: MealSlot| -> String {
        day.meals
            .iter()
            .find(|m| m.slot == slot)
            .and_then(|m| m.recipe.as_ref())
            .map(|r| truncate(&r.name, 22))
            .unwrap_or_else(|| "-".to_string())
    };

    let rows: Vec<DayRow> = week
        .days
        .iter()
        .map(|d| DayRow {
            day: day_name(d.day),
            breakfast: cell(d, MealSlot::Breakfast),
            lunch: cell(d, MealSlot::Lunch),
            dinner: cell(d, MealSlot::Dinner),
            snack: cell(d, MealSlot::Snack),
            kcal: if d.total_calories > 0.0 {
                let kcal = d.total_calories;
                format!("{kcal:.0}")
            } else {
                String::new()
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    // Client notes ride below the grid, once per planned recipe
    for d in &week.days {
        for m in &d.meals {
            if let (Some(recipe), Some(notes)) = (&m.recipe, &m.notes) {
                let slot = m.slot;
                let name = &recipe.name;
                println!("  Note ({} {slot}, {name}): {notes}", day_name(d.day));
            }
        }
    }

    Ok(())
}

pub(crate) fn cmd_plan_calories(
    svc: &PlannerService,
    plan: &str,
    day: &str,
    json: bool,
) -> Result<()> {
    let day = parse_day(day)?;
    let total = svc.daily_calories(plan, day)?;

    if json {
        println!("{}", serde_json::json!({ "day": day, "calories": total }));
    } else {
        println!("{}: {total:.0} kcal", day_name(day));
    }
    Ok(())
}
