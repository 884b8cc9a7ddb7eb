use anyhow::Result;

use cesta_core::service::PlannerService;

pub(crate) fn cmd_check_toggle(
    svc: &PlannerService,
    plan: &str,
    item: &str,
    json: bool,
) -> Result<()> {
    let checked = svc.toggle_item(plan, item)?;

    if json {
        println!("{}", serde_json::json!({ "item": item, "checked": checked }));
    } else if checked {
        println!("Checked '{item}'");
    } else {
        println!("Unchecked '{item}'");
    }
    Ok(())
}

pub(crate) fn cmd_check_reset(svc: &PlannerService, plan: &str, json: bool) -> Result<()> {
    let cleared = svc.reset_checklist(plan)?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("Checklist reset");
    } else {
        eprintln!("Checklist was already empty");
    }
    Ok(())
}
