mod catalog;
mod check;
mod helpers;
mod plan;
mod shopping;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use cesta_core::catalog::Catalog;
use cesta_core::models::{Recipe, RecipeOverride};

pub(crate) use catalog::{cmd_catalog_list, cmd_catalog_show};
pub(crate) use check::{cmd_check_reset, cmd_check_toggle};
pub(crate) use plan::{
    cmd_plan_calories, cmd_plan_clear, cmd_plan_clear_all, cmd_plan_set, cmd_plan_show,
};
pub(crate) use shopping::{cmd_shopping_export, cmd_shopping_list};

/// Load the recipe catalog and the client's override map from JSON files.
/// The catalog is required; the override file is optional and an absent one
/// simply means no customizations.
pub(crate) fn load_catalog(catalog_path: &Path, overrides_path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(catalog_path).with_context(|| {
        format!(
            "Failed to read catalog {} (provide --catalog or place catalog.json in the data directory)",
            catalog_path.display()
        )
    })?;
    let recipes: Vec<Recipe> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid catalog JSON: {}", catalog_path.display()))?;

    let overrides: HashMap<String, RecipeOverride> = if overrides_path.exists() {
        let raw = std::fs::read_to_string(overrides_path)
            .with_context(|| format!("Failed to read overrides: {}", overrides_path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid overrides JSON: {}", overrides_path.display()))?
    } else {
        HashMap::new()
    };

    Ok(Catalog::new(recipes, overrides))
}
