use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// One of the four fixed daily meal slots.
///
/// The same enum doubles as the recipe category: a recipe may only be
/// planned into the slot matching its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    /// The four slots in day order.
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    /// Parse a slot name, case-insensitively.
    pub fn parse(s: &str) -> Result<MealSlot> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" => Ok(MealSlot::Snack),
            _ => bail!("Invalid meal slot '{s}'. Must be one of: breakfast, lunch, dinner, snack"),
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-aisle grouping used to organize the shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    FreshProduce,
    Butchery,
    Fishmonger,
    Dairy,
    Pantry,
    Bakery,
    Frozen,
    Other,
}

impl Section {
    /// Display order for the rendered list: roughly the walk through a store.
    pub const SHOP_ORDER: [Section; 8] = [
        Section::FreshProduce,
        Section::Butchery,
        Section::Fishmonger,
        Section::Dairy,
        Section::Bakery,
        Section::Frozen,
        Section::Pantry,
        Section::Other,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Section::FreshProduce => "Fresh produce",
            Section::Butchery => "Butchery",
            Section::Fishmonger => "Fishmonger",
            Section::Dairy => "Dairy",
            Section::Pantry => "Pantry",
            Section::Bakery => "Bakery",
            Section::Frozen => "Frozen",
            Section::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

/// A recipe from the shared catalog. Read-only to this crate: client-level
/// customization happens through [`RecipeOverride`], never by mutating the
/// base recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub category: MealSlot,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// A client-specific patch layered onto a base recipe.
///
/// A field that is present replaces the base field wholesale; a field that is
/// absent leaves the base untouched. In particular the ingredient list is an
/// all-or-nothing replacement, never a per-element merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecipeOverride {
    /// Merge this override onto `base`, field by field. Presence decides:
    /// an override field set to an empty string or zero still wins.
    #[must_use]
    pub fn apply(&self, base: &Recipe) -> Recipe {
        let mut merged = base.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(ingredients) = &self.ingredients {
            merged.ingredients = ingredients.clone();
        }
        if let Some(preparation) = &self.preparation {
            merged.preparation = Some(preparation.clone());
        }
        if let Some(calories) = self.calories {
            merged.calories = Some(calories);
        }
        merged
    }
}

/// Days run 0 (Monday) through 6 (Sunday).
pub const DAYS_PER_WEEK: u8 = 7;

/// Validation and rejection conditions for planner writes. These are
/// refusals of a requested operation, not faults: the grid is untouched
/// when any of them is returned.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("'{name}' is a {category} recipe and cannot be planned as {slot}")]
    CategoryMismatch {
        name: String,
        category: MealSlot,
        slot: MealSlot,
    },
    #[error("no recipe '{0}' in the catalog")]
    UnknownRecipe(String),
    #[error("day must be between 0 (Monday) and 6 (Sunday), got {0}")]
    InvalidDay(u8),
}

pub fn validate_day(day: u8) -> Result<(), PlanError> {
    if day < DAYS_PER_WEEK {
        Ok(())
    } else {
        Err(PlanError::InvalidDay(day))
    }
}

/// Composite grid key for one cell: `"<day>-<slot>"`, e.g. `"0-breakfast"`.
#[must_use]
pub fn cell_key(day: u8, slot: MealSlot) -> String {
    format!("{day}-{slot}")
}

/// Normalized aggregation key for an ingredient: lowercased, trimmed name
/// plus the unit, e.g. `"huevo-unidad"`. Shared by the shopping list and the
/// checklist; the two stores never reference each other beyond this shape.
#[must_use]
pub fn item_key(name: &str, unit: &str) -> String {
    format!("{}-{}", name.trim().to_lowercase(), unit)
}

// --- Derived view types ---

/// One aggregated shopping list entry. Never persisted; rebuilt from the
/// grid and catalog on every read.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingItem {
    pub key: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub section: Section,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingSection {
    pub section: Section,
    pub items: Vec<ShoppingItem>,
}

/// One planned cell, resolved against the catalog. `recipe` is `None` for
/// empty cells and for assignments whose recipe has since left the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedMeal {
    pub slot: MealSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub day: u8,
    pub meals: Vec<PlannedMeal>,
    pub total_calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekPlan {
    pub days: Vec<DayPlan>,
}

impl WeekPlan {
    /// Number of cells with a resolvable recipe assigned.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| &d.meals)
            .filter(|m| m.recipe.is_some())
            .count()
    }
}
