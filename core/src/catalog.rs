use std::collections::HashMap;

use crate::models::{MealSlot, Recipe, RecipeOverride};

/// The recipe catalog for the active plan, plus the client's override map.
///
/// Both collections are supplied by the caller and held in memory; this
/// crate never loads them itself. Lookups resolve through the override map,
/// so a recipe handed out by the catalog is always the client's view of it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
    index: HashMap<String, usize>,
    overrides: HashMap<String, RecipeOverride>,
}

impl Catalog {
    #[must_use]
    pub fn new(recipes: Vec<Recipe>, overrides: HashMap<String, RecipeOverride>) -> Self {
        let index = recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Catalog {
            recipes,
            index,
            overrides,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Look up a recipe by id and apply the client's override, if any.
    /// Returns `None` when the id is not in the catalog; a stored assignment
    /// pointing at such an id is treated as an empty cell, never an error.
    #[must_use]
    pub fn resolve(&self, recipe_id: &str) -> Option<Recipe> {
        let base = self.recipes.get(*self.index.get(recipe_id)?)?;
        Some(match self.overrides.get(recipe_id) {
            Some(over) => over.apply(base),
            None => base.clone(),
        })
    }

    /// All recipes in catalog order, overrides applied.
    #[must_use]
    pub fn all(&self) -> Vec<Recipe> {
        self.recipes
            .iter()
            .map(|r| match self.overrides.get(&r.id) {
                Some(over) => over.apply(r),
                None => r.clone(),
            })
            .collect()
    }

    /// Recipes eligible for a given slot, overrides applied, catalog order.
    #[must_use]
    pub fn recipes_in(&self, category: MealSlot) -> Vec<Recipe> {
        self.all()
            .into_iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// The client's free-form note attached to a recipe, if any. Notes ride
    /// on the override record but never replace a recipe field.
    #[must_use]
    pub fn override_notes(&self, recipe_id: &str) -> Option<&str> {
        self.overrides.get(recipe_id)?.notes.as_deref()
    }
}
