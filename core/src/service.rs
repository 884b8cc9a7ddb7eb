use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::db::Database;
use crate::models::{
    DAYS_PER_WEEK, DayPlan, MealSlot, PlanError, PlannedMeal, Recipe, ShoppingSection, WeekPlan,
    cell_key, validate_day,
};
use crate::shopping;

/// Facade over the planner grid, the derived shopping list, and the
/// purchased checklist for one client.
///
/// The grid and checklist are persisted per plan id; the catalog and
/// override map live in memory for the lifetime of the service. Everything
/// here is synchronous: each call reads, computes, writes, and returns.
pub struct PlannerService {
    db: Database,
    catalog: Catalog,
}

impl PlannerService {
    pub fn new(db_path: &Path, catalog: Catalog) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db, catalog })
    }

    pub fn new_in_memory(catalog: Catalog) -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db, catalog })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // --- Planner grid ---

    /// Assign a recipe to a cell, or clear it with `None`.
    ///
    /// The write is refused (and the grid left untouched) when the day is out
    /// of range, the recipe id is not in the catalog, or the recipe's
    /// category does not match the slot — see [`PlanError`]. Clearing always
    /// succeeds.
    pub fn set_cell(
        &self,
        plan_id: &str,
        day: u8,
        slot: MealSlot,
        recipe_id: Option<&str>,
    ) -> Result<()> {
        validate_day(day)?;
        let mut cells = self.db.load_grid(plan_id)?;
        let key = cell_key(day, slot);
        match recipe_id {
            Some(id) => {
                let recipe = self
                    .catalog
                    .resolve(id)
                    .ok_or_else(|| PlanError::UnknownRecipe(id.to_string()))?;
                if recipe.category != slot {
                    return Err(PlanError::CategoryMismatch {
                        name: recipe.name,
                        category: recipe.category,
                        slot,
                    }
                    .into());
                }
                cells.insert(key, id.to_string());
            }
            None => {
                cells.remove(&key);
            }
        }
        self.db.save_grid(plan_id, &cells)
    }

    /// The resolved recipe planned for a cell. `None` for empty cells and
    /// for stored ids that no longer resolve in the catalog.
    pub fn recipe_for_cell(
        &self,
        plan_id: &str,
        day: u8,
        slot: MealSlot,
    ) -> Result<Option<Recipe>> {
        validate_day(day)?;
        let cells = self.db.load_grid(plan_id)?;
        Ok(cells
            .get(&cell_key(day, slot))
            .and_then(|id| self.catalog.resolve(id)))
    }

    /// Wipe the plan's entire grid in one operation. The checklist is not
    /// touched: checked items survive until explicitly reset.
    pub fn clear_plan(&self, plan_id: &str) -> Result<bool> {
        self.db.clear_grid(plan_id)
    }

    /// Calorie total for one day: the sum over the four slots of the
    /// resolved recipe's calories, with empty cells, dangling ids, and
    /// recipes without calorie data all counting 0.
    pub fn daily_calories(&self, plan_id: &str, day: u8) -> Result<f64> {
        validate_day(day)?;
        let cells = self.db.load_grid(plan_id)?;
        Ok(MealSlot::ALL
            .iter()
            .map(|&slot| {
                cells
                    .get(&cell_key(day, slot))
                    .and_then(|id| self.catalog.resolve(id))
                    .and_then(|r| r.calories)
                    .unwrap_or(0.0)
            })
            .sum())
    }

    /// The whole week resolved for display: per day, the four slots with
    /// their recipes and client notes, plus the day's calorie total.
    pub fn week(&self, plan_id: &str) -> Result<WeekPlan> {
        let cells = self.db.load_grid(plan_id)?;
        let days = (0..DAYS_PER_WEEK)
            .map(|day| {
                let meals: Vec<PlannedMeal> = MealSlot::ALL
                    .iter()
                    .map(|&slot| {
                        let stored = cells.get(&cell_key(day, slot));
                        let recipe = stored.and_then(|id| self.catalog.resolve(id));
                        let notes = match (&recipe, stored) {
                            (Some(_), Some(id)) => {
                                self.catalog.override_notes(id).map(str::to_string)
                            }
                            _ => None,
                        };
                        PlannedMeal {
                            slot,
                            recipe,
                            notes,
                        }
                    })
                    .collect();
                let total_calories = meals
                    .iter()
                    .filter_map(|m| m.recipe.as_ref().and_then(|r| r.calories))
                    .sum();
                DayPlan {
                    day,
                    meals,
                    total_calories,
                }
            })
            .collect();
        Ok(WeekPlan { days })
    }

    // --- Shopping list ---

    /// The sectioned, quantity-summed shopping list derived from the current
    /// grid. Recomputed on every call.
    pub fn shopping_list(&self, plan_id: &str) -> Result<Vec<ShoppingSection>> {
        let cells = self.db.load_grid(plan_id)?;
        Ok(shopping::aggregate(&cells, &self.catalog))
    }

    // --- Checklist ---

    /// Flip an item's checked flag (unseen items start unchecked) and return
    /// the new state.
    pub fn toggle_item(&self, plan_id: &str, item_key: &str) -> Result<bool> {
        let mut items = self.db.load_checklist(plan_id)?;
        let checked = !items.get(item_key).copied().unwrap_or(false);
        items.insert(item_key.to_string(), checked);
        self.db.save_checklist(plan_id, &items)?;
        Ok(checked)
    }

    pub fn is_checked(&self, plan_id: &str, item_key: &str) -> Result<bool> {
        let items = self.db.load_checklist(plan_id)?;
        Ok(items.get(item_key).copied().unwrap_or(false))
    }

    /// The full checked-state map, for overlaying onto a rendered list in
    /// one read. May contain keys no longer present in the aggregation;
    /// such orphans are kept until the key reappears or the checklist is
    /// reset.
    pub fn checklist(&self, plan_id: &str) -> Result<BTreeMap<String, bool>> {
        self.db.load_checklist(plan_id)
    }

    /// Clear every checked flag for the plan.
    pub fn reset_checklist(&self, plan_id: &str) -> Result<bool> {
        self.db.clear_checklist(plan_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{Ingredient, RecipeOverride};

    const PLAN: &str = "plan-test";

    fn ingredient(name: &str, quantity: f64, unit: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            section: None,
        }
    }

    fn recipe(id: &str, category: MealSlot, name: &str, calories: Option<f64>) -> Recipe {
        Recipe {
            id: id.to_string(),
            category,
            name: name.to_string(),
            ingredients: vec![ingredient("huevo", 2.0, "unidad")],
            preparation: None,
            calories,
            protein: None,
            carbs: None,
            fat: None,
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(
            vec![
                recipe("des-1", MealSlot::Breakfast, "Tortilla", Some(220.0)),
                recipe("com-1", MealSlot::Lunch, "Lentejas", Some(450.0)),
                recipe("cen-1", MealSlot::Dinner, "Merluza al horno", Some(380.0)),
                recipe("sna-1", MealSlot::Snack, "Yogur con nueces", None),
            ],
            HashMap::new(),
        )
    }

    fn service() -> PlannerService {
        PlannerService::new_in_memory(sample_catalog()).unwrap()
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let svc = service();
        svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();

        let recipe = svc.recipe_for_cell(PLAN, 0, MealSlot::Breakfast).unwrap().unwrap();
        assert_eq!(recipe.id, "des-1");
        assert_eq!(recipe.name, "Tortilla");
    }

    #[test]
    fn test_empty_cell_reads_none() {
        let svc = service();
        assert!(svc.recipe_for_cell(PLAN, 3, MealSlot::Dinner).unwrap().is_none());
    }

    #[test]
    fn test_category_mismatch_is_a_noop() {
        let svc = service();
        svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();
        let before = svc.db.load_grid(PLAN).unwrap();

        let err = svc
            .set_cell(PLAN, 0, MealSlot::Dinner, Some("des-1"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::CategoryMismatch { .. })
        ));

        // Grid is unchanged, byte for byte
        assert_eq!(svc.db.load_grid(PLAN).unwrap(), before);
        assert!(svc.recipe_for_cell(PLAN, 0, MealSlot::Dinner).unwrap().is_none());
    }

    #[test]
    fn test_unknown_recipe_is_rejected() {
        let svc = service();
        let err = svc
            .set_cell(PLAN, 0, MealSlot::Breakfast, Some("ghost"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::UnknownRecipe(_))
        ));
        assert!(svc.db.load_grid(PLAN).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_day_is_rejected() {
        let svc = service();
        let err = svc
            .set_cell(PLAN, 7, MealSlot::Breakfast, Some("des-1"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::InvalidDay(7))
        ));
    }

    #[test]
    fn test_clearing_a_cell_always_succeeds() {
        let svc = service();
        svc.set_cell(PLAN, 2, MealSlot::Lunch, Some("com-1")).unwrap();
        svc.set_cell(PLAN, 2, MealSlot::Lunch, None).unwrap();
        assert!(svc.recipe_for_cell(PLAN, 2, MealSlot::Lunch).unwrap().is_none());

        // Clearing an already-empty cell is fine too
        svc.set_cell(PLAN, 2, MealSlot::Lunch, None).unwrap();
    }

    #[test]
    fn test_daily_calories_sums_resolved_slots() {
        let svc = service();
        svc.set_cell(PLAN, 1, MealSlot::Breakfast, Some("des-1")).unwrap();
        svc.set_cell(PLAN, 1, MealSlot::Lunch, Some("com-1")).unwrap();
        // Snack recipe has no calorie data; counts as 0
        svc.set_cell(PLAN, 1, MealSlot::Snack, Some("sna-1")).unwrap();

        let total = svc.daily_calories(PLAN, 1).unwrap();
        assert!((total - 670.0).abs() < f64::EPSILON);
        // A day with nothing planned totals 0
        assert!((svc.daily_calories(PLAN, 5).unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_repeated_recipe_doubles_shopping_quantities() {
        let svc = service();
        svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();
        svc.set_cell(PLAN, 1, MealSlot::Breakfast, Some("des-1")).unwrap();

        let sections = svc.shopping_list(PLAN).unwrap();
        assert_eq!(shopping::item_count(&sections), 1);
        let item = &sections[0].items[0];
        assert_eq!(item.key, "huevo-unidad");
        assert_eq!(item.unit, "unidad");
        assert_eq!(item.quantity, 4.0);
    }

    #[test]
    fn test_removed_recipe_vanishes_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cesta.db");

        {
            let svc = PlannerService::new(&db_path, sample_catalog()).unwrap();
            svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();
            svc.set_cell(PLAN, 0, MealSlot::Lunch, Some("com-1")).unwrap();
        }

        // Same store, new session with a catalog that no longer has des-1
        let thinner = Catalog::new(
            vec![recipe("com-1", MealSlot::Lunch, "Lentejas", Some(450.0))],
            HashMap::new(),
        );
        let svc = PlannerService::new(&db_path, thinner).unwrap();

        assert!(svc.recipe_for_cell(PLAN, 0, MealSlot::Breakfast).unwrap().is_none());
        let sections = svc.shopping_list(PLAN).unwrap();
        assert_eq!(shopping::item_count(&sections), 1);
        // The surviving recipe's eggs, once — no partial entry for des-1
        assert_eq!(sections[0].items[0].quantity, 2.0);
        // The dangling assignment still counts 0 calories, not an error
        assert!((svc.daily_calories(PLAN, 0).unwrap() - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let svc = service();
        assert!(!svc.is_checked(PLAN, "huevo-unidad").unwrap());
        assert!(svc.toggle_item(PLAN, "huevo-unidad").unwrap());
        assert!(svc.is_checked(PLAN, "huevo-unidad").unwrap());
        assert!(!svc.toggle_item(PLAN, "huevo-unidad").unwrap());
        assert!(!svc.is_checked(PLAN, "huevo-unidad").unwrap());
    }

    #[test]
    fn test_clear_all_keeps_checklist_orphans() {
        let svc = service();
        svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();
        svc.toggle_item(PLAN, "huevo-unidad").unwrap();

        assert!(svc.clear_plan(PLAN).unwrap());

        // List is empty, but the checked flag is retained as an orphan
        assert!(svc.shopping_list(PLAN).unwrap().is_empty());
        assert!(svc.is_checked(PLAN, "huevo-unidad").unwrap());

        // Re-planning the same recipe re-attaches the orphaned flag
        svc.set_cell(PLAN, 4, MealSlot::Breakfast, Some("des-1")).unwrap();
        let sections = svc.shopping_list(PLAN).unwrap();
        assert_eq!(sections[0].items[0].key, "huevo-unidad");
        assert!(svc.is_checked(PLAN, "huevo-unidad").unwrap());
    }

    #[test]
    fn test_reset_checklist() {
        let svc = service();
        svc.toggle_item(PLAN, "huevo-unidad").unwrap();
        svc.toggle_item(PLAN, "leche-ml").unwrap();

        assert!(svc.reset_checklist(PLAN).unwrap());
        assert!(svc.checklist(PLAN).unwrap().is_empty());
        assert!(!svc.is_checked(PLAN, "huevo-unidad").unwrap());
    }

    #[test]
    fn test_week_view() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "des-1".to_string(),
            RecipeOverride {
                notes: Some("Solo claras".to_string()),
                ..RecipeOverride::default()
            },
        );
        let catalog = Catalog::new(
            vec![
                recipe("des-1", MealSlot::Breakfast, "Tortilla", Some(220.0)),
                recipe("com-1", MealSlot::Lunch, "Lentejas", Some(450.0)),
            ],
            overrides,
        );
        let svc = PlannerService::new_in_memory(catalog).unwrap();
        svc.set_cell(PLAN, 0, MealSlot::Breakfast, Some("des-1")).unwrap();
        svc.set_cell(PLAN, 0, MealSlot::Lunch, Some("com-1")).unwrap();

        let week = svc.week(PLAN).unwrap();
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.filled_cells(), 2);

        let monday = &week.days[0];
        assert!((monday.total_calories - 670.0).abs() < f64::EPSILON);
        let breakfast = &monday.meals[0];
        assert_eq!(breakfast.slot, MealSlot::Breakfast);
        assert_eq!(breakfast.recipe.as_ref().unwrap().name, "Tortilla");
        assert_eq!(breakfast.notes.as_deref(), Some("Solo claras"));

        let tuesday = &week.days[1];
        assert!(tuesday.meals.iter().all(|m| m.recipe.is_none()));
        assert!((tuesday.total_calories - 0.0).abs() < f64::EPSILON);
    }
}
