use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

/// Embedded store for planner grids and shopping checklists.
///
/// Each plan owns at most one grid row and one checklist row; the payload is
/// a flat JSON document replaced whole on every write (last write wins).
/// Reads are fail-open: a missing, corrupt, or mistyped document degrades to
/// an empty one so a bad record can never block rendering.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS plan_grids (
                    plan_id TEXT PRIMARY KEY,
                    cells TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS checklists (
                    plan_id TEXT PRIMARY KEY,
                    items TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Grid records ---

    /// Load a plan's grid: `"<day>-<slot>" -> recipeId`. Absent keys mean
    /// unassigned cells.
    pub fn load_grid(&self, plan_id: &str) -> Result<BTreeMap<String, String>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT cells FROM plan_grids WHERE plan_id = ?1",
                params![plan_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(doc.as_deref().map(decode_string_map).unwrap_or_default())
    }

    pub fn save_grid(&self, plan_id: &str, cells: &BTreeMap<String, String>) -> Result<()> {
        let doc = serde_json::to_string(cells)?;
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO plan_grids (plan_id, cells, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(plan_id) DO UPDATE SET cells = excluded.cells, updated_at = excluded.updated_at",
            params![plan_id, doc, now],
        )?;
        Ok(())
    }

    /// Drop the plan's grid record entirely. Returns whether one existed.
    pub fn clear_grid(&self, plan_id: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM plan_grids WHERE plan_id = ?1",
            params![plan_id],
        )?;
        Ok(n > 0)
    }

    // --- Checklist records ---

    /// Load a plan's checklist: normalized item key -> checked flag.
    pub fn load_checklist(&self, plan_id: &str) -> Result<BTreeMap<String, bool>> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT items FROM checklists WHERE plan_id = ?1",
                params![plan_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(doc.as_deref().map(decode_bool_map).unwrap_or_default())
    }

    pub fn save_checklist(&self, plan_id: &str, items: &BTreeMap<String, bool>) -> Result<()> {
        let doc = serde_json::to_string(items)?;
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO checklists (plan_id, items, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(plan_id) DO UPDATE SET items = excluded.items, updated_at = excluded.updated_at",
            params![plan_id, doc, now],
        )?;
        Ok(())
    }

    /// Drop the plan's checklist record entirely. Returns whether one existed.
    pub fn clear_checklist(&self, plan_id: &str) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM checklists WHERE plan_id = ?1",
            params![plan_id],
        )?;
        Ok(n > 0)
    }
}

/// Fail-open decode of a flat `key -> string` document. Entries whose value
/// has the wrong type are dropped; an undecodable document is an empty one.
fn decode_string_map(doc: &str) -> BTreeMap<String, String> {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str(doc) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect()
}

/// Fail-open decode of a flat `key -> bool` document.
fn decode_bool_map(doc: &str) -> BTreeMap<String, bool> {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str(doc) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Bool(b) => Some((k, b)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_grid_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let cells = grid_of(&[("0-breakfast", "r1"), ("3-dinner", "r2")]);

        db.save_grid("plan-a", &cells).unwrap();
        assert_eq!(db.load_grid("plan-a").unwrap(), cells);
    }

    #[test]
    fn test_missing_grid_is_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_grid("never-seen").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_whole_document() {
        let db = Database::open_in_memory().unwrap();
        db.save_grid("p", &grid_of(&[("0-breakfast", "r1"), ("1-lunch", "r2")]))
            .unwrap();
        db.save_grid("p", &grid_of(&[("0-breakfast", "r3")])).unwrap();

        let loaded = db.load_grid("p").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("0-breakfast").map(String::as_str), Some("r3"));
    }

    #[test]
    fn test_plans_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        db.save_grid("a", &grid_of(&[("0-breakfast", "r1")])).unwrap();
        db.save_grid("b", &grid_of(&[("6-snack", "r2")])).unwrap();

        assert_eq!(db.load_grid("a").unwrap().len(), 1);
        assert_eq!(
            db.load_grid("b").unwrap().get("6-snack").map(String::as_str),
            Some("r2")
        );
    }

    #[test]
    fn test_corrupt_grid_reads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO plan_grids (plan_id, cells, updated_at) VALUES ('p', 'not json {', '')",
                [],
            )
            .unwrap();
        assert!(db.load_grid("p").unwrap().is_empty());
    }

    #[test]
    fn test_mistyped_grid_entries_are_dropped() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO plan_grids (plan_id, cells, updated_at)
                 VALUES ('p', '{\"0-breakfast\":\"r1\",\"1-lunch\":42,\"junk\":null}', '')",
                [],
            )
            .unwrap();
        let loaded = db.load_grid("p").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("0-breakfast").map(String::as_str), Some("r1"));
    }

    #[test]
    fn test_clear_grid() {
        let db = Database::open_in_memory().unwrap();
        db.save_grid("p", &grid_of(&[("0-breakfast", "r1")])).unwrap();

        assert!(db.clear_grid("p").unwrap());
        assert!(db.load_grid("p").unwrap().is_empty());
        // Clearing again reports nothing was there
        assert!(!db.clear_grid("p").unwrap());
    }

    #[test]
    fn test_checklist_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let mut items = BTreeMap::new();
        items.insert("huevo-unidad".to_string(), true);
        items.insert("leche-ml".to_string(), false);

        db.save_checklist("p", &items).unwrap();
        assert_eq!(db.load_checklist("p").unwrap(), items);
    }

    #[test]
    fn test_corrupt_checklist_reads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO checklists (plan_id, items, updated_at) VALUES ('p', '[1,2,3]', '')",
                [],
            )
            .unwrap();
        assert!(db.load_checklist("p").unwrap().is_empty());
    }

    #[test]
    fn test_mistyped_checklist_entries_are_dropped() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO checklists (plan_id, items, updated_at)
                 VALUES ('p', '{\"huevo-unidad\":true,\"leche-ml\":\"yes\"}', '')",
                [],
            )
            .unwrap();
        let loaded = db.load_checklist("p").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("huevo-unidad"), Some(&true));
    }

    #[test]
    fn test_clear_checklist() {
        let db = Database::open_in_memory().unwrap();
        let mut items = BTreeMap::new();
        items.insert("huevo-unidad".to_string(), true);
        db.save_checklist("p", &items).unwrap();

        assert!(db.clear_checklist("p").unwrap());
        assert!(db.load_checklist("p").unwrap().is_empty());
        assert!(!db.clear_checklist("p").unwrap());
    }

    #[test]
    fn test_grid_and_checklist_do_not_touch_each_other() {
        let db = Database::open_in_memory().unwrap();
        db.save_grid("p", &grid_of(&[("0-breakfast", "r1")])).unwrap();
        let mut items = BTreeMap::new();
        items.insert("huevo-unidad".to_string(), true);
        db.save_checklist("p", &items).unwrap();

        db.clear_grid("p").unwrap();
        assert_eq!(db.load_checklist("p").unwrap().get("huevo-unidad"), Some(&true));
    }
}
