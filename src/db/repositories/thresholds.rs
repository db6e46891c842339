use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, format_datetime, parse_category, parse_datetime},
    models::{threshold::validation, ThresholdConfig},
};
use crate::stores::ThresholdStore;

fn row_to_threshold(row: &Row) -> Result<ThresholdConfig, rusqlite::Error> {
    let category: String = row.get("category")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ThresholdConfig {
        category: parse_category(&category).map_err(conversion_error)?,
        min_value: row.get("min_value")?,
        max_value: row.get("max_value")?,
        updated_by: row.get("updated_by")?,
        updated_at: parse_datetime(&updated_at, "updated_at").map_err(conversion_error)?,
    })
}

#[async_trait]
impl ThresholdStore for Database {
    async fn get_all_thresholds(&self) -> Result<Vec<ThresholdConfig>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT category, min_value, max_value, updated_by, updated_at
                 FROM category_thresholds
                 ORDER BY min_value ASC",
            )?;

            let thresholds = stmt
                .query_map([], row_to_threshold)?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load thresholds")?;

            Ok(thresholds)
        })
        .await
    }

    async fn upsert_threshold(&self, threshold: ThresholdConfig) -> Result<ThresholdConfig> {
        validation::validate_range(threshold.min_value, threshold.max_value)?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO category_thresholds (category, min_value, max_value, updated_by, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(category) DO UPDATE SET
                     min_value = excluded.min_value,
                     max_value = excluded.max_value,
                     updated_by = excluded.updated_by,
                     updated_at = excluded.updated_at",
                params![
                    threshold.category.as_str(),
                    threshold.min_value,
                    threshold.max_value,
                    threshold.updated_by,
                    format_datetime(&threshold.updated_at),
                ],
            )
            .with_context(|| "failed to upsert threshold")?;

            let stored = conn.query_row(
                "SELECT category, min_value, max_value, updated_by, updated_at
                 FROM category_thresholds
                 WHERE category = ?1",
                params![threshold.category.as_str()],
                row_to_threshold,
            )?;

            Ok(stored)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::models::Category;

    #[tokio::test]
    async fn upsert_adds_borderline_and_replaces_normal() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("thresholds.sqlite3")).unwrap();

        db.upsert_threshold(ThresholdConfig {
            category: Category::Borderline,
            min_value: 131.0,
            max_value: 180.0,
            updated_by: Some("staff-1".into()),
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
        let normal = db
            .upsert_threshold(ThresholdConfig {
                category: Category::Normal,
                min_value: 72.0,
                max_value: 125.0,
                updated_by: Some("staff-1".into()),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(normal.min_value, 72.0);

        let all = db.get_all_thresholds().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].category, Category::Normal);
        assert_eq!(all[1].category, Category::Borderline);
        assert_eq!(all[1].updated_by.as_deref(), Some("staff-1"));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("thresholds.sqlite3")).unwrap();

        let result = db
            .upsert_threshold(ThresholdConfig {
                category: Category::Normal,
                min_value: 140.0,
                max_value: 70.0,
                updated_by: None,
                updated_at: Utc::now(),
            })
            .await;
        assert!(result.is_err());
        assert_eq!(db.get_all_thresholds().await.unwrap()[0].max_value, 130.0);
    }
}
