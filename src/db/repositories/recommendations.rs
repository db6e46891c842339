use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, format_datetime, parse_datetime, parse_source},
    models::Recommendation,
};
use crate::stores::{InsertOutcome, RecommendationStore};

fn row_to_recommendation(row: &Row) -> Result<Recommendation, rusqlite::Error> {
    let source: String = row.get("source")?;
    let created_at: String = row.get("created_at")?;

    Ok(Recommendation {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        advice: row.get("advice")?,
        source: parse_source(&source).map_err(conversion_error)?,
        created_at: parse_datetime(&created_at, "created_at").map_err(conversion_error)?,
    })
}

#[async_trait]
impl RecommendationStore for Database {
    async fn find_matching(
        &self,
        patient_id: &str,
        advice: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>> {
        let patient_id = patient_id.to_string();
        let advice = advice.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, patient_id, advice, source, created_at
                 FROM recommendations
                 WHERE patient_id = ?1 AND advice = ?2 AND created_at >= ?3
                 ORDER BY created_at DESC",
            )?;

            let rows = stmt
                .query_map(
                    params![patient_id, advice, format_datetime(&since)],
                    row_to_recommendation,
                )?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load matching recommendations")?;

            Ok(rows)
        })
        .await
    }

    async fn insert_recommendation(
        &self,
        recommendation: Recommendation,
    ) -> Result<InsertOutcome> {
        self.execute(move |conn| {
            // The partial unique index only covers AI advice; a conflict there
            // means a concurrent analysis already wrote the same row today.
            let changed = conn
                .execute(
                    "INSERT INTO recommendations (id, patient_id, advice, source, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT DO NOTHING",
                    params![
                        recommendation.id,
                        recommendation.patient_id,
                        recommendation.advice,
                        recommendation.source.as_str(),
                        format_datetime(&recommendation.created_at),
                    ],
                )
                .with_context(|| "failed to insert recommendation")?;

            Ok(if changed == 0 {
                InsertOutcome::Duplicate
            } else {
                InsertOutcome::Inserted
            })
        })
        .await
    }

    async fn recommendations_for_patient(&self, patient_id: &str) -> Result<Vec<Recommendation>> {
        let patient_id = patient_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, patient_id, advice, source, created_at
                 FROM recommendations
                 WHERE patient_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map(params![patient_id], row_to_recommendation)?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load recommendations")?;

            Ok(rows)
        })
        .await
    }
}
