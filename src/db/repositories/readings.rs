use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params_from_iter, types::Value, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, format_datetime, parse_category, parse_datetime, to_i64, to_usize},
    models::Reading,
};
use crate::stores::{ReadingQuery, ReadingStore};

fn row_to_reading(row: &Row) -> Result<Reading, rusqlite::Error> {
    let measured_at: String = row.get("measured_at")?;
    let category: String = row.get("category")?;

    Ok(Reading {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        value: row.get("value")?,
        timestamp: parse_datetime(&measured_at, "measured_at").map_err(conversion_error)?,
        category: parse_category(&category).map_err(conversion_error)?,
        food_intake: row.get("food_intake")?,
        activity: row.get("activity")?,
        notes: row.get("notes")?,
    })
}

/// Build the WHERE clause and bound values for a reading filter.
fn filter_clause(query: &ReadingQuery) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    if let Some(patient_id) = &query.patient_id {
        conditions.push("patient_id = ?");
        values.push(Value::Text(patient_id.clone()));
    }
    if let Some(category) = query.category {
        conditions.push("category = ?");
        values.push(Value::Text(category.as_str().to_string()));
    }
    if let Some(since) = &query.since {
        conditions.push("measured_at >= ?");
        values.push(Value::Text(format_datetime(since)));
    }
    if let Some(until) = &query.until {
        conditions.push("measured_at <= ?");
        values.push(Value::Text(format_datetime(until)));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, values)
}

#[async_trait]
impl ReadingStore for Database {
    async fn query_readings(&self, query: ReadingQuery) -> Result<Vec<Reading>> {
        self.execute(move |conn| {
            let (clause, mut values) = filter_clause(&query);
            let mut sql = format!(
                "SELECT id, patient_id, value, measured_at, category, food_intake, activity, notes
                 FROM blood_sugar_readings
                 {clause}
                 ORDER BY measured_at DESC, rowid DESC"
            );
            if let Some(limit) = query.limit {
                sql.push_str(" LIMIT ?");
                values.push(Value::Integer(to_i64(limit)?));
            }

            let mut stmt = conn.prepare(&sql).context("failed to prepare reading query")?;
            let readings = stmt
                .query_map(params_from_iter(values), row_to_reading)?
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load readings")?;

            Ok(readings)
        })
        .await
    }

    async fn count_readings(&self, query: ReadingQuery) -> Result<usize> {
        self.execute(move |conn| {
            let (clause, values) = filter_clause(&query);
            let count: i64 = conn
                .query_row(
                    &format!("SELECT COUNT(*) FROM blood_sugar_readings {clause}"),
                    params_from_iter(values),
                    |row| row.get(0),
                )
                .context("failed to count readings")?;
            to_usize(count, "reading count")
        })
        .await
    }

    async fn insert_reading(&self, reading: Reading) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO blood_sugar_readings (
                    id, patient_id, value, measured_at, category, food_intake, activity, notes
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    reading.id,
                    reading.patient_id,
                    reading.value,
                    format_datetime(&reading.timestamp),
                    reading.category.as_str(),
                    reading.food_intake,
                    reading.activity,
                    reading.notes,
                ],
            )
            .with_context(|| "failed to insert reading")?;
            Ok(())
        })
        .await
    }
}
