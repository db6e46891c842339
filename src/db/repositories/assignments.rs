use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, format_datetime, parse_datetime},
    models::PatientAssignment,
};
use crate::stores::AssignmentStore;

fn row_to_assignment(row: &Row) -> Result<PatientAssignment, rusqlite::Error> {
    let assigned_at: String = row.get("assigned_at")?;

    Ok(PatientAssignment {
        patient_id: row.get("patient_id")?,
        specialist_id: row.get("specialist_id")?,
        assigned_by: row.get("assigned_by")?,
        assigned_at: parse_datetime(&assigned_at, "assigned_at").map_err(conversion_error)?,
    })
}

fn load_column(conn: &rusqlite::Connection, sql: &str, key: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map(params![key], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

#[async_trait]
impl AssignmentStore for Database {
    async fn specialists_for(&self, patient_id: &str) -> Result<Vec<String>> {
        let patient_id = patient_id.to_string();
        self.execute(move |conn| {
            load_column(
                conn,
                "SELECT specialist_id FROM patient_specialist_assignments
                 WHERE patient_id = ?1
                 ORDER BY specialist_id",
                &patient_id,
            )
            .context("failed to load specialists for patient")
        })
        .await
    }

    async fn patients_for(&self, specialist_id: &str) -> Result<Vec<String>> {
        let specialist_id = specialist_id.to_string();
        self.execute(move |conn| {
            load_column(
                conn,
                "SELECT patient_id FROM patient_specialist_assignments
                 WHERE specialist_id = ?1
                 ORDER BY patient_id",
                &specialist_id,
            )
            .context("failed to load patients for specialist")
        })
        .await
    }

    async fn upsert_assignment(&self, assignment: PatientAssignment) -> Result<PatientAssignment> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO patient_specialist_assignments
                     (patient_id, specialist_id, assigned_by, assigned_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(patient_id, specialist_id) DO UPDATE SET
                     assigned_by = excluded.assigned_by,
                     assigned_at = excluded.assigned_at",
                params![
                    assignment.patient_id,
                    assignment.specialist_id,
                    assignment.assigned_by,
                    format_datetime(&assignment.assigned_at),
                ],
            )
            .with_context(|| "failed to upsert assignment")?;

            let stored = conn.query_row(
                "SELECT patient_id, specialist_id, assigned_by, assigned_at
                 FROM patient_specialist_assignments
                 WHERE patient_id = ?1 AND specialist_id = ?2",
                params![assignment.patient_id, assignment.specialist_id],
                row_to_assignment,
            )?;

            Ok(stored)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn assignment(patient: &str, specialist: &str, staff: &str) -> PatientAssignment {
        PatientAssignment {
            patient_id: patient.into(),
            specialist_id: specialist.into(),
            assigned_by: staff.into(),
            assigned_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reassigning_refreshes_the_existing_row() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("assignments.sqlite3")).unwrap();

        db.upsert_assignment(assignment("p1", "dr-1", "staff-1")).await.unwrap();
        let mut again = assignment("p1", "dr-1", "staff-2");
        again.assigned_at += Duration::minutes(5);
        let stored = db.upsert_assignment(again).await.unwrap();

        assert_eq!(stored.assigned_by, "staff-2");
        assert_eq!(db.specialists_for("p1").await.unwrap(), vec!["dr-1"]);
    }

    #[tokio::test]
    async fn lookups_work_in_both_directions() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("assignments.sqlite3")).unwrap();

        db.upsert_assignment(assignment("p2", "dr-1", "s")).await.unwrap();
        db.upsert_assignment(assignment("p1", "dr-1", "s")).await.unwrap();
        db.upsert_assignment(assignment("p1", "dr-2", "s")).await.unwrap();

        assert_eq!(db.patients_for("dr-1").await.unwrap(), vec!["p1", "p2"]);
        assert_eq!(db.specialists_for("p1").await.unwrap(), vec!["dr-1", "dr-2"]);
        assert!(db.patients_for("dr-9").await.unwrap().is_empty());
    }
}
