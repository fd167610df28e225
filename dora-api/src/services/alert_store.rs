use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;

use dora_shared::clients::db::DbPool;
use dora_shared::errors::{AppError, AppResult};

use crate::models::{Alert, NewAlert, Severity};
use crate::schema::alerts;
use crate::services::alert_service::AlertItem;

/// Store one alert, deduplicating on (title, description, severity).
///
/// Returns the stored row plus whether it already existed. Runs on a
/// borrowed connection so a batch can share one transaction.
pub fn upsert(
    conn: &mut PgConnection,
    item: &AlertItem,
    severity: Severity,
) -> AppResult<(Alert, bool)> {
    fetch_or_insert(
        conn,
        |conn| find_existing(conn, item, severity),
        |conn| {
            let new_alert = NewAlert {
                title: item.title.clone(),
                description: item.description.clone(),
                severity: severity.as_str().to_string(),
                coverage: item.coverage,
            };
            // ON CONFLICT DO NOTHING keeps the transaction usable when a
            // concurrent writer inserts the same identity between the
            // lookup and this insert; zero rows back means they won.
            diesel::insert_into(alerts::table)
                .values(&new_alert)
                .on_conflict_do_nothing()
                .get_result::<Alert>(conn)
                .optional()
                .map_err(AppError::from)
        },
        item,
        severity,
    )
}

/// The dedup decision, generic over the store calls so the conflict
/// branches can be exercised without a database. `fetch` looks up the
/// identity key; `insert` returns None when the unique constraint
/// already holds a row.
fn fetch_or_insert<C, F, I>(
    conn: &mut C,
    fetch: F,
    insert: I,
    item: &AlertItem,
    severity: Severity,
) -> AppResult<(Alert, bool)>
where
    F: Fn(&mut C) -> AppResult<Option<Alert>>,
    I: FnOnce(&mut C) -> AppResult<Option<Alert>>,
{
    if let Some(existing) = fetch(conn)? {
        tracing::warn!(
            title = %item.title,
            severity = %severity,
            "alert already exists in the database, skipping storage"
        );
        return Ok((existing, true));
    }

    match insert(conn)? {
        Some(alert) => {
            tracing::debug!(alert_id = %alert.id, title = %alert.title, "alert stored");
            Ok((alert, false))
        }
        None => {
            tracing::warn!(
                title = %item.title,
                "alert inserted concurrently by another writer, returning existing row"
            );
            let existing = fetch(conn)?.ok_or_else(|| {
                AppError::internal("alert vanished between conflicting insert and re-fetch")
            })?;
            Ok((existing, true))
        }
    }
}

fn find_existing(
    conn: &mut PgConnection,
    item: &AlertItem,
    severity: Severity,
) -> AppResult<Option<Alert>> {
    let existing = alerts::table
        .filter(alerts::title.eq(&item.title))
        .filter(alerts::description.eq(&item.description))
        .filter(alerts::severity.eq(severity.as_str()))
        .first::<Alert>(conn)
        .optional()?;
    Ok(existing)
}

fn window_query(from: DateTime<Utc>, to: DateTime<Utc>) -> alerts::BoxedQuery<'static, Pg> {
    alerts::table
        .into_boxed()
        .filter(alerts::created_at.ge(from))
        .filter(alerts::created_at.le(to))
        .order(alerts::created_at.asc())
}

/// List alerts created within `[from, to]`, oldest first.
pub fn list_since(pool: &DbPool, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Alert>> {
    let mut conn = pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })?;

    let items = window_query(from, to).load::<Alert>(&mut conn)?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn stored(title: &str) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            title: title.into(),
            description: "desc".into(),
            severity: "high".into(),
            coverage: None,
            created_at: Utc::now(),
        }
    }

    fn item(title: &str) -> AlertItem {
        AlertItem {
            title: title.into(),
            description: "desc".into(),
            severity: "high".into(),
            coverage: None,
            pincodes: None,
            cities: None,
            states: None,
            countries: None,
            inform_all: true,
        }
    }

    // Scripted store: every fetch pops the next canned row.
    struct Script {
        fetches: Vec<Option<Alert>>,
        insert: Option<Alert>,
    }

    #[test]
    fn existing_row_short_circuits_the_insert() {
        let existing = stored("Flood");
        let id = existing.id;
        let mut script = Script {
            fetches: vec![Some(existing)],
            insert: None,
        };

        let (alert, was_existing) = fetch_or_insert(
            &mut script,
            |s| Ok(s.fetches.remove(0)),
            |_| panic!("insert must not run when the lookup hits"),
            &item("Flood"),
            Severity::High,
        )
        .unwrap();

        assert!(was_existing);
        assert_eq!(alert.id, id);
    }

    #[test]
    fn fresh_identity_inserts_a_new_row() {
        let created = stored("Flood");
        let id = created.id;
        let mut script = Script {
            fetches: vec![None],
            insert: Some(created),
        };

        let (alert, was_existing) = fetch_or_insert(
            &mut script,
            |s| Ok(s.fetches.remove(0)),
            |s| Ok(s.insert.take()),
            &item("Flood"),
            Severity::High,
        )
        .unwrap();

        assert!(!was_existing);
        assert_eq!(alert.id, id);
    }

    #[test]
    fn lost_insert_race_refetches_the_winner() {
        // Lookup misses, the unique constraint swallows the insert, and
        // the re-fetch returns the row the concurrent writer stored.
        let winner = stored("Flood");
        let id = winner.id;
        let mut script = Script {
            fetches: vec![None, Some(winner)],
            insert: None,
        };

        let (alert, was_existing) = fetch_or_insert(
            &mut script,
            |s| Ok(s.fetches.remove(0)),
            |s| Ok(s.insert.take()),
            &item("Flood"),
            Severity::High,
        )
        .unwrap();

        assert!(was_existing);
        assert_eq!(alert.id, id);
    }

    #[test]
    fn row_missing_after_conflict_is_an_internal_error() {
        let mut script = Script {
            fetches: vec![None, None],
            insert: None,
        };

        let result = fetch_or_insert(
            &mut script,
            |s| Ok(s.fetches.remove(0)),
            |s| Ok(s.insert.take()),
            &item("Flood"),
            Severity::High,
        );

        assert!(result.is_err());
    }

    #[test]
    fn window_query_bounds_are_inclusive_and_ascending() {
        let to = Utc::now();
        let from = to - chrono::Duration::days(1);
        let sql = diesel::debug_query::<Pg, _>(&window_query(from, to)).to_string();

        assert!(sql.contains("\"created_at\" >= $1"), "{sql}");
        assert!(sql.contains("\"created_at\" <= $2"), "{sql}");
        assert!(sql.contains("ORDER BY"), "{sql}");
        assert!(sql.contains(" ASC"), "{sql}");
    }
}
