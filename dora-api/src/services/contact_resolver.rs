use std::collections::BTreeSet;

use diesel::pg::PgConnection;
use diesel::prelude::*;

use dora_shared::clients::db::DbPool;
use dora_shared::errors::AppResult;

use crate::schema::subscribers;
use crate::services::alert_service::AlertItem;

/// Contact endpoints gathered for one alert item.
///
/// Sets, not lists: a subscriber matched through several target lists
/// is still contacted once per channel. Scoped to a single resolve
/// call, never shared across requests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Recipients {
    pub numbers: BTreeSet<String>,
    pub emails: BTreeSet<String>,
}

impl Recipients {
    pub fn add_contact(&mut self, email: String, phone_number: String) {
        self.emails.insert(email);
        self.numbers.insert(phone_number);
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.emails.is_empty()
    }
}

/// The subscriber attributes an alert can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Pincode,
    City,
    State,
    Country,
}

const TARGET_KINDS: [TargetKind; 4] = [
    TargetKind::Pincode,
    TargetKind::City,
    TargetKind::State,
    TargetKind::Country,
];

/// Resolve an alert item's targeting into concrete phone numbers and
/// email addresses. Read-only; `inform_all` short-circuits to the full
/// subscriber directory and ignores any target lists also present.
pub fn resolve(pool: &DbPool, item: &AlertItem) -> AppResult<Recipients> {
    let mut conn = pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        dora_shared::errors::AppError::internal("database connection error")
    })?;

    let mut recipients = Recipients::default();

    if item.inform_all {
        let rows = subscribers::table
            .select((subscribers::email, subscribers::phone_number))
            .load::<(String, String)>(&mut conn)?;
        for (email, phone_number) in rows {
            recipients.add_contact(email, phone_number);
        }
        tracing::info!(
            title = %item.title,
            contacts = recipients.emails.len(),
            "broadcast alert resolved to entire subscriber directory"
        );
        return Ok(recipients);
    }

    for kind in TARGET_KINDS {
        let rows = load_contacts(&mut conn, item, kind)?;
        for (email, phone_number) in rows {
            tracing::info!(email = %email, "subscriber will be alerted");
            recipients.add_contact(email, phone_number);
        }
    }

    Ok(recipients)
}

fn load_contacts(
    conn: &mut PgConnection,
    item: &AlertItem,
    kind: TargetKind,
) -> AppResult<Vec<(String, String)>> {
    let rows = match kind {
        TargetKind::Pincode => match item.pincodes.as_deref() {
            Some(pincodes) if !pincodes.is_empty() => subscribers::table
                .filter(subscribers::pin_code.eq_any(pincodes))
                .select((subscribers::email, subscribers::phone_number))
                .load::<(String, String)>(conn)?,
            _ => vec![],
        },
        TargetKind::City => match item.cities.as_deref() {
            Some(cities) if !cities.is_empty() => subscribers::table
                .filter(subscribers::city.eq_any(cities))
                .select((subscribers::email, subscribers::phone_number))
                .load::<(String, String)>(conn)?,
            _ => vec![],
        },
        TargetKind::State => match item.states.as_deref() {
            Some(states) if !states.is_empty() => subscribers::table
                .filter(subscribers::state.eq_any(states))
                .select((subscribers::email, subscribers::phone_number))
                .load::<(String, String)>(conn)?,
            _ => vec![],
        },
        TargetKind::Country => match item.countries.as_deref() {
            Some(countries) if !countries.is_empty() => subscribers::table
                .filter(subscribers::country.eq_any(countries))
                .select((subscribers::email, subscribers::phone_number))
                .load::<(String, String)>(conn)?,
            _ => vec![],
        },
    };
    Ok(rows)
}
