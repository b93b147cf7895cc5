// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer decision mutation operations.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::SqliteConnection;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewDecision;
use crate::diesel_schema::customer_decisions;
use crate::error::PersistenceError;

/// Insert a customer decision, returning its id.
///
/// Decisions are set once: the unique index on `item_id` turns a repeat
/// insert into `DecisionExists` rather than a silent overwrite.
///
/// # Errors
///
/// Returns `DecisionExists` when the item already carries a decision.
pub fn insert_decision(
    conn: &mut SqliteConnection,
    decision: &NewDecision,
) -> Result<i64, PersistenceError> {
    let inserted = diesel::insert_into(customer_decisions::table)
        .values(decision)
        .execute(conn);
    match inserted {
        Ok(_) => get_last_insert_rowid(conn),
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(PersistenceError::DecisionExists(decision.item_id))
        }
        Err(err) => Err(err.into()),
    }
}
