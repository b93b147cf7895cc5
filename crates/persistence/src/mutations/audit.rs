// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log mutation operations.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewAudit;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Append an audit record, returning its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_audit(conn: &mut SqliteConnection, record: &NewAudit) -> Result<i64, PersistenceError> {
    diesel::insert_into(audit_log::table)
        .values(record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}
