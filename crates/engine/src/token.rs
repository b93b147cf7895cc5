// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Public token generation.
//!
//! A token is the customer's only credential for the quote portal: a
//! random alphanumeric string with a policy-configured lifetime. Tokens
//! are globally unique in storage (enforced by a partial unique index);
//! the keyspace makes a collision retry unnecessary in practice.

use rand::RngExt;
use rand::distr::Alphanumeric;
use time::{Duration, OffsetDateTime};
use vhc_domain::PublicToken;

/// Length of a generated token, in characters.
pub const TOKEN_LENGTH: usize = 48;

/// Generates a fresh public token expiring `ttl_hours` from `now`.
#[must_use]
pub fn issue_token(ttl_hours: i64, now: OffsetDateTime) -> PublicToken {
    let value: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    PublicToken {
        value,
        expires_at: now + Duration::hours(ttl_hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_token_shape() {
        let now = datetime!(2026-03-02 08:00 UTC);
        let token = issue_token(72, now);
        assert_eq!(token.value.len(), TOKEN_LENGTH);
        assert!(token.value.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(token.expires_at, now + Duration::hours(72));
    }

    #[test]
    fn test_tokens_are_unique() {
        let now = datetime!(2026-03-02 08:00 UTC);
        assert_ne!(issue_token(72, now).value, issue_token(72, now).value);
    }
}
