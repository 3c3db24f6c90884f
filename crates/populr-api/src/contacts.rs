//! Contact matching: suggest existing accounts from the caller's address book.

use std::collections::BTreeSet;

use axum::extract::State;
use tracing::{info, warn};

use populr_db::models::SuggestionRow;
use populr_types::api::{Contact, ContactsRequest};

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{AuthedAccount, VndJson};
use crate::state::{AppState, run_blocking};

/// Upper bound on distinct numbers per request. Each one becomes a bound
/// parameter of a single query.
pub const MAX_CANDIDATES: usize = 2000;

/// Canonical form shared by stored and submitted numbers: whitespace,
/// dashes, dots and parentheses removed.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect()
}

/// Every non-empty number across all contacts, normalised and deduplicated.
pub fn candidate_numbers(contacts: &[Contact]) -> Result<BTreeSet<String>, ApiError> {
    let numbers: BTreeSet<String> = contacts
        .iter()
        .flat_map(|contact| contact.phones.iter())
        .map(|phone| normalize_phone(phone))
        .filter(|phone| !phone.is_empty())
        .collect();

    if numbers.len() > MAX_CANDIDATES {
        warn!("Contact upload with {} numbers rejected", numbers.len());
        return Err(ApiError::BadRequest);
    }
    Ok(numbers)
}

/// POST /contacts
pub async fn match_contacts(
    State(state): State<AppState>,
    account: AuthedAccount,
    VndJson(req): VndJson<ContactsRequest>,
) -> Result<Envelope<Vec<SuggestionRow>>, ApiError> {
    let numbers = candidate_numbers(&req.data)?;
    let submitted = numbers.len();

    let suggestions = run_blocking(&state, move |db| {
        Ok(db.find_accounts_by_phone(account.id, &numbers)?)
    })
    .await?;

    info!(
        "{} matched {} of {} contact number(s)",
        account.id,
        suggestions.len(),
        submitted
    );
    Ok(Envelope::ok(suggestions))
}
