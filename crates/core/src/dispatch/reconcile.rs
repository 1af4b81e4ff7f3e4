//! Invalid-target reconciliation
//!
//! The send endpoint reports rejected recipients as pipe-delimited strings
//! (`invaliduser`, `invalidparty`, `invalidtag`). Which of them are read
//! depends on how the message was addressed:
//!
//! | field          | read when                                  |
//! |----------------|--------------------------------------------|
//! | `invaliduser`  | users were itemized, or the send broadcast |
//! | `invalidparty` | not a broadcast and parties were itemized  |
//! | `invalidtag`   | not a broadcast and tags were itemized     |
//!
//! Each kind lands in its own field of the result.

use std::collections::BTreeSet;

use wecom_domain::constants::{
    FIELD_INVALID_PARTY, FIELD_INVALID_TAG, FIELD_INVALID_USER, TARGET_SEPARATOR,
};
use wecom_domain::{MessageSendResult, MessageTargets};

use crate::transport_ports::ApiResponse;

/// Build the send result for `requested` from a successful response.
pub fn reconcile_invalid_targets(
    requested: &MessageTargets,
    response: &ApiResponse,
) -> MessageSendResult {
    let mut invalid = MessageTargets::new();

    if requested.to_all || !requested.users.is_empty() {
        invalid.users = split_targets(response.str_field(FIELD_INVALID_USER));
    }
    if !requested.to_all {
        if !requested.parties.is_empty() {
            invalid.parties = split_targets(response.str_field(FIELD_INVALID_PARTY));
        }
        if !requested.tags.is_empty() {
            invalid.tags = split_targets(response.str_field(FIELD_INVALID_TAG));
        }
    }

    MessageSendResult::new(response.errcode(), response.errmsg(), invalid)
}

fn split_targets(field: Option<&str>) -> BTreeSet<String> {
    field
        .map(|value| {
            value
                .split(TARGET_SEPARATOR)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
