use crate::model::CurrentUser;

/// Whether `identity` owns a resource whose owner is `owner_id`.
///
/// False when either side is missing or empty. This only drives what the
/// client renders; the server checks ownership again on every mutation.
pub fn is_owner(identity: Option<&CurrentUser>, owner_id: Option<&str>) -> bool {
    match (identity, owner_id) {
        (Some(user), Some(owner)) => !user.uid.is_empty() && user.uid == owner,
        _ => false,
    }
}
