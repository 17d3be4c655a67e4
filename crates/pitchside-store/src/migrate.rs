//! Load-time fix-ups for data written by older releases.

use pitchside_core::{Clock, Storage, roster::JoinStatus};

use crate::DomainStore;

impl<S: Storage, C: Clock> DomainStore<S, C> {
  /// Older releases placed children in groups without recording when. For
  /// each such child, take the creation time of the most recent accepted
  /// join request for that child and group, or now if there is none.
  ///
  /// Returns how many children were updated.
  pub(crate) fn backfill_joined_group_at(&mut self) -> usize {
    let now = self.clock.now();
    let mut updated = 0;

    for child in &mut self.children {
      let Some(group_id) = child.group_id.as_ref() else { continue };
      if child.joined_group_at.is_some() {
        continue;
      }

      let accepted_at = self
        .join_requests
        .iter()
        .filter(|r| {
          r.child_id == child.id
            && &r.group_id == group_id
            && r.status == JoinStatus::Accepted
        })
        .map(|r| &r.created_at)
        .max()
        .cloned();

      tracing::warn!(
        child_id = %child.id,
        %group_id,
        from_request = accepted_at.is_some(),
        "backfilling joinedGroupAt"
      );
      child.joined_group_at = Some(accepted_at.unwrap_or_else(|| now.clone()));
      updated += 1;
    }

    updated
  }
}
