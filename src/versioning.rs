// ============================================================================
// Optimistic Concurrency
// ============================================================================
//
// Every entity editable through the admin API carries an integer version,
// starting at 1 and advancing by exactly 1 per accepted update. A writer must
// present the version it read; a mismatch is rejected without mutation.
//
// The in-process check below is necessary but not sufficient: two requests
// could both pass it before either commits. The durable check is the
// `WHERE version = $n` predicate on the UPDATE statement itself (see
// content::PgArticleStore), which leans on the database's row-level
// serialization of conflicting writes.
//
// ============================================================================

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vitrine_error::AppError;

/// Contract for entities participating in optimistic concurrency.
///
/// Fields mutated only by the system itself (delivery flags, notification
/// timestamps) are exempt from the guard since they are never subject to
/// concurrent user edits; each entity documents its exempt fields.
pub trait Versioned {
    /// Entity type label used in conflict reports
    const ENTITY_TYPE: &'static str;

    fn current_version(&self) -> i32;

    fn set_version(&mut self, version: i32);
}

/// Entities owned by a single tenant; every query on them is scoped by
/// `tenant_id`
pub trait TenantScoped {
    fn tenant_id(&self) -> Uuid;
}

/// Entities that are soft-deleted: a tombstone timestamp instead of row
/// removal, and deleted rows are invisible to all reads and guarded writes
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// A write presented a version that no longer matches the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionConflict {
    pub entity_type: &'static str,
    pub current_version: i32,
    pub provided_version: i32,
}

impl From<VersionConflict> for AppError {
    fn from(conflict: VersionConflict) -> Self {
        AppError::VersionConflict {
            entity_type: conflict.entity_type.to_string(),
            current_version: conflict.current_version,
            provided_version: conflict.provided_version,
        }
    }
}

/// Validate the provided version against the entity and advance it by one.
///
/// On mismatch the entity is left untouched and a `VersionConflict` carrying
/// both version numbers is returned. On success the caller applies its field
/// changes and persists entity + new version in the same transaction.
pub fn check_and_advance<E: Versioned>(
    entity: &mut E,
    provided_version: i32,
) -> Result<(), VersionConflict> {
    let current = entity.current_version();
    if current != provided_version {
        return Err(VersionConflict {
            entity_type: E::ENTITY_TYPE,
            current_version: current,
            provided_version,
        });
    }
    entity.set_version(current + 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page {
        version: i32,
    }

    impl Versioned for Page {
        const ENTITY_TYPE: &'static str = "page";

        fn current_version(&self) -> i32 {
            self.version
        }

        fn set_version(&mut self, version: i32) {
            self.version = version;
        }
    }

    #[test]
    fn matching_version_advances_by_one() {
        let mut page = Page { version: 1 };
        assert!(check_and_advance(&mut page, 1).is_ok());
        assert_eq!(page.current_version(), 2);
    }

    #[test]
    fn stale_version_is_rejected_without_mutation() {
        let mut page = Page { version: 3 };
        let err = check_and_advance(&mut page, 2).unwrap_err();
        assert_eq!(
            err,
            VersionConflict {
                entity_type: "page",
                current_version: 3,
                provided_version: 2,
            }
        );
        assert_eq!(page.current_version(), 3);
    }

    #[test]
    fn future_version_is_rejected_too() {
        let mut page = Page { version: 1 };
        assert!(check_and_advance(&mut page, 5).is_err());
        assert_eq!(page.current_version(), 1);
    }
}
