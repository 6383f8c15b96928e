use std::collections::HashSet;

use crate::indexer::IndexError;

/// Static allow-list of Telegram user ids permitted to run admin commands.
#[derive(Debug, Clone, Default)]
pub struct AdminList {
    ids: HashSet<i64>,
}

impl AdminList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Reject callers outside the allow-list.
    pub fn check(&self, user_id: i64) -> Result<(), IndexError> {
        if self.contains(user_id) {
            Ok(())
        } else {
            Err(IndexError::Authorization(format!(
                "user {} is not an administrator",
                user_id
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_allowed() {
        let admins = AdminList::new([10, 20]);
        assert!(admins.check(10).is_ok());
        assert!(admins.contains(20));
        assert_eq!(admins.len(), 2);
    }

    #[test]
    fn test_non_admin_rejected() {
        let admins = AdminList::new([10]);
        let err = admins.check(11).unwrap_err();
        assert!(matches!(err, IndexError::Authorization(_)));
    }

    #[test]
    fn test_empty_list_rejects_everyone() {
        let admins = AdminList::default();
        assert!(admins.is_empty());
        assert!(admins.check(0).is_err());
    }
}
