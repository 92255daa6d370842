use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(AuthorId, "Row id of an author.");
define_id!(PublisherId, "Row id of a publisher.");
define_id!(CategoryId, "Row id of a catalog category.");
define_id!(BookId, "Row id of a catalogued title.");
define_id!(MemberId, "Row id of a library member.");
define_id!(StaffId, "Row id of a staff member.");
define_id!(BorrowingId, "Row id of a borrowing record.");
define_id!(ReservationId, "Row id of a reservation.");
define_id!(FineId, "Row id of a fine.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = BookId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(BookId::from(42), id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(MemberId::new(7).to_string(), "7");
    }

    #[test]
    fn test_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&FineId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
