mod labels;

pub mod author;
pub mod book;
pub mod borrowing;
pub mod category;
pub mod email;
pub mod fine;
pub mod ids;
pub mod isbn;
pub mod member;
pub mod money;
pub mod publisher;
pub mod reservation;
pub mod staff;

pub use author::{Author, NewAuthor};
pub use book::{Book, BookAuthor, NewBook};
pub use borrowing::{BorrowingRecord, BorrowingStatus, BorrowingUpdate, NewBorrowing, MAX_RENEWALS};
pub use category::{Category, NewCategory};
pub use email::Email;
pub use fine::{Fine, FineStatus, FineType, NewFine};
pub use ids::{
    AuthorId, BookId, BorrowingId, CategoryId, FineId, MemberId, PublisherId, ReservationId,
    StaffId,
};
pub use isbn::Isbn;
pub use member::{Member, MembershipType, NewMember};
pub use money::Money;
pub use publisher::{NewPublisher, Publisher};
pub use reservation::{NewReservation, Reservation, ReservationStatus};
pub use staff::{NewStaff, Staff};
