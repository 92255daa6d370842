//! Integration tests for the catalog's bookkeeping rules against an
//! on-disk database.

use chrono::NaiveDate;
use shelfmark_core::model::{
    BookAuthor, BookId, BorrowingId, BorrowingStatus, BorrowingUpdate, CategoryId, Email,
    FineStatus, FineType, Isbn, MemberId, MembershipType, Money, NewAuthor, NewBook, NewBorrowing,
    NewCategory, NewFine, NewMember, NewPublisher, NewReservation, NewStaff, ReservationStatus,
};
use shelfmark_core::{ConstraintKind, Database, Error, Result};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn money(raw: &str) -> Money {
    Money::parse(raw).unwrap()
}

struct Library {
    _dir: TempDir,
    db: Database,
    category: CategoryId,
}

impl Library {
    fn open() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("library.db")).expect("Failed to open database");
        let category = db
            .insert_category(&NewCategory::new("General"))
            .expect("Failed to add category");
        Self {
            _dir: dir,
            db,
            category,
        }
    }

    fn book(&mut self, isbn: &str, title: &str, copies: u32) -> BookId {
        let book = NewBook::new(Isbn::parse(isbn).unwrap(), title, self.category)
            .with_copies(copies);
        self.db.insert_book(&book).expect("Failed to add book")
    }

    fn member(&self, number: &str) -> MemberId {
        let email = Email::parse(&format!("{}@example.org", number.to_lowercase())).unwrap();
        self.db
            .insert_member(&NewMember::new(
                number,
                "Test",
                "Member",
                email,
                MembershipType::Public,
                date(2024, 1, 1),
            ))
            .expect("Failed to add member")
    }

    fn lend(&mut self, member: MemberId, book: BookId) -> Result<BorrowingId> {
        self.db
            .borrow_book(&NewBorrowing::new(member, book, date(2024, 3, 1), date(2024, 3, 15)))
    }

    fn counters(&self, book: BookId) -> (u32, u32) {
        let book = self.db.get_book(book).unwrap();
        (book.available_copies, book.total_copies)
    }

    fn assert_counters_consistent(&self) {
        let mut stmt = self
            .db
            .conn()
            .prepare("SELECT available_copies, total_copies FROM books")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .unwrap();
        for row in rows {
            let (available, total) = row.unwrap();
            assert!(0 <= available && available <= total, "{available}/{total}");
        }
    }
}

#[test]
fn test_counters_stay_within_bounds() {
    let mut lib = Library::open();
    let book = lib.book("9780451524935", "1984", 2);
    let alice = lib.member("M-1");
    let bob = lib.member("M-2");

    let first = lib.lend(alice, book).unwrap();
    lib.assert_counters_consistent();
    let second = lib.lend(bob, book).unwrap();
    lib.assert_counters_consistent();
    assert_eq!(lib.counters(book), (0, 2));

    lib.db.return_book(first, date(2024, 3, 10)).unwrap();
    lib.assert_counters_consistent();
    lib.db.mark_lost(second).unwrap();
    lib.assert_counters_consistent();
    assert_eq!(lib.counters(book), (1, 1));
}

#[test]
fn test_borrow_with_no_copies_fails() {
    let mut lib = Library::open();
    let book = lib.book("9780553293357", "Foundation", 1);
    let alice = lib.member("M-1");
    let bob = lib.member("M-2");

    lib.lend(alice, book).unwrap();
    let err = lib.lend(bob, book).unwrap_err();
    assert!(matches!(err, Error::Unavailable { book: b } if b == book));
    assert_eq!(lib.counters(book), (0, 1));
    assert_eq!(lib.db.list_member_loans(bob).unwrap().len(), 0);
}

#[test]
fn test_return_increments_once() {
    let mut lib = Library::open();
    let book = lib.book("9780141439518", "Pride and Prejudice", 3);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    assert_eq!(lib.counters(book), (2, 3));

    let record = lib.db.return_book(loan, date(2024, 3, 12)).unwrap();
    assert_eq!(record.status, BorrowingStatus::Returned);
    assert_eq!(record.return_date, Some(date(2024, 3, 12)));
    assert_eq!(lib.counters(book), (3, 3));

    lib.db
        .update_borrowing_status(loan, BorrowingUpdate::returned(date(2024, 3, 12)))
        .unwrap();
    assert_eq!(lib.counters(book), (3, 3));
}

#[test]
fn test_overdue_then_returned() {
    let mut lib = Library::open();
    let book = lib.book("9780062693662", "Murder on the Orient Express", 1);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();

    assert_eq!(lib.db.mark_overdue(date(2024, 4, 1)).unwrap(), 1);
    assert_eq!(lib.db.get_borrowing(loan).unwrap().status, BorrowingStatus::Overdue);
    assert_eq!(lib.counters(book), (0, 1));

    lib.db.return_book(loan, date(2024, 4, 2)).unwrap();
    assert_eq!(lib.counters(book), (1, 1));
}

#[test]
fn test_terminal_status_is_final() {
    let mut lib = Library::open();
    let book = lib.book("9780553380163", "A Brief History of Time", 2);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    lib.db.mark_lost(loan).unwrap();

    let err = lib
        .db
        .update_borrowing_status(loan, BorrowingUpdate::returned(date(2024, 3, 20)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: BorrowingStatus::Lost,
            to: BorrowingStatus::Returned
        }
    ));
    assert_eq!(lib.counters(book), (1, 1));
}

#[test]
fn test_open_records_share_copies() {
    let mut lib = Library::open();
    let book = lib.book("9780553293357", "Foundation", 2);
    let alice = lib.member("M-1");
    let bob = lib.member("M-2");
    let carol = lib.member("M-3");

    lib.lend(alice, book).unwrap();
    let late = lib
        .db
        .borrow_book(
            &NewBorrowing::new(bob, book, date(2024, 2, 1), date(2024, 2, 15))
                .with_status(BorrowingStatus::Overdue),
        )
        .unwrap();
    assert_eq!(lib.counters(book), (0, 2));
    assert!(matches!(lib.lend(carol, book), Err(Error::Unavailable { .. })));

    lib.db.return_book(late, date(2024, 3, 5)).unwrap();
    assert_eq!(lib.counters(book), (1, 2));
    lib.lend(carol, book).unwrap();
    assert_eq!(lib.counters(book), (0, 2));
    lib.assert_counters_consistent();
}

#[test]
fn test_member_delete_restores_overdue_copy() {
    let mut lib = Library::open();
    let book = lib.book("9780141439518", "Pride and Prejudice", 1);
    let alice = lib.member("M-1");
    lib.db
        .borrow_book(
            &NewBorrowing::new(alice, book, date(2024, 2, 1), date(2024, 2, 15))
                .with_status(BorrowingStatus::Overdue),
        )
        .unwrap();
    assert_eq!(lib.counters(book), (0, 1));

    lib.db.delete_member(alice).unwrap();
    assert_eq!(lib.counters(book), (1, 1));
}

#[test]
fn test_repeat_return_is_noop() {
    let mut lib = Library::open();
    let book = lib.book("9780062693662", "Murder on the Orient Express", 2);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    lib.db.return_book(loan, date(2024, 3, 10)).unwrap();

    let record = lib
        .db
        .update_borrowing_status(
            loan,
            BorrowingUpdate {
                status: BorrowingStatus::Returned,
                return_date: None,
            },
        )
        .unwrap();
    assert_eq!(record.return_date, Some(date(2024, 3, 10)));

    let record = lib.db.return_book(loan, date(2024, 4, 1)).unwrap();
    assert_eq!(record.return_date, Some(date(2024, 3, 10)));
    assert_eq!(lib.counters(book), (2, 2));
}

#[test]
fn test_lost_decrements_total_only() {
    let mut lib = Library::open();
    let book = lib.book("9780062316097", "Sapiens", 3);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    assert_eq!(lib.counters(book), (2, 3));

    lib.db.mark_lost(loan).unwrap();
    assert_eq!(lib.counters(book), (2, 2));
}

#[test]
fn test_fines_accumulate_on_balance() {
    let mut lib = Library::open();
    let alice = lib.member("M-1");
    lib.db
        .add_fine(&NewFine::new(alice, FineType::Overdue, money("5.00"), date(2024, 3, 20)))
        .unwrap();
    lib.db
        .add_fine(&NewFine::new(alice, FineType::Damage, money("3.50"), date(2024, 3, 21)))
        .unwrap();
    assert_eq!(lib.db.get_member(alice).unwrap().fine_balance, money("8.50"));
}

#[test]
fn test_partial_and_full_payment() {
    let mut lib = Library::open();
    let alice = lib.member("M-1");
    let fine = lib
        .db
        .add_fine(&NewFine::new(alice, FineType::Overdue, money("5.00"), date(2024, 3, 20)))
        .unwrap();

    let paid = lib.db.pay_fine(fine, money("3.50"), date(2024, 3, 22)).unwrap();
    assert_eq!(paid.status, FineStatus::Partial);
    assert_eq!(lib.db.get_member(alice).unwrap().fine_balance, money("1.50"));

    let paid = lib.db.pay_fine(fine, money("1.50"), date(2024, 3, 23)).unwrap();
    assert_eq!(paid.status, FineStatus::Paid);
    assert_eq!(lib.db.get_member(alice).unwrap().fine_balance, Money::ZERO);
}

#[test]
fn test_category_delete_rules() {
    let mut lib = Library::open();
    let fiction = lib.db.insert_category(&NewCategory::new("Fiction")).unwrap();
    let mystery = lib
        .db
        .insert_category(&NewCategory::new("Mystery").under(fiction))
        .unwrap();
    let poetry = lib.db.insert_category(&NewCategory::new("Poetry")).unwrap();
    lib.db
        .insert_book(&NewBook::new(
            Isbn::parse("0123456789").unwrap(),
            "Collected Verse",
            poetry,
        ))
        .unwrap();

    let err = lib.db.delete_category(poetry).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    assert!(lib.db.get_category(poetry).is_ok());

    lib.db.delete_category(fiction).unwrap();
    assert!(lib.db.get_category(mystery).unwrap().parent_id.is_none());
}

#[test]
fn test_category_cycle_rejected() {
    let mut lib = Library::open();
    let root = lib.db.insert_category(&NewCategory::new("Non-Fiction")).unwrap();
    let child = lib
        .db
        .insert_category(&NewCategory::new("Science").under(root))
        .unwrap();
    let grandchild = lib
        .db
        .insert_category(&NewCategory::new("Physics").under(child))
        .unwrap();

    let err = lib.db.set_category_parent(root, Some(grandchild)).unwrap_err();
    assert!(matches!(err, Error::CategoryCycle { .. }));
    assert!(lib.db.get_category(root).unwrap().is_root());

    let ancestors: Vec<_> = lib
        .db
        .category_ancestors(grandchild)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ancestors, [child, root]);
}

#[test]
fn test_member_delete_cascades() {
    let mut lib = Library::open();
    let book = lib.book("9780060853983", "Good Omens", 2);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    let hold = lib
        .db
        .reserve_book(&NewReservation::new(alice, book, date(2024, 3, 1), date(2024, 3, 8)))
        .unwrap();
    let fine = lib
        .db
        .add_fine(
            &NewFine::new(alice, FineType::Overdue, money("1.00"), date(2024, 3, 2))
                .for_borrowing(loan),
        )
        .unwrap();

    lib.db.delete_member(alice).unwrap();

    assert!(matches!(lib.db.get_borrowing(loan), Err(Error::NotFound { .. })));
    assert!(matches!(lib.db.get_reservation(hold), Err(Error::NotFound { .. })));
    assert!(matches!(lib.db.get_fine(fine), Err(Error::NotFound { .. })));
    assert_eq!(lib.counters(book), (2, 2));
}

#[test]
fn test_isbn_formats() {
    for valid in ["978-0-06-112008-4", "0123456789", "9780451524935", "1234567890123"] {
        assert!(Isbn::parse(valid).is_ok(), "{valid} should parse");
    }
    let err = Isbn::parse("abc123").unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { field: "isbn", .. }));

    // The schema CHECK rejects the same value when the type is bypassed.
    let lib = Library::open();
    let err = lib
        .db
        .conn()
        .execute(
            "INSERT INTO books (isbn, title, category_id, total_copies, available_copies,
                                created_at, updated_at)
             VALUES ('abc123', 'Bad', ?1, 1, 1, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [lib.category],
        )
        .map_err(Error::from)
        .unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
}

#[test]
fn test_reservation_uniqueness() {
    let mut lib = Library::open();
    let book = lib.book("9780451524935", "1984", 1);
    let alice = lib.member("M-1");
    let hold = NewReservation::new(alice, book, date(2024, 3, 1), date(2024, 3, 8));

    lib.db.reserve_book(&hold).unwrap();
    let err = lib.db.reserve_book(&hold).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::Unique));

    lib.db
        .reserve_book(&hold.clone().with_status(ReservationStatus::Cancelled))
        .unwrap();
    assert_eq!(lib.db.list_reservations_for_book(book).unwrap().len(), 2);
}

#[test]
fn test_renewal_capped() {
    let mut lib = Library::open();
    let book = lib.book("9780553293357", "Foundation", 1);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();

    let mut due = date(2024, 3, 15);
    for _ in 0..5 {
        due = due + chrono::Days::new(14);
        lib.db.renew_borrowing(loan, due).unwrap();
    }
    let record = lib.db.get_borrowing(loan).unwrap();
    assert_eq!(record.renewal_count, 5);
    assert_eq!(record.due_date, due);

    let err = lib.db.renew_borrowing(loan, date(2024, 12, 1)).unwrap_err();
    assert!(matches!(err, Error::RenewalLimit { .. }));
}

#[test]
fn test_search_by_description() {
    let mut lib = Library::open();
    let book = NewBook::new(
        Isbn::parse("9780553380163").unwrap(),
        "A Brief History of Time",
        lib.category,
    )
    .with_description("Black holes and the big bang explained.");
    let id = lib.db.insert_book(&book).unwrap();
    lib.book("9780451524935", "1984", 1);

    let hits = lib.db.search_books("holes").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);

    lib.db.delete_book(id).unwrap();
    assert!(lib.db.search_books("holes").unwrap().is_empty());
}

#[test]
fn test_reopen_keeps_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_category(&NewCategory::new("Fiction")).unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 1);
    assert_eq!(db.applied_migrations().unwrap().len(), 2);
}

#[test]
fn test_publisher_delete_keeps_books() {
    let mut lib = Library::open();
    let penguin = lib.db.insert_publisher(&NewPublisher::new("Penguin")).unwrap();
    let book = lib
        .db
        .insert_book(
            &NewBook::new(Isbn::parse("9780141439518").unwrap(), "Pride and Prejudice", lib.category)
                .with_publisher(penguin),
        )
        .unwrap();
    assert_eq!(lib.db.get_book(book).unwrap().publisher_id, Some(penguin));

    lib.db.delete_publisher(penguin).unwrap();
    assert!(lib.db.get_book(book).unwrap().publisher_id.is_none());
}

#[test]
fn test_staff_delete_keeps_loans() {
    let mut lib = Library::open();
    let book = lib.book("9780451524935", "1984", 1);
    let alice = lib.member("M-1");
    let clerk = lib
        .db
        .insert_staff(&NewStaff::new(
            "EMP-9",
            "Marcus",
            "Reid",
            Email::parse("marcus@library.example.org").unwrap(),
            "Circulation Clerk",
            date(2021, 3, 15),
        ))
        .unwrap();
    let loan = lib
        .db
        .borrow_book(
            &NewBorrowing::new(alice, book, date(2024, 3, 1), date(2024, 3, 15))
                .processed_by(clerk),
        )
        .unwrap();
    assert_eq!(lib.db.get_borrowing(loan).unwrap().staff_id, Some(clerk));

    lib.db.delete_staff(clerk).unwrap();
    let record = lib.db.get_borrowing(loan).unwrap();
    assert!(record.staff_id.is_none());
    assert_eq!(record.status, BorrowingStatus::Borrowed);
}

#[test]
fn test_loan_delete_keeps_fines() {
    let mut lib = Library::open();
    let book = lib.book("9780553380163", "A Brief History of Time", 1);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    let fine = lib
        .db
        .add_fine(
            &NewFine::new(alice, FineType::Damage, money("4.00"), date(2024, 3, 12))
                .for_borrowing(loan),
        )
        .unwrap();

    lib.db.delete_borrowing(loan).unwrap();
    let fine = lib.db.get_fine(fine).unwrap();
    assert!(fine.borrowing_id.is_none());
    assert_eq!(fine.amount, money("4.00"));
    assert_eq!(lib.db.get_member(alice).unwrap().fine_balance, money("4.00"));
}

#[test]
fn test_credit_rows_follow_author_and_book() {
    let mut lib = Library::open();
    let omens = lib.book("9780060853983", "Good Omens", 1);
    let sandman = lib.book("9781401284770", "The Sandman", 1);
    let pratchett = lib.db.insert_author(&NewAuthor::new("Terry", "Pratchett")).unwrap();
    let gaiman = lib.db.insert_author(&NewAuthor::new("Neil", "Gaiman")).unwrap();
    for (book_id, author_id, author_order) in
        [(omens, pratchett, 1), (omens, gaiman, 2), (sandman, gaiman, 1)]
    {
        lib.db
            .add_book_author(BookAuthor {
                book_id,
                author_id,
                author_order,
            })
            .unwrap();
    }

    lib.db.delete_author(pratchett).unwrap();
    let credited: Vec<_> = lib
        .db
        .book_authors(omens)
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(credited, [gaiman]);

    lib.db.delete_book(omens).unwrap();
    let books: Vec<_> = lib
        .db
        .books_by_author(gaiman)
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(books, [sandman]);
}

#[test]
fn test_book_delete_cascades_circulation() {
    let mut lib = Library::open();
    let book = lib.book("9780062316097", "Sapiens", 2);
    let other = lib.book("9780553293357", "Foundation", 1);
    let alice = lib.member("M-1");
    let loan = lib.lend(alice, book).unwrap();
    let kept = lib.lend(alice, other).unwrap();
    let hold = lib
        .db
        .reserve_book(&NewReservation::new(alice, book, date(2024, 3, 1), date(2024, 3, 8)))
        .unwrap();

    lib.db.delete_book(book).unwrap();

    assert!(matches!(lib.db.get_book(book), Err(Error::NotFound { .. })));
    assert!(matches!(lib.db.get_borrowing(loan), Err(Error::NotFound { .. })));
    assert!(matches!(lib.db.get_reservation(hold), Err(Error::NotFound { .. })));
    assert_eq!(lib.db.list_member_loans(alice).unwrap().len(), 1);
    assert_eq!(lib.db.get_borrowing(kept).unwrap().book_id, other);
    assert_eq!(lib.counters(other), (0, 1));
}
