/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

// The ISBN and email CHECK patterns must stay in step with
// `model::isbn::ISBN_PATTERN` and `model::email::EMAIL_PATTERN`.
const MIGRATION_001: &str = r#"
-- Authors
CREATE TABLE IF NOT EXISTS authors (
    author_id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birth_date TEXT,
    death_date TEXT,
    nationality TEXT,
    biography TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (death_date IS NULL OR birth_date IS NULL OR death_date >= birth_date)
);

-- Publishers
CREATE TABLE IF NOT EXISTS publishers (
    publisher_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    address TEXT,
    phone TEXT,
    email TEXT CHECK (email IS NULL OR email REGEXP '^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$'),
    website TEXT,
    established_year INTEGER CHECK (established_year IS NULL OR established_year > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Categories (parent-pointer tree)
CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    parent_category_id INTEGER REFERENCES categories(category_id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Books
CREATE TABLE IF NOT EXISTS books (
    book_id INTEGER PRIMARY KEY AUTOINCREMENT,
    isbn TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    subtitle TEXT,
    publisher_id INTEGER REFERENCES publishers(publisher_id) ON DELETE SET NULL,
    category_id INTEGER NOT NULL REFERENCES categories(category_id) ON DELETE RESTRICT,
    publication_year INTEGER,
    edition TEXT,
    pages INTEGER CHECK (pages IS NULL OR pages > 0),
    language TEXT NOT NULL DEFAULT 'English',
    description TEXT,
    location TEXT,
    acquisition_date TEXT,
    price_cents INTEGER CHECK (price_cents IS NULL OR price_cents >= 0),
    total_copies INTEGER NOT NULL DEFAULT 1 CHECK (total_copies >= 0),
    available_copies INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (available_copies >= 0 AND available_copies <= total_copies),
    CHECK (isbn REGEXP '^([0-9]{9}[0-9X]|[0-9]{13}|97[89]-[0-9]{1,5}-[0-9]{1,7}-[0-9]{1,6}-[0-9])$'
           AND (instr(isbn, '-') = 0 OR length(replace(isbn, '-', '')) = 13))
);

-- Book authors (many-to-many, ordered)
CREATE TABLE IF NOT EXISTS book_authors (
    book_id INTEGER NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES authors(author_id) ON DELETE CASCADE,
    author_order INTEGER NOT NULL DEFAULT 1 CHECK (author_order > 0),
    PRIMARY KEY (book_id, author_id)
);

-- Members
CREATE TABLE IF NOT EXISTS members (
    member_id INTEGER PRIMARY KEY AUTOINCREMENT,
    membership_number TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
        CHECK (email REGEXP '^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$'),
    phone TEXT,
    address TEXT,
    date_of_birth TEXT,
    membership_type TEXT NOT NULL
        CHECK (membership_type IN ('Student', 'Faculty', 'Staff', 'Public')),
    membership_start TEXT NOT NULL,
    membership_end TEXT,
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    fine_balance_cents INTEGER NOT NULL DEFAULT 0 CHECK (fine_balance_cents >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (membership_end IS NULL OR membership_end >= membership_start)
);

-- Staff
CREATE TABLE IF NOT EXISTS staff (
    staff_id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
        CHECK (email REGEXP '^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$'),
    phone TEXT,
    position TEXT NOT NULL,
    hire_date TEXT NOT NULL,
    salary_cents INTEGER CHECK (salary_cents IS NULL OR salary_cents >= 0),
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Borrowing records
CREATE TABLE IF NOT EXISTS borrowing_records (
    borrowing_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL REFERENCES members(member_id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    staff_id INTEGER REFERENCES staff(staff_id) ON DELETE SET NULL,
    borrow_date TEXT NOT NULL,
    due_date TEXT NOT NULL,
    return_date TEXT,
    status TEXT NOT NULL DEFAULT 'Borrowed'
        CHECK (status IN ('Borrowed', 'Returned', 'Overdue', 'Lost')),
    renewal_count INTEGER NOT NULL DEFAULT 0 CHECK (renewal_count BETWEEN 0 AND 5),
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (due_date >= borrow_date),
    CHECK (return_date IS NULL OR return_date >= borrow_date)
);

-- Reservations
CREATE TABLE IF NOT EXISTS reservations (
    reservation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL REFERENCES members(member_id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    reservation_date TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Active'
        CHECK (status IN ('Active', 'Fulfilled', 'Cancelled', 'Expired')),
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (expiry_date >= reservation_date),
    UNIQUE (member_id, book_id, status)
);

-- Fines
CREATE TABLE IF NOT EXISTS fines (
    fine_id INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id INTEGER NOT NULL REFERENCES members(member_id) ON DELETE CASCADE,
    borrowing_id INTEGER REFERENCES borrowing_records(borrowing_id) ON DELETE SET NULL,
    fine_type TEXT NOT NULL
        CHECK (fine_type IN ('Overdue', 'Lost Book', 'Damage', 'Processing Fee')),
    amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
    paid_amount_cents INTEGER NOT NULL DEFAULT 0,
    fine_date TEXT NOT NULL,
    paid_date TEXT,
    status TEXT NOT NULL DEFAULT 'Pending'
        CHECK (status IN ('Pending', 'Paid', 'Waived', 'Partial')),
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (paid_amount_cents >= 0 AND paid_amount_cents <= amount_cents),
    CHECK (paid_date IS NULL OR paid_date >= fine_date)
);
"#;

const MIGRATION_002: &str = r#"
-- Name search
CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(last_name, first_name);
CREATE INDEX IF NOT EXISTS idx_members_name ON members(last_name, first_name);
CREATE INDEX IF NOT EXISTS idx_staff_name ON staff(last_name, first_name);
CREATE INDEX IF NOT EXISTS idx_members_email_lower ON members(lower(email));
CREATE INDEX IF NOT EXISTS idx_books_title ON books(title);

-- Foreign key lookups
CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_category_id);
CREATE INDEX IF NOT EXISTS idx_books_category ON books(category_id);
CREATE INDEX IF NOT EXISTS idx_books_publisher ON books(publisher_id);
CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors(author_id);
CREATE INDEX IF NOT EXISTS idx_borrowing_member ON borrowing_records(member_id);
CREATE INDEX IF NOT EXISTS idx_borrowing_book ON borrowing_records(book_id);
CREATE INDEX IF NOT EXISTS idx_borrowing_staff ON borrowing_records(staff_id);
CREATE INDEX IF NOT EXISTS idx_reservations_book ON reservations(book_id);
CREATE INDEX IF NOT EXISTS idx_fines_member ON fines(member_id);
CREATE INDEX IF NOT EXISTS idx_fines_borrowing ON fines(borrowing_id);

-- Date ranges
CREATE INDEX IF NOT EXISTS idx_borrowing_dates ON borrowing_records(borrow_date, due_date);
CREATE INDEX IF NOT EXISTS idx_borrowing_status_due ON borrowing_records(status, due_date);
CREATE INDEX IF NOT EXISTS idx_reservations_dates ON reservations(reservation_date, expiry_date);
CREATE INDEX IF NOT EXISTS idx_fines_date ON fines(fine_date);

-- Full-text search over book text; rowid is books.book_id
CREATE VIRTUAL TABLE IF NOT EXISTS books_fts USING fts5(title, subtitle, description);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "search_indexes",
        sql: MIGRATION_002,
    },
];
