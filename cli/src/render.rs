//! Plain-text rendering of the app's pages.

use book_core::{Book, Session};

pub fn login_required() -> String {
    "Login Required\nPlease login to access this page.".to_string()
}

pub fn status_line(session: Session) -> String {
    match session.user_id() {
        Some(id) => format!("Logged in as User ID {id}"),
        None => "Not logged in. Pass --email and --password to log in.".to_string(),
    }
}

pub fn book(book: &Book) -> String {
    format!("#{} \"{}\" by {}", book.id, book.title, book.author)
}

/// Books as an aligned ID / Title / Author table.
pub fn book_table(books: &[Book]) -> String {
    if books.is_empty() {
        return "No books found. Use `add` to get started.".to_string();
    }
    let ids: Vec<String> = books.iter().map(|b| b.id.to_string()).collect();
    let id_width = ids.iter().map(String::len).max().unwrap_or(0).max("ID".len());
    let title_width = books
        .iter()
        .map(|b| b.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("Title".len());

    let mut out = format!("{:<id_width$}  {:<title_width$}  Author", "ID", "Title");
    for (id, book) in ids.iter().zip(books) {
        out.push('\n');
        out.push_str(&format!("{id:<id_width$}  {:<title_width$}  {}", book.title, book.author));
    }
    out
}
