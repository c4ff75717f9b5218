//! Book list store.
//!
//! Holds the books in server response order. A refresh replaces the list
//! wholesale. Mutations wait for the server to confirm, then apply the
//! returned record locally so the list stays current without a second
//! round trip. A failed call never touches the list.

use crate::client::BookClient;
use crate::error::ApiError;
use crate::http::{send, Transport};
use crate::types::{Book, BookId, BookInput, BookPatch};
use crate::validate::{validate_book, validate_patch};

#[derive(Debug, Default)]
pub struct BookList {
    books: Vec<Book>,
}

impl BookList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Linear scan; lists are small.
    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn clear(&mut self) {
        self.books.clear();
    }

    /// Fetch the books (optionally filtered) and replace the local list.
    pub fn refresh<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        search: Option<&str>,
    ) -> Result<(), ApiError> {
        let response = send(transport, client.build_list_books(search))?;
        self.books = client.parse_list_books(response)?;
        tracing::info!(count = self.books.len(), "book list replaced");
        Ok(())
    }

    /// Fetch a single book. The local list is not consulted or changed.
    pub fn get<T: Transport + ?Sized>(
        &self,
        client: &BookClient,
        transport: &mut T,
        id: BookId,
    ) -> Result<Book, ApiError> {
        let response = send(transport, client.build_get_book(id))?;
        client.parse_get_book(response)
    }

    pub fn add<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        input: &BookInput,
    ) -> Result<Book, ApiError> {
        validate_book(input)?;
        let response = send(transport, client.build_create_book(input)?)?;
        let created = client.parse_create_book(response)?;
        tracing::info!(id = created.id, "book created");
        self.books.push(created.clone());
        Ok(created)
    }

    pub fn update<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        id: BookId,
        patch: &BookPatch,
    ) -> Result<Book, ApiError> {
        validate_patch(patch)?;
        let response = send(transport, client.build_update_book(id, patch)?)?;
        let updated = client.parse_update_book(response)?;
        tracing::info!(id, "book updated");
        for book in self.books.iter_mut().filter(|b| b.id == id) {
            *book = updated.clone();
        }
        Ok(updated)
    }

    pub fn remove<T: Transport + ?Sized>(
        &mut self,
        client: &BookClient,
        transport: &mut T,
        id: BookId,
    ) -> Result<(), ApiError> {
        let response = send(transport, client.build_delete_book(id))?;
        client.parse_delete_book(response)?;
        tracing::info!(id, "book deleted");
        self.books.retain(|b| b.id != id);
        Ok(())
    }
}
