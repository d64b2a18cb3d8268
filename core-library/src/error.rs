use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Book {book_id} already has a tag named '{name}'")]
    DuplicateTag { book_id: String, name: String },
}

impl LibraryError {
    pub(crate) fn book_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Book".to_string(),
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
