pub mod db;
pub mod note;
pub mod store;

pub use db::NotesDb;
pub use note::{Note, NoteUpdate};
pub use store::NotesStore;
