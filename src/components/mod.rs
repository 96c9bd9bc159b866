pub mod day_list;
pub mod help;
pub mod note_form;
pub mod status_bar;

pub use day_list::DayList;
pub use help::Help;
pub use note_form::NoteForm;
pub use status_bar::StatusBar;
