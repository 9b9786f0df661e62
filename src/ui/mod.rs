pub mod autocomplete;
pub mod components;
pub mod compose;
pub mod debounce;
pub mod form;
pub mod layout;
pub mod tui;
