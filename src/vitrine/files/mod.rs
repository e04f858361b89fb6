//! Filesystem access confined to a session's authorized root.

pub mod confine;
pub mod listing;

pub use confine::{confine, ConfinedPath, PathError};
pub use listing::{
    list_folders, list_page, paginate, ExtensionCase, ListError, Page, IMAGE_EXTENSIONS,
    ITEMS_PER_PAGE,
};
