//! # Vitrine (authenticated image gallery)
//!
//! `vitrine` serves a directory tree of images over HTTP behind a login. Each
//! session is bound to a filesystem root chosen at login time, and every path
//! supplied by a request is resolved against that root before the filesystem
//! is touched.
//!
//! ## Sessions
//!
//! A session lives entirely in the client: the `access_token` cookie carries
//! an HMAC-SHA256 signed token holding the username, the authorized root and
//! an expiry. There is no server-side session store, so any number of
//! instances sharing the same secret key can serve the same users.
//!
//! ## Confinement
//!
//! Request paths are canonicalized (`.`, `..` and symlinks resolved) and must
//! land on the authorized root or one of its descendants, compared component
//! by component. Anything else is answered with `404 Not Found` so the
//! service never confirms what exists outside the root.

pub mod cli;
pub mod vitrine;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
