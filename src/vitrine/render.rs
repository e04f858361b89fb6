//! HTML views.
//!
//! Handlers describe what to show with a [`View`] and hand it to a
//! [`Renderer`]; [`MaudRenderer`] is the built-in implementation.

use maud::{html, Markup, DOCTYPE};

use super::files::Page;

/// Everything a page needs, by view.
#[derive(Debug)]
pub enum View<'a> {
    Login {
        error: Option<&'a str>,
        default_root: Option<&'a str>,
    },
    Folders {
        username: &'a str,
        folders: &'a [String],
    },
    Gallery {
        username: &'a str,
        /// Root-relative folder path, `/`-separated.
        folder: &'a str,
        page: &'a Page,
    },
}

pub trait Renderer: Send + Sync {
    fn render(&self, view: &View<'_>) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MaudRenderer;

impl Renderer for MaudRenderer {
    fn render(&self, view: &View<'_>) -> String {
        match view {
            View::Login {
                error,
                default_root,
            } => login(*error, *default_root),
            View::Folders { username, folders } => folder_list(username, folders),
            View::Gallery {
                username,
                folder,
                page,
            } => gallery(username, folder, page),
        }
        .into_string()
    }
}

/// Percent-encode each segment of a `/`-separated relative path.
#[must_use]
pub fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[must_use]
pub fn gallery_url(folder: &str, page: usize) -> String {
    let encoded = encode_path(folder);
    if encoded.is_empty() {
        format!("/gallery?page={page}")
    } else {
        format!("/gallery/{encoded}?page={page}")
    }
}

#[must_use]
pub fn view_url(file: &str) -> String {
    format!("/view/{}", encode_path(file))
}

#[must_use]
pub fn delete_url(file: &str) -> String {
    format!("/files/{}", encode_path(file))
}

fn join_folder(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn layout(title: &str, username: Option<&str>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Vitrine" }
                link rel="stylesheet" href="/static/style.css";
            }
            body {
                header {
                    a class="brand" href="/" { "Vitrine" }
                    @if let Some(username) = username {
                        span class="user" { (username) }
                        a class="logout" href="/logout" { "Log out" }
                    }
                }
                main { (body) }
                script src="/static/gallery.js" {}
            }
        }
    }
}

fn login(error: Option<&str>, default_root: Option<&str>) -> Markup {
    layout(
        "Log in",
        None,
        html! {
            form class="login" method="post" action="/login" {
                @if let Some(error) = error {
                    p class="error" { (error) }
                }
                label { "Username" input type="text" name="username" autocomplete="username" required; }
                label { "Password" input type="password" name="password" autocomplete="current-password" required; }
                label {
                    "Folder"
                    input type="text" name="requested_root" value=(default_root.unwrap_or_default())
                        placeholder="/path/to/pictures";
                }
                button type="submit" { "Log in" }
            }
        },
    )
}

fn folder_list(username: &str, folders: &[String]) -> Markup {
    layout(
        "Folders",
        Some(username),
        html! {
            h1 { "Folders" }
            @if folders.is_empty() {
                p class="empty" { "No folders here." }
            } @else {
                ul class="folders" {
                    @for folder in folders {
                        li { a href=(gallery_url(folder, 1)) { (folder) } }
                    }
                }
            }
        },
    )
}

fn gallery(username: &str, folder: &str, page: &Page) -> Markup {
    layout(
        folder,
        Some(username),
        html! {
            h1 { (folder) }
            @if !page.subfolders.is_empty() {
                ul class="folders" {
                    @for sub in &page.subfolders {
                        li { a href=(gallery_url(&join_folder(folder, sub), 1)) { (sub) } }
                    }
                }
            }
            @if page.items.is_empty() {
                p class="empty" { "No images on this page." }
            } @else {
                div class="grid" {
                    @for item in &page.items {
                        figure {
                            a href=(view_url(item)) {
                                img src=(view_url(item)) alt=(file_name(item)) loading="lazy";
                            }
                            figcaption {
                                (file_name(item))
                                button type="button" class="delete" data-url=(delete_url(item)) { "Delete" }
                            }
                        }
                    }
                }
            }
            nav class="pager" {
                @if page.has_prev {
                    a class="prev" href=(gallery_url(folder, page.page_number - 1)) { "Previous" }
                }
                span { "Page " (page.page_number) " of " (page.page_count().max(1)) }
                @if page.has_next {
                    a class="next" href=(gallery_url(folder, page.page_number + 1)) { "Next" }
                }
            }
        },
    )
}
