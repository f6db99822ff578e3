//! Markdown to HTML rendering through event plugins.

mod plugin;
mod auto_heading;
mod highlight;
mod toc;
mod render;

pub use plugin::Plugin;
pub use auto_heading::{AutoHeading, HeadingAnchor};
pub use highlight::SyntaxHighlight;
pub use toc::{TableOfContents, TocEntry};
pub use render::{render, render_page, Page, RenderOptions};
