//! Output generation for an issue.
//!
//! # Submodules
//!
//! - [`markdown`]: the Markdown digest in `out/`
//! - [`html`]: the static issue page and `index.html` in `site/`
//! - [`archive`]: the newest-first list of issues in `site/archive.html`
//!
//! # Output Structure
//!
//! ```text
//! out/
//! └── 2024-01-01_ALL.md
//!
//! site/
//! ├── 2024-01-01.html   # the issue (also the daily guard marker)
//! ├── index.html        # copy of the latest issue
//! ├── archive.html      # links to every issue, newest first
//! └── assets/
//!     └── custom.css
//! ```

pub mod archive;
pub mod html;
pub mod markdown;
