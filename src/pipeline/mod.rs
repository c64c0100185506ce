//! Pipeline stages for document reconstruction.
//!
//! Each submodule implements exactly one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! text:    input ──▶ manifest ──▶ payload* ──▶ reassemble
//!          (id/URL)  (view page)  (fetch+decode) (ordered text)
//!
//! slides:  input ──▶ slides::fetch_listing ──▶ {fetch_slide ──▶ save_slide}*
//! ```
//!
//! 1. [`input`]      - resolve a bare id or view URL to a `DocumentId`
//! 2. [`manifest`]   - fetch the view page and recover the page manifest
//! 3. [`payload`]    - fetch each page and strip the `wenku_<n>(…)` envelope
//! 4. [`reassemble`] - concatenate segments in manifest order
//! 5. [`slides`]     - the presentation variant: listing, images, files
//!
//! [`transport`] and [`matcher`] are the shared leaves: one HTTP GET, one
//! exactly-one-match pattern extractor.

pub mod input;
pub mod manifest;
pub mod matcher;
pub mod payload;
pub mod reassemble;
pub mod slides;
pub mod transport;
