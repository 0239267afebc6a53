//! # similar-images CLI
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! similar-images scan ./cm-assets --pattern '_thumb\.'
//! similar-images scan ./cm-assets --threshold 4 --compose ./dups --output json
//! ```

mod cli;

use similar_images::Result;

fn main() -> Result<()> {
    cli::run()
}
