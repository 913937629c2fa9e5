//! # gallery-index CLI
//!
//! Command-line interface for the gallery indexer.
//!
//! ## Usage
//! ```bash
//! gallery-index scan ~/Pictures
//! gallery-index scan ~/Pictures --verbose --output json
//! gallery-index cache stats
//! ```

mod cli;

use gallery_indexer::Result;

fn main() -> Result<()> {
    gallery_indexer::init_tracing();
    cli::run()
}
