//! Workshop content cache discovery.
//!
//! # Cache Layout
//!
//! ```text
//! steamapps/workshop/content/211820/
//! ├── 5001/
//! │   ├── contents.pak      # main archive, renamed to "<title>.pak"
//! │   └── extra.pak         # moved under its own name
//! └── 7002/
//!     └── patch.pak         # no main archive: everything moves as-is
//! ```

pub mod scanner;

pub use scanner::{
    classify, Classified, InvalidNoisePattern, ScanIssue, ScanOutcome, ScannerConfig,
    WorkshopScanner,
};
