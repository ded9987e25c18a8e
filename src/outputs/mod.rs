//! Output generation for audit lists and rendered articles.
//!
//! # Submodules
//!
//! - [`link_lists`]: Writes the unfiltered and filtered link lists as CSV
//! - [`pdf`]: Lays out article text on A4 pages and saves it as PDF
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── all_links.csv
//! ├── filtered_links.csv
//! ├── 2016-12-19_01_politik_berlin-lkw-rast.pdf
//! └── 2016-12-19_02_panorama_anschlag-in-berlin.pdf
//! ```

pub mod link_lists;
pub mod pdf;
