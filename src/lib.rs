//! # rs-patterns
//!
//! Detects repeated record structures in arbitrary HTML (product cards,
//! list items, search results) without site-specific rules, and extracts the
//! fields that vary between repetitions as structured records.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_patterns::detect;
//!
//! let html = r#"<section>
//!   <div class="card"><h3>Title 1</h3><span data-id="1">Price 1</span></div>
//!   <div class="card"><h3>Title 2</h3><span data-id="2">Price 2</span></div>
//!   <div class="card"><h3>Title 3</h3><span data-id="3">Price 3</span></div>
//! </section>"#;
//!
//! let report = detect(html)?;
//! assert_eq!(report.containers[0].container_tag, "section");
//! assert_eq!(report.instances[0].instances.len(), 3);
//! # Ok::<(), rs_patterns::Error>(())
//! ```
//!
//! ## How it works
//!
//! 1. **Discovery**: every element with enough element children is a
//!    candidate container; nested candidates collapse to the outermost.
//! 2. **Grouping**: a strategy picks the container's units, either the
//!    dominant structural-fingerprint group or all children.
//! 3. **Classification**: each field key (`relative-key@attribute`) is
//!    shared, variable or noise over the units.
//! 4. **Extraction**: one record per unit with every variable field;
//!    containers are deduplicated by canonical address and ranked.

mod error;
mod extract;
mod options;
mod result;

/// Document parsing and the immutable arena snapshot.
pub mod dom;

/// Canonical addresses, CSS paths and structural fingerprints.
pub mod path;

/// Attribute and text collection into field keys.
pub mod collect;

/// Container candidate discovery and nested suppression.
pub mod discovery;

/// Grouping and classification strategies.
pub mod strategy;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use collect::FieldKey;
pub use dom::Tree;
pub use error::{Error, Result};
pub use options::{
    DuplicateKeyPolicy, KeyStyle, NestingScope, Options, StrategyKind, DEFAULT_CONTAINER_TAGS,
};
pub use path::CanonicalAddress;
pub use result::{
    ContainerResult, DetectionReport, FieldValue, InstanceGroup, InstanceRecord,
    NOT_FOUND, NO_PATTERNS_WARNING,
};
pub use strategy::{FieldClass, FieldStatistic};

/// Detects repeated patterns in an HTML document using default options.
///
/// # Example
///
/// ```rust
/// use rs_patterns::detect;
///
/// let report = detect("<p>No repetition here</p>")?;
/// assert!(report.is_empty());
/// # Ok::<(), rs_patterns::Error>(())
/// ```
pub fn detect(html: &str) -> Result<DetectionReport> {
    detect_with_options(html, &Options::default())
}

/// Detects repeated patterns in an HTML document with custom options.
///
/// # Example
///
/// ```rust
/// use rs_patterns::{detect_with_options, Options};
///
/// let html = "<ul><li><a href='/a'>A</a></li><li><a href='/b'>B</a></li></ul>";
/// let report = detect_with_options(html, &Options::statistical())?;
/// assert_eq!(report.containers[0].unit_count, 2);
/// # Ok::<(), rs_patterns::Error>(())
/// ```
pub fn detect_with_options(html: &str, options: &Options) -> Result<DetectionReport> {
    detect_tree(&Tree::parse(html), options)
}

/// Detects repeated patterns in an already parsed `dom_query` document.
pub fn detect_document(document: &dom::Document, options: &Options) -> Result<DetectionReport> {
    detect_tree(&Tree::from_document(document), options)
}

/// Detects repeated patterns in a snapshot.
///
/// Running twice on the same snapshot yields identical reports.
pub fn detect_tree(tree: &Tree, options: &Options) -> Result<DetectionReport> {
    extract::detect_patterns(tree, options)
}

/// Detects repeated patterns in HTML bytes with automatic encoding detection.
///
/// # Example
///
/// ```rust
/// use rs_patterns::detect_bytes;
///
/// let html = b"<meta charset=\"ISO-8859-1\"><ol><li>Caf\xE9</li><li>Th\xE9</li><li>Lait</li></ol>";
/// let report = detect_bytes(html)?;
/// let record = &report.instances[0].instances[0];
/// assert_eq!(record.iter().next().unwrap().1.as_str(), Some("Café"));
/// # Ok::<(), rs_patterns::Error>(())
/// ```
pub fn detect_bytes(html: &[u8]) -> Result<DetectionReport> {
    detect_bytes_with_options(html, &Options::default())
}

/// Detects repeated patterns in HTML bytes with custom options.
///
/// Malformed byte sequences are replaced with U+FFFD; the report then
/// carries a warning naming the encoding used.
pub fn detect_bytes_with_options(html: &[u8], options: &Options) -> Result<DetectionReport> {
    let decoded = encoding::decode_html(html);
    let mut report = detect_with_options(&decoded.text, options)?;

    if decoded.had_errors {
        tracing::warn!(encoding = decoded.encoding, "malformed byte sequences replaced");
        report.warnings.push(format!(
            "Malformed byte sequences replaced while decoding as {}",
            decoded.encoding
        ));
    }

    Ok(report)
}
