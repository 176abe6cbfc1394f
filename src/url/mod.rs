//! URL handling module for PageLock
//!
//! This module provides reference resolution against a page base, target URL
//! normalization, origin comparison and crawl canonicalization.

mod normalize;
mod origin;
mod resolve;

pub use normalize::{canonicalize, normalize_target_url};
pub use origin::{origin_root, same_host, same_origin};
pub use resolve::{absolutize_srcset, is_fragment_only, resolve, resolve_against};
