//! Zip packaging of a site clone

use crate::cloner::CloneResult;
use crate::ArchiveError;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use url::Url;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry name for the root page
pub const INDEX_ENTRY: &str = "index.html";

/// Packs cloned pages into a zip archive, one entry per page
///
/// Entries keep the order of `results`. Entry names come from [`slug_for`];
/// a name already taken gets a numeric suffix. An empty slice produces a
/// valid, empty archive.
pub fn pack(results: &[CloneResult]) -> Result<Vec<u8>, ArchiveError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut used = HashSet::new();

        for result in results {
            let name = unique_name(slug_for(&result.source_url), &mut used);
            tracing::debug!("Adding {} as {}", result.source_url, name);
            writer.start_file(name, options)?;
            writer.write_all(result.html.as_bytes())?;
        }

        writer.finish()?;
    }
    Ok(buffer.into_inner())
}

/// Filesystem-safe entry name for a page URL
///
/// The root path maps to `index.html`. Other paths join their segments with
/// `-`, and a query string is kept after `_`, so `/docs/intro?lang=en` becomes
/// `docs-intro_lang_en.html`.
///
/// # Examples
///
/// ```
/// use pagelock::archive::slug_for;
///
/// assert_eq!(slug_for("https://x.com/"), "index.html");
/// assert_eq!(slug_for("https://x.com/blog/post-1.html"), "blog-post-1.html");
/// ```
pub fn slug_for(source_url: &str) -> String {
    let (path, query) = match Url::parse(source_url) {
        Ok(url) => (url.path().to_string(), url.query().map(str::to_string)),
        Err(_) => (source_url.to_string(), None),
    };

    let mut stem = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize)
        .collect::<Vec<_>>()
        .join("-");

    for extension in [".html", ".htm"] {
        if let Some(stripped) = stem.strip_suffix(extension) {
            stem = stripped.to_string();
            break;
        }
    }
    if stem.is_empty() {
        stem = "index".to_string();
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        stem.push('_');
        stem.push_str(&sanitize(&query));
    }

    format!("{}.html", stem)
}

/// Download name for a site archive, `example.com.zip` for `https://example.com/...`
pub fn archive_name_for(target_url: &str) -> String {
    crate::url::normalize_target_url(target_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| format!("{}.zip", host)))
        .unwrap_or_else(|| "site.zip".to_string())
}

/// Replaces everything outside `[A-Za-z0-9._-]` with `_`
fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Never emit a relative path component
    if cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_")
    } else {
        cleaned
    }
}

fn unique_name(slug: String, used: &mut HashSet<String>) -> String {
    if used.insert(slug.clone()) {
        return slug;
    }

    let stem = slug.strip_suffix(".html").unwrap_or(&slug).to_string();
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.html", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
