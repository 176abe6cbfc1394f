//! Script inliner

use super::{apply_or_absolutize, fetch_all, PassContext, PassReport, ResourceFetchError};
use crate::document::{get_node_attr, remove_node_attr, set_node_attr, PageDocument};
use crate::fetch::{FetchRequest, FetchResult};
use crate::url::{resolve_against, same_host};
use markup5ever_rcdom::Handle;

/// Attributes that only make sense for an external script
const EXTERNAL_ONLY_ATTRS: &[&str] = &["src", "integrity", "async", "defer"];

/// Keeps an inlined body from closing its own `<script>` element early
fn escape_script_body(body: &str) -> String {
    body.replace("</script", "<\\/script")
        .replace("</SCRIPT", "<\\/SCRIPT")
}

/// Inlines scripts served from the page's own host
///
/// Same-host scripts are fetched concurrently and their `<script src>` turned
/// into an inline `<script>`. Scripts from any other host are never fetched:
/// their `src` is only made absolute. A same-host script that cannot be
/// fetched, or comes back empty, falls back the same way.
pub async fn inline_scripts(doc: &PageDocument, ctx: &PassContext<'_>) -> PassReport {
    let mut report = PassReport::default();
    let mut jobs: Vec<(Handle, FetchRequest)> = Vec::new();

    for script in doc.elements("script") {
        let Some(src) = get_node_attr(&script, "src").filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        let script_url = match resolve_against(&src, &ctx.base) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Leaving script '{}' unchanged: {}", src, e);
                continue;
            }
        };

        if same_host(&script_url, &ctx.base) {
            jobs.push((
                script,
                FetchRequest::get(script_url.as_str(), ctx.config.resource_timeout()),
            ));
        } else {
            tracing::debug!("Not inlining cross-host script {}", script_url);
            set_node_attr(&script, "src", Some(script_url.as_str()));
            report.absolutized += 1;
        }
    }

    for (script, outcome) in fetch_all(ctx, jobs).await {
        let inline = |response: FetchResult| {
            let body = response.text();
            if body.is_empty() {
                return Err(ResourceFetchError::EmptyBody {
                    url: response.final_url.clone(),
                });
            }
            for attr in EXTERNAL_ONLY_ATTRS {
                remove_node_attr(&script, attr);
            }
            doc.set_text(&script, &escape_script_body(&body));
            Ok(())
        };

        apply_or_absolutize(&script, "src", &ctx.base, outcome, inline, &mut report);
    }

    report
}
