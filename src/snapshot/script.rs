//! In-page extraction script
//!
//! Installed on every worker before any navigation so that
//! `__shioriSnapshot()` is callable as soon as a document exists. The
//! script must stay dependency-free and synchronous: it runs inside
//! arbitrary third-party pages.

/// JavaScript installed via `Page.addScriptToEvaluateOnNewDocument`.
///
/// `__shioriSnapshot()` returns `{ title, href, html, text, imgs }`;
/// image briefs carry displayed and intrinsic dimensions plus the load
/// flag so the formatter can reason about them without another round trip.
pub const SNAPSHOT_SCRIPT: &str = r#"
function __shioriBriefImgs(scope) {
    const imageTags = Array.from((scope || document).querySelectorAll('img[src]'));

    return imageTags.map((x) => ({
        src: x.src,
        loaded: x.complete,
        width: x.width,
        height: x.height,
        naturalWidth: x.naturalWidth,
        naturalHeight: x.naturalHeight,
        alt: x.alt || x.title || undefined,
    }));
}

function __shioriSnapshot() {
    return {
        title: document.title || '',
        href: document.location.href,
        html: document.documentElement ? document.documentElement.outerHTML : '',
        text: document.body ? document.body.innerText : '',
        imgs: __shioriBriefImgs(document.body),
    };
}
"#;

/// Expression the worker evaluates to pull a snapshot out of the page.
pub const SNAPSHOT_EXPRESSION: &str = "__shioriSnapshot()";

/// Name of the host binding reserved for push-based extraction, where the
/// page reports a snapshot on its own instead of being polled.
pub const SNAPSHOT_BINDING: &str = "__shioriDeliverSnapshot";
