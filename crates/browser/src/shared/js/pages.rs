//! Scripts behind the Chromium document host.
//!
//! Selector errors are caught in the page and read as "no pages".
//! `window.__folioPages` holds the snapshot that scroll-by-index resolves against.

pub const DISCOVER: &str = r#"
(selector) => {
    let pages = [];
    try { pages = Array.from(document.querySelectorAll(selector)); } catch (e) {}
    window.__folioPages = pages;
    return pages.length;
}
"#;

pub const COUNT: &str = r#"
(selector) => {
    try { return document.querySelectorAll(selector).length; } catch (e) { return 0; }
}
"#;

pub const SAMPLE: &str = r#"
(selector) => {
    let pages = [];
    try { pages = Array.from(document.querySelectorAll(selector)); } catch (e) {}
    return pages.map(p => ({
        height: p.offsetHeight,
        hasImage: !!p.querySelector('img'),
        hasCanvas: !!p.querySelector('canvas'),
        hasSvg: !!p.querySelector('svg'),
        textLength: (p.textContent || '').trim().length
    }));
}
"#;

pub const SCROLL_PAGE: &str = r#"
(index) => {
    const el = (window.__folioPages || [])[index];
    if (!el) return false;
    el.scrollIntoView({ behavior: 'auto', block: 'center' });
    return true;
}
"#;

pub const SCROLL_BATCH: &str = r#"
(start, end) => {
    const pages = window.__folioPages || [];
    let scrolled = 0;
    for (let i = start; i < Math.min(end, pages.length); i++) {
        pages[i].scrollIntoView({ behavior: 'auto', block: 'center' });
        scrolled++;
    }
    return scrolled;
}
"#;

pub const SCROLL_HEIGHT: &str = r#"
() => document.body ? document.body.scrollHeight : 0
"#;

pub const SCROLL_TO_EDGE: &str = r#"
(edge) => {
    window.scrollTo(0, edge === 'top' ? 0 : document.body.scrollHeight);
    return true;
}
"#;
