/// Viewer toolbars, banners and ads stripped before printing.
pub const UI_CHROME_SELECTORS: &[&str] = &[
    ".toolbar_top",
    ".toolbar_bottom",
    ".promo_banner",
    ".auto_hide_toolbar",
    "#global_header",
    ".scribd_header",
    ".inter_page_ad",
    ".between_page_ads",
];

/// Scroller whose classes and inline styles clip the first page when printing.
pub const SCROLLER_CLASS: &str = "document_scroller";

pub const REMOVE_UI_CHROME: &str = r#"
(selectors, scrollerClass) => {
    let removed = 0;
    for (const selector of selectors) {
        let el = null;
        try { el = document.querySelector(selector); } catch (e) {}
        if (el) { el.remove(); removed++; }
    }

    const scrollers = Array.from(document.getElementsByClassName(scrollerClass));
    for (const scroller of scrollers) {
        scroller.setAttribute('class', '');
        scroller.style.cssText = '';
    }

    document.body.style.overflow = 'visible';
    document.body.style.height = 'auto';
    document.documentElement.style.overflow = 'visible';
    document.documentElement.style.height = 'auto';
    return { removed, scrollers: scrollers.length };
}
"#;

pub const PRINT_CSS: &str = r#"
@media print {
  @page {
    margin: 0;
    size: auto;
  }

  .toolbar_top, .toolbar_bottom, .promo_banner,
  .auto_hide_toolbar, #global_header, .scribd_header,
  button, .k_ui_btn, .wrapper__gradient,
  .inter_page_ad, .google_ads, .between_page_ads {
    display: none !important;
  }

  [data-folio-overlay] {
    display: none !important;
  }
}
"#;

/// Deferred so the evaluation returns before the modal dialog blocks the page.
pub const OPEN_PRINT_DIALOG: &str = r#"
() => { setTimeout(() => window.print(), 0); return true; }
"#;
