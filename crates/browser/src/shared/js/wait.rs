pub const CHECK_LOADING: &str = r#"
() => ({
    readyState: document.readyState,
    loading: document.readyState !== 'complete',
    activeRequests: performance.getEntriesByType('resource').filter(r => !r.responseEnd).length
})
"#;

/// Installs a document-wide MutationObserver on first use and returns the
/// number of mutation records seen so far.
pub const MUTATION_COUNT: &str = r#"
() => {
    if (!window.__folioMutations) {
        window.__folioMutations = { count: 0 };
        new MutationObserver(records => { window.__folioMutations.count += records.length; })
            .observe(document.documentElement, {
                childList: true, subtree: true, attributes: true, characterData: true
            });
    }
    return window.__folioMutations.count;
}
"#;
