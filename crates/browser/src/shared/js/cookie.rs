/// Consent buttons tried in order before falling back to text matching.
pub const CONSENT_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "button[id*=\"accept\"]",
    "button[id*=\"Accept\"]",
    ".cookie-accept",
    "[data-testid=\"cookie-accept\"]",
    "button[class*=\"accept\"]",
    "button[class*=\"Accept\"]",
];

/// Lowercase fragments of consent button labels (English and French).
pub const CONSENT_TEXT_PATTERNS: &[&str] = &["accept", "accepter", "agree"];

/// Called on an element handle; a detached or `display: none` element has no offsetParent.
/// Serialized so the result comes back by value.
pub const PROBE_ELEMENT: &str = r#"
function() {
    return JSON.stringify({ visible: this.offsetParent !== null, text: (this.textContent || '').trim() });
}
"#;

pub const CLICK_ELEMENT: &str = r#"
function() { this.click(); return true; }
"#;
