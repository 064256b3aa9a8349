pub const INJECT_STYLE: &str = r#"
(id, css) => {
    let style = document.getElementById(id);
    if (!style) {
        style = document.createElement('style');
        style.id = id;
        document.head.appendChild(style);
    }
    style.textContent = css;
    return true;
}
"#;

pub const REMOVE_BY_ID: &str = r#"
(id) => {
    const el = document.getElementById(id);
    if (el) el.remove();
    return !!el;
}
"#;
