pub const CREATE_OVERLAY: &str = r#"
(id, title) => {
    const old = document.getElementById(id);
    if (old) old.remove();

    const div = document.createElement('div');
    div.id = id;
    div.setAttribute('data-folio-overlay', '');
    div.style.cssText = `
        position: fixed; top: 20px; right: 20px;
        background: #1a73e8; color: white;
        padding: 15px 20px; border-radius: 8px;
        box-shadow: 0 4px 12px rgba(0,0,0,0.2);
        z-index: 999999; font-family: sans-serif; font-size: 14px;
        max-width: 300px; transition: all 0.3s ease;`;

    const heading = document.createElement('div');
    heading.style.cssText = 'font-weight: bold; margin-bottom: 5px;';
    heading.textContent = title;

    const text = document.createElement('div');
    text.id = id + '-text';
    text.textContent = 'Initializing...';

    const track = document.createElement('div');
    track.style.cssText = 'margin-top: 8px; height: 4px; background: rgba(255,255,255,0.3); border-radius: 2px; overflow: hidden;';
    const bar = document.createElement('div');
    bar.id = id + '-bar';
    bar.style.cssText = 'width: 0%; height: 100%; background: white; transition: width 0.3s;';
    track.appendChild(bar);

    div.append(heading, text, track);
    document.body.appendChild(div);
    return true;
}
"#;

pub const UPDATE_OVERLAY: &str = r#"
(id, text, percent) => {
    const textEl = document.getElementById(id + '-text');
    const barEl = document.getElementById(id + '-bar');
    if (textEl) textEl.textContent = text;
    if (barEl && percent !== null) barEl.style.width = percent + '%';
    return !!textEl;
}
"#;
