/// Normalises a document body into its canonical text form.
///
/// Line endings become `\n`, trailing whitespace is dropped, runs of blank
/// lines collapse to one, and leading/trailing blank lines are removed. Lines
/// inside fenced code blocks keep their content. A non-empty result always
/// ends with exactly one newline. Applying the pass twice changes nothing.
pub fn normalize_body(body: &str) -> String {
    let unified = body.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<&str> = Vec::new();
    let mut fence: Option<&str> = None;

    for line in unified.split('\n') {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
                out.push(line.trim_end());
            } else {
                out.push(line);
            }
            continue;
        }

        if let Some(marker) = fence_marker(trimmed) {
            fence = Some(marker);
            out.push(line.trim_end());
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }

    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        return String::new();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn fence_marker(trimmed: &str) -> Option<&'static str> {
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}
