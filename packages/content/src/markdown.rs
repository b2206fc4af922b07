use pulldown_cmark::{html, Options, Parser};

/// Split `---`-delimited front matter from the markdown body.
///
/// Returns `None` when the document does not open with a front matter block.
pub fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source
        .strip_prefix("---\r\n")
        .or_else(|| source.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((front, body));
        }
        offset += line.len();
    }
    None
}

/// Render a markdown body to HTML
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(body, options);
    let mut output = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_front_matter() {
        let source = "---\ntitle: Sprint 12\n---\n# Notes\n";
        let (front, body) = split_front_matter(source).unwrap();
        assert_eq!(front, "title: Sprint 12\n");
        assert_eq!(body, "# Notes\n");
    }

    #[test]
    fn test_split_front_matter_ignores_inline_dashes() {
        let source = "---\nsummary: before --- after\n---\nbody";
        let (front, body) = split_front_matter(source).unwrap();
        assert_eq!(front, "summary: before --- after\n");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_front_matter_requires_opening_fence() {
        assert!(split_front_matter("# Just markdown").is_none());
        assert!(split_front_matter("---\nnever closed\n").is_none());
    }

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("# Wins\n\n- ~~old~~ new");
        assert!(html.contains("<h1>Wins</h1>"));
        assert!(html.contains("<del>old</del>"));
    }
}
