//! Markdown to a styled, print-ready HTML document

use pulldown_cmark::{Options, Parser, html};

const REPORT_STYLES: &str = r#"
@page {
    size: A4;
    margin: 20mm 18mm 25mm 18mm;
    @bottom-left {
        content: "{footer}";
        font-family: 'Helvetica Neue', Arial, sans-serif;
        font-size: 8pt;
        color: #777777;
    }
    @bottom-right {
        content: "Page " counter(page) " of " counter(pages);
        font-family: 'Helvetica Neue', Arial, sans-serif;
        font-size: 8pt;
        color: #777777;
    }
}
body {
    font-family: 'Helvetica Neue', Arial, sans-serif;
    font-size: 10.5pt;
    line-height: 1.55;
    color: #222222;
}
h1, h2, h3, h4, h5, h6 {
    color: #1A3A6D;
    margin-top: 2em;
    margin-bottom: 0.8em;
    line-height: 1.25;
    page-break-after: avoid;
    font-weight: 300;
}
h1 {
    font-size: 22pt;
    font-weight: 500;
    color: #102A52;
    border-bottom: 1.5pt solid #1A3A6D;
    padding-bottom: 0.4em;
    margin-top: 0;
}
h2 {
    font-size: 17pt;
    font-weight: 400;
    border-bottom: 0.75pt solid #AEC8E5;
    padding-bottom: 0.3em;
}
h3 { font-size: 13pt; font-weight: 500; color: #2D5A8D; }
h4 { font-size: 11pt; font-weight: 500; color: #333333; font-style: italic; }
p { margin-bottom: 1em; hyphens: auto; }
a { color: #0056b3; text-decoration: none; }
ul, ol { margin-bottom: 1em; padding-left: 1.5em; }
li { margin-bottom: 0.5em; }
table {
    width: 100%;
    border-collapse: collapse;
    margin: 1.2em 0 1.8em 0;
    font-size: 9.5pt;
    page-break-inside: avoid;
    border-top: 1.5pt solid #4A6C8E;
    border-bottom: 1pt solid #4A6C8E;
}
th, td {
    border-bottom: 0.5pt solid #DDE5ED;
    padding: 10px 8px;
    text-align: left;
    vertical-align: top;
}
th { background-color: #F0F4F8; font-weight: 500; }
pre, code { font-family: Menlo, Consolas, monospace; font-size: 9pt; }
pre {
    background-color: #F6F8FA;
    padding: 10px;
    border-left: 3px solid #AEC8E5;
    white-space: pre-wrap;
    page-break-inside: avoid;
}
blockquote {
    margin: 1em 0;
    padding-left: 1em;
    border-left: 3px solid #AEC8E5;
    color: #555555;
}
"#;

/// A complete HTML document built from report markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledDocument {
    html: String,
}

impl StyledDocument {
    /// Convert `markdown` and wrap it with the report stylesheet.
    ///
    /// Tables, fenced code, strikethrough, task lists and smart
    /// punctuation are enabled.
    pub fn from_markdown(title: &str, markdown: &str, footer: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let mut body = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut body, Parser::new_ext(markdown, options));

        let styles = REPORT_STYLES.replace("{footer}", &css_string(footer));
        let html = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(title),
            styles,
            body
        );
        Self { html }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.html.into_bytes()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Contents of a double-quoted CSS string
fn css_string(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            '<' => vec![' '],
            _ => vec![c],
        })
        .collect()
}
