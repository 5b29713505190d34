//! Presentation of an ingested [`FileBatch`].
//!
//! [`combine`] builds the single document users copy or download: every
//! record under a `=== <id> ===` header, in batch order. [`render_html`]
//! wraps that document in a self-contained page with a read-only text view,
//! a clipboard button, a download link carrying the document as a base64
//! `data:` URL, and one collapsed section per file.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::ViewerConfig;
use crate::models::FileBatch;

#[derive(Debug, Clone)]
pub struct PresentOptions {
    /// File name offered by the download link.
    pub export_name: String,
    pub title: String,
}

impl PresentOptions {
    pub fn from_config(viewer: &ViewerConfig) -> Self {
        Self {
            export_name: viewer.export_name.clone(),
            title: "File Contents Viewer".to_string(),
        }
    }
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

pub fn file_header(id: &str) -> String {
    format!("=== {} ===", id)
}

/// All records in one document, each under its header line.
pub fn combine(batch: &FileBatch) -> String {
    let mut doc = String::new();
    for record in batch.iter() {
        doc.push_str(&file_header(&record.id));
        doc.push('\n');
        doc.push_str(&record.content.display_text());
        doc.push_str("\n\n");
    }
    doc
}

/// `data:` URL embedding `document` as base64 plain text.
pub fn export_link(document: &str) -> String {
    format!("data:text/plain;base64,{}", STANDARD.encode(document.as_bytes()))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Clipboard access can be refused (insecure origin, permissions); the
// failure is swallowed and the text area stays available for manual copy.
const COPY_SCRIPT: &str = r#"<script>
function copyCombined() {
  var text = document.getElementById('combined').value;
  try {
    if (navigator.clipboard) {
      navigator.clipboard.writeText(text).catch(function () {});
    } else {
      var area = document.getElementById('combined');
      area.select();
      document.execCommand('copy');
    }
  } catch (e) {}
}
</script>"#;

const STYLE: &str = "<style>\
body{font-family:sans-serif;margin:2rem;max-width:60rem}\
textarea{width:100%;height:24rem;font-family:monospace}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:.5rem}\
summary{cursor:pointer;font-family:monospace}\
</style>";

/// Full results page for `batch`.
pub fn render_html(batch: &FileBatch, options: &PresentOptions) -> String {
    let mut page = page_head(&options.title);

    if batch.is_empty() {
        page.push_str("<p>No files were loaded.</p>\n");
        page.push_str(&page_tail());
        return page;
    }

    let document = combine(batch);
    let summary = batch.summary();

    let _ = writeln!(
        page,
        "<p>{} file(s): {} text, {} binary, {} too large, {} unreadable.</p>",
        batch.len(),
        summary.text,
        summary.binary,
        summary.oversize,
        summary.errors
    );

    page.push_str("<h2>Combined contents</h2>\n");
    let _ = writeln!(
        page,
        "<textarea id=\"combined\" readonly>{}</textarea>",
        escape_html(&document)
    );
    page.push_str("<p><button type=\"button\" onclick=\"copyCombined()\">Copy to clipboard</button> ");
    let _ = writeln!(
        page,
        "<a id=\"download\" download=\"{}\" href=\"{}\">Download {}</a></p>",
        escape_html(&options.export_name),
        export_link(&document),
        escape_html(&options.export_name)
    );

    page.push_str("<h2>Individual files</h2>\n");
    for record in batch.iter() {
        let _ = writeln!(
            page,
            "<details><summary>{} ({} bytes)</summary><pre>{}</pre></details>",
            escape_html(&record.id),
            record.size,
            escape_html(&record.content.display_text())
        );
    }

    page.push_str(COPY_SCRIPT);
    page.push('\n');
    page.push_str(&page_tail());
    page
}

/// The two input forms served at `/`.
pub fn render_index(title: &str) -> String {
    let mut page = page_head(title);
    page.push_str(
        "<h2>Upload files</h2>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"files\" multiple> <button type=\"submit\">Show contents</button>\
         </form>\n\
         <h2>Or read a folder</h2>\n\
         <form action=\"/folder\" method=\"post\">\
         <input type=\"text\" name=\"path\" size=\"60\" placeholder=\"/path/to/folder\"> \
         <button type=\"submit\">Load folder</button>\
         </form>\n",
    );
    page.push_str(&page_tail());
    page
}

/// Minimal page carrying an error message.
pub fn render_error(title: &str, message: &str) -> String {
    let mut page = page_head(title);
    let _ = writeln!(page, "<p class=\"error\">{}</p>", escape_html(message));
    page.push_str("<p><a href=\"/\">Back</a></p>\n");
    page.push_str(&page_tail());
    page
}

fn page_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{t}</title>{style}</head>\n<body>\n<h1>{t}</h1>\n",
        t = escape_html(title),
        style = STYLE
    )
}

fn page_tail() -> String {
    format!(
        "<footer><small>Generated {}</small></footer>\n</body></html>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
