//! Format-specific text extraction.

use std::path::Path;

use tokio::process::Command;

use super::IngestError;

pub async fn load_plain_text(path: &Path) -> Result<String, IngestError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IngestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// Extract PDF text through the `pdftotext` system binary (poppler),
/// writing to stdout. No in-process PDF parsing.
pub async fn extract_pdf_text(path: &Path) -> Result<String, IngestError> {
    let output = Command::new("pdftotext")
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|err| IngestError::PdfExtract {
            path: path.to_path_buf(),
            reason: format!("failed to run pdftotext: {} (is poppler installed?)", err),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IngestError::PdfExtract {
            path: path.to_path_buf(),
            reason: stderr.trim().to_string(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(IngestError::PdfExtract {
            path: path.to_path_buf(),
            reason: "pdftotext produced no text output".to_string(),
        });
    }

    Ok(text)
}

pub async fn fetch_web_page(client: &reqwest::Client, url: &str) -> Result<String, IngestError> {
    let fetch_err = |source| IngestError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(fetch_err)?;
    let response = response.error_for_status().map_err(fetch_err)?;
    let html = response.text().await.map_err(fetch_err)?;

    Ok(strip_html_tags(&html))
}

/// Reduce an HTML page to its visible text: drops tags plus script and
/// style bodies, then collapses blank lines.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    let mut in_script = false;
    let mut in_style = false;

    let chars: Vec<char> = html.chars().collect();
    let chars_lower: Vec<char> = chars.iter().map(|c| c.to_ascii_lowercase()).collect();
    let starts_with = |from: usize, needle: &str| {
        from + needle.len() <= chars_lower.len()
            && chars_lower[from..from + needle.len()]
                .iter()
                .zip(needle.chars())
                .all(|(a, b)| *a == b)
    };

    let mut i = 0;
    while i < chars.len() {
        if starts_with(i, "<script") {
            in_script = true;
        } else if starts_with(i, "<style") {
            in_style = true;
        }

        if in_script && starts_with(i, "</script>") {
            in_script = false;
            i += "</script>".len();
            continue;
        }
        if in_style && starts_with(i, "</style>") {
            in_style = false;
            i += "</style>".len();
            continue;
        }

        if in_script || in_style {
            i += 1;
            continue;
        }

        let c = chars[i];
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag {
            result.push(c);
        }

        i += 1;
    }

    let lines: Vec<&str> = result
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    lines.join("\n")
}
