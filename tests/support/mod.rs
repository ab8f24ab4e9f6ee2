//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

/// Builds an article page in the layout the default selectors expect.
pub fn article_html(title: &str, heading: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<html><head><meta property="og:title" content="{title}"></head>
<body>
<div class="caas-subheadline"><h2>{heading}</h2></div>
<div class="caas-body">{body}</div>
</body></html>"#
    )
}
