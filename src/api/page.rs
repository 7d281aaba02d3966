//! HTML for the prediction page.

use crate::service::Prediction;

pub fn render(prediction: &Prediction) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Airbnb destination prediction</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; }}
    pre {{ background: #f6f8fa; padding: 1rem; overflow-x: auto; }}
    .label {{ font-size: 1.5rem; font-weight: bold; }}
  </style>
</head>
<body>
  <h1>Random user from the held-out set</h1>
  <pre>{row}</pre>
  <p>Predicted first destination: <span class="label">{label}</span></p>
  <p><a href="/refresh">Pick another user</a></p>
</body>
</html>
"#,
        row = escape(&prediction.display_row),
        label = escape(&prediction.label),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
