//! Inline-styled HTML building blocks for summary emails.

const CONTENT_BEGIN: &str = r#"
        <table align="center" width="96%" cellspacing="0" cellpadding="0"
                    style="max-width: 36rem; margin-top: 20px; border: 1px solid black; background-color: white;
                    border-radius: 12px;">
"#;

/// Whole page. `pre_header` defaults to the title.
pub fn full_template(title: &str, content: &str, pre_header: Option<&str>) -> String {
    let pre_header = pre_header.unwrap_or(title);
    tracing::debug!(
        "Filling full template, title {} content {} pre_header {} chars",
        title.len(),
        content.len(),
        pre_header.len()
    );
    format!(
        r#"
<!DOCTYPE html>
<html>
<head>
  <!-- For overriding dark mode -->
  <meta name="color-scheme" content="light">
  <title>{title}</title>
</head>

<body style="margin: 0; padding: 0; background-color: #fdfefe; font-family: Arial, sans-serif;">

<!-- Pre-header -->
<div style="display: none; max-height: 0px; overflow: hidden;">
{pre_header}
</div>

<!-- Main Layout -->
<table width="100%" cellspacing="0" cellpadding="0">
  <tr>
    <td>
      <!-- Heading -->
      <table align="center" cellspacing="0" cellpadding="10"
        style="background-color: white; border: 1px solid black; border-radius: 12px; width: auto;">
        <tr>
          <td style="font-size: 20px; text-align: center; font-weight: bold; color: black;">
            {title}
          </td>
        </tr>
      </table>

      <table><tr><td></td></tr></table>

      <!-- Main Content -->
      {content}

      <!-- Footer -->
      <table align="center" width="96%" cellspacing="0" cellpadding="0"
                    style="max-width: 36rem; margin-top: 30px;">
        <tr>
          <td>
            <table align="center" cellspacing="0" cellpadding="14"
                style="background-color: white; border: 1px solid black; border-radius: 12px; width: auto;">
              <tr>
                <td align="center">
                  Thank you for using <b><a href="https://www.dumpsheet.com/">Dumpsheet</a></b>
                </td>
              </tr>
              <tr>
                <td align="center">
                  <b>Got any questions?</b> Just hit reply - my human supervisors respond to all emails within 24 hours
                </td>
              </tr>
            </table>
          </td>
        </tr>
      </table>
    </td>
  </tr>
</table>

</body>
</html>
"#
    )
}

/// A boxed block with an optional heading
pub fn main_content_template(content: &str, heading: Option<&str>) -> String {
    let heading_html = match heading.filter(|h| !h.is_empty()) {
        Some(heading) => format!(
            r#"
            <div style="font-size: 18px; font-weight: bold; margin-bottom: 10px;">{heading}</div>
        "#
        ),
        None => String::new(),
    };

    format!(
        r#"{CONTENT_BEGIN}
            <tr>
              <td style="padding: 20px;">
                {heading_html}
                {content}
              </td>
            </tr>
          </table>
    "#
    )
}

/// Two-column table. Extra content longer than 5 chars gets a divider.
pub fn table_template(heading: &str, rows_html: &str, extra_content_html: &str) -> String {
    let extra_content_html = if extra_content_html.len() > 5 {
        format!(
            r#"
        <div style="height:1px; background-color:lightgray; margin-top:20px; margin-bottom:25px;"></div>
            {extra_content_html}
        "#
        )
    } else {
        extra_content_html.to_string()
    };

    format!(
        r#"{CONTENT_BEGIN}
        <tr>
          <td style="padding: 20px;">
            <div style="font-size: 18px; font-weight: bold; margin-bottom: 10px;">{heading}</div>

            <table width="100%" cellspacing="0" cellpadding="10">
              {rows_html}
            </table>
            {extra_content_html}
          </td>
        </tr>
      </table>
"#
    )
}

pub fn table_row_template(label: &str, value: &str) -> String {
    format!(
        r#"
              <tr>
                <td align="left"><strong>{label}</strong></td>
                <td align="left">{value}</td>
              </tr>
"#
    )
}

/// A page with a single block of plain text, escaped before rendering
pub fn simple_email_body_html(title: &str, content_text: &str, sub_title: Option<&str>) -> String {
    full_template(
        title,
        &main_content_template(&html_escape(content_text), sub_title),
        sub_title,
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
