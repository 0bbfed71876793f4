//! Print-ready wrapper document.
//!
//! The print flow hands the browser a small self-contained HTML page: the
//! stencil inside a bordered frame with the brand footer, printing itself as
//! soon as it loads.

use crate::frame::ExportFrameSpec;
use crate::payload::EncodedPayload;

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
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

/// Render the branded print page around `payload`.
///
/// Frame color and stroke width follow `spec`; the footer carries the brand
/// and tagline text (the tagline is uppercased by CSS when configured so).
#[must_use]
pub fn render_print_document(payload: &EncodedPayload, spec: &ExportFrameSpec) -> String {
    let brand = escape_html(&spec.brand.text);
    let tagline = escape_html(&spec.tagline.text);
    let tagline_case = if spec.tagline.uppercase {
        "uppercase"
    } else {
        "none"
    };
    let brand_weight = if spec.brand.bold { 700 } else { 400 };
    let src = payload.to_data_uri();
    let frame_width = spec.frame_width;
    let frame_color = spec.frame_color;
    let text_color = spec.text_color;

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{brand} Stencil</title>
    <style>
      body {{
        margin: 0;
        padding: 40px;
        height: 100vh;
        box-sizing: border-box;
        display: flex;
        justify-content: center;
        align-items: center;
        font-family: sans-serif;
        color: {text_color};
      }}
      .frame {{
        border: {frame_width}px solid {frame_color};
        width: 100%;
        height: 100%;
        box-sizing: border-box;
        padding: 40px;
        display: flex;
        flex-direction: column;
        align-items: center;
        justify-content: space-between;
      }}
      .image-container {{
        flex: 1;
        width: 100%;
        display: flex;
        align-items: center;
        justify-content: center;
        overflow: hidden;
      }}
      img {{ max-width: 100%; max-height: 100%; object-fit: contain; }}
      .footer {{ text-align: center; margin-top: 20px; }}
      .brand {{ display: block; font-size: 24px; font-weight: {brand_weight}; margin-bottom: 5px; }}
      .meta {{ font-size: 12px; letter-spacing: 2px; text-transform: {tagline_case}; }}
      @media print {{
        body {{ display: block; height: auto; }}
        .frame {{ height: 95vh; page-break-after: always; }}
      }}
    </style>
  </head>
  <body>
    <div class="frame">
      <div class="image-container">
        <img src="{src}" alt="{brand} stencil">
      </div>
      <div class="footer">
        <span class="brand">{brand}</span>
        <span class="meta">{tagline}</span>
      </div>
    </div>
    <script>
      window.onload = function () {{ window.print(); }};
    </script>
  </body>
</html>
"#
    )
}
