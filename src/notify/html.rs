//! HTML report rendering

use crate::crawler::ProductRecord;

const CELL_STYLE: &str = "padding: 8px; border: 1px solid #ddd;";

/// Renders a product report as an HTML fragment
///
/// The report states the item count and lists every product in a two-column
/// table: the product name linked to its detail page, and its price.
pub fn render_report_html(products: &[ProductRecord]) -> String {
    let mut html = String::new();

    html.push_str("<p>Scraping results:</p>\n");
    html.push_str(&format!("<p>Total items: {}</p>\n", products.len()));
    html.push_str(
        "<table border=\"1\" style=\"border-collapse: collapse; width: 100%; text-align: left;\">\n",
    );
    html.push_str("  <thead>\n    <tr>\n");
    html.push_str(&format!("      <th style=\"{}\">Product</th>\n", CELL_STYLE));
    html.push_str(&format!("      <th style=\"{}\">Price</th>\n", CELL_STYLE));
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for product in products {
        html.push_str("    <tr>\n");
        html.push_str(&format!(
            "      <td style=\"{}\"><a href=\"{}\" target=\"_blank\" style=\"text-decoration: none; color: #007bff;\">{}</a></td>\n",
            CELL_STYLE,
            escape_html(&product.source_link),
            escape_html(&product.name)
        ));
        html.push_str(&format!(
            "      <td style=\"{}\">{}</td>\n",
            CELL_STYLE,
            escape_html(product.price.as_str())
        ));
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

/// Escapes text for use in HTML content and double-quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
