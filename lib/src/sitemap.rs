use chrono::NaiveDate;

use crate::catalog::CatalogEntry;
use crate::util::escape_xml;

struct Url<'a> {
    comment: &'a str,
    path: &'a str,
    changefreq: &'static str,
    priority: &'static str,
}

const PAGES: &[Url<'static>] = &[
    Url { comment: "Homepage", path: "/", changefreq: "weekly", priority: "1.0" },
    Url { comment: "About Page", path: "/#/about", changefreq: "monthly", priority: "0.8" },
    Url { comment: "Contributing Page", path: "/#/contributing", changefreq: "monthly", priority: "0.7" },
];

/// Text that is safe inside an XML comment.
fn comment_text(text: &str) -> String {
    escape_xml(text).replace("--", "- -")
}

fn write_url(xml: &mut String, site_url: &str, url: &Url<'_>, lastmod: &str) {
    xml.push_str(&format!("  <!-- {} -->\n  <url>\n", comment_text(url.comment)));
    xml.push_str(&format!("    <loc>{}{}</loc>\n", escape_xml(site_url), escape_xml(url.path)));
    xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", url.changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n  </url>\n\n", url.priority));
}

/// The sitemap of the site at `site_url`: the fixed pages, then one URL per
/// entry, all last modified `today`.
pub fn sitemap_xml(site_url: &str, entries: &[CatalogEntry], today: NaiveDate) -> String {
    let site_url = site_url.trim_end_matches('/');
    let lastmod = today.format("%Y-%m-%d").to_string();

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for page in PAGES {
        write_url(&mut xml, site_url, page, &lastmod);
    }

    for entry in entries {
        let comment = format!("Anchor: {}", entry.title);
        let path = format!("/#/anchor/{}", entry.id);
        let url = Url { comment: &comment, path: &path, changefreq: "monthly", priority: "0.6" };
        write_url(&mut xml, site_url, &url, &lastmod);
    }

    xml.push_str("</urlset>\n");
    xml
}

/// The number of URLs in a sitemap over `entries`.
pub fn url_count(entries: &[CatalogEntry]) -> usize {
    PAGES.len() + entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_pages_and_anchors() {
        let entries = vec![CatalogEntry {
            id: "tdd".into(),
            title: "TDD <London> -- School".into(),
            ..Default::default()
        }];

        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let xml = sitemap_xml("https://example.com/anchors/", &entries, today);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://example.com/anchors/</loc>"));
        assert!(xml.contains("<loc>https://example.com/anchors/#/anchor/tdd</loc>"));
        assert!(xml.contains("<!-- Anchor: TDD &lt;London&gt; - - School -->"));
        assert_eq!(xml.matches("<lastmod>2026-10-17</lastmod>").count(), url_count(&entries));
        assert!(xml.ends_with("</url>\n\n</urlset>\n"));
    }
}
