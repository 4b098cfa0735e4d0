//! Plain-text rendering of the site tree

use super::tree::SiteMapNode;
use crate::url::strip_host;
use std::fmt::Write;

/// Renders the tree as indented text
///
/// The root is printed with its full URL, every descendant with its path
/// only, two spaces of indent per level:
///
/// ```text
/// Main Domain: https://example.com/ [200, 41ms]
///   ├── /about [200, 12ms]
///     ├── /about/team [404, 3ms]
/// ```
pub fn format_site_tree(tree: &SiteMapNode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Main Domain: {} [{}, {}ms]",
        tree.url,
        tree.status_code,
        tree.response_time.as_millis()
    );
    for child in &tree.children {
        write_node(&mut out, child, 1);
    }
    out
}

/// Prints the tree to stdout
pub fn print_site_tree(tree: &SiteMapNode) {
    print!("{}", format_site_tree(tree));
}

fn write_node(out: &mut String, node: &SiteMapNode, level: usize) {
    let _ = writeln!(
        out,
        "{}├── {} [{}, {}ms]",
        "  ".repeat(level),
        strip_host(&node.url),
        node.status_code,
        node.response_time.as_millis()
    );
    for child in &node.children {
        write_node(out, child, level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn node(url: &str, status: u16, children: Vec<SiteMapNode>) -> SiteMapNode {
        SiteMapNode {
            url: url.to_string(),
            status_code: status,
            response_time: Duration::from_millis(5),
            children,
        }
    }

    #[test]
    fn test_format_nested_tree() {
        let tree = node(
            "https://example.com/",
            200,
            vec![
                node(
                    "https://example.com/about",
                    200,
                    vec![node("https://example.com/about/team", 404, vec![])],
                ),
                node("https://example.com/search?q=x", 200, vec![]),
            ],
        );

        let expected = "\
Main Domain: https://example.com/ [200, 5ms]
  ├── /about [200, 5ms]
    ├── /about/team [404, 5ms]
  ├── /search?q=x [200, 5ms]
";
        assert_eq!(format_site_tree(&tree), expected);
    }

    #[test]
    fn test_format_root_only() {
        let tree = node("https://example.com/", 500, vec![]);
        assert_eq!(
            format_site_tree(&tree),
            "Main Domain: https://example.com/ [500, 5ms]\n"
        );
    }
}
