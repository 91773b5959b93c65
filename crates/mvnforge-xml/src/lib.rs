//! A thin, namespace-stripping XML reader exposing path-based element and
//! value lookup, sitting underneath the descriptor and metadata accessors.
//!
//! Parsing strips every element's and attribute's XML namespace (Maven POMs
//! and metadata documents declare one, e.g. `xmlns="http://maven.apache.org/
//! POM/4.0.0"`, but descriptor XPaths in this workspace are written
//! namespace-free) so callers can query `project/parent/groupId` without
//! knowing or caring which namespace URI the document declares.

use std::path::Path;

use mvnforge_util::errors::MvnError;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// A single namespace-stripped element, with its attributes, its own direct
/// text content, and its child elements in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Ordered list of elements matching `path`, a `/`-joined chain of
    /// element names read relative to `self` (a leading `/` is tolerated
    /// and ignored, matching the style of paths like `/groupId` used by the
    /// descriptor accessor to mean "direct child of the document root").
    pub fn elements(&self, path: &str) -> Vec<&XmlElement> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return vec![self];
        }
        let mut segments = path.split('/');
        let first = segments.next().unwrap_or("");
        let mut current: Vec<&XmlElement> =
            self.children.iter().filter(|c| c.name == first).collect();
        for seg in segments {
            let mut next = Vec::new();
            for el in current {
                next.extend(el.children.iter().filter(|c| c.name == seg));
            }
            current = next;
        }
        current
    }

    /// At most one matching element. Fails if more than one element matches
    /// `path`.
    pub fn element(&self, path: &str) -> Result<Option<&XmlElement>, MvnError> {
        let matches = self.elements(path);
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            n => Err(MvnError::Xml(format!(
                "expected at most one element at '{path}', found {n}"
            ))),
        }
    }

    /// The text of the (first) element matching `path`, or absent if no
    /// element matches.
    pub fn value(&self, path: &str) -> Option<String> {
        self.elements(path).first().map(|e| e.text.clone())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed, namespace-stripped XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse(path: &Path) -> Result<Self, MvnError> {
        let content = std::fs::read_to_string(path).map_err(MvnError::Io)?;
        Self::parse_str(&content)
    }

    pub fn parse_str(input: &str) -> Result<Self, MvnError> {
        let mut reader = NsReader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| MvnError::Xml(e.to_string()))?;
            match event {
                Event::Start(e) => {
                    let (resolved, local) = reader.resolve_element(e.name());
                    let name = local_name_string(&local, resolved);
                    let mut attrs = Vec::new();
                    for attr in e.attributes().flatten() {
                        let (resolved, local) = reader.resolve_attribute(attr.key);
                        let key = local_name_string(&local, resolved);
                        let value = attr
                            .decode_and_unescape_value(reader.decoder())
                            .unwrap_or_default()
                            .to_string();
                        attrs.push((key, value));
                    }
                    stack.push(XmlElement {
                        name,
                        attrs,
                        text: String::new(),
                        children: Vec::new(),
                    });
                }
                Event::Empty(e) => {
                    let (resolved, local) = reader.resolve_element(e.name());
                    let name = local_name_string(&local, resolved);
                    let mut attrs = Vec::new();
                    for attr in e.attributes().flatten() {
                        let (resolved, local) = reader.resolve_attribute(attr.key);
                        let key = local_name_string(&local, resolved);
                        let value = attr
                            .decode_and_unescape_value(reader.decoder())
                            .unwrap_or_default()
                            .to_string();
                        attrs.push((key, value));
                    }
                    let el = XmlElement {
                        name,
                        attrs,
                        text: String::new(),
                        children: Vec::new(),
                    };
                    push_completed(&mut stack, &mut root, el);
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        let decoded = t.unescape().map_err(|e| MvnError::Xml(e.to_string()))?;
                        top.text.push_str(&decoded);
                    }
                }
                Event::CData(t) => {
                    if let Some(top) = stack.last_mut() {
                        let bytes = t.into_inner();
                        top.text.push_str(&String::from_utf8_lossy(&bytes));
                    }
                }
                Event::End(_) => {
                    if let Some(completed) = stack.pop() {
                        push_completed(&mut stack, &mut root, completed);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| MvnError::Xml("document has no root element".to_string()))?;
        Ok(XmlDocument { root })
    }
}

fn push_completed(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, el: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
    } else {
        *root = Some(el);
    }
}

fn local_name_string(local: &quick_xml::name::LocalName<'_>, _resolved: ResolveResult) -> String {
    String::from_utf8_lossy(local.as_ref()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_simple_document() {
        let doc = XmlDocument::parse_str(
            r#"<?xml version="1.0"?>
<project>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
</project>"#,
        )
        .unwrap();
        assert_eq!(doc.root.name, "project");
        assert_eq!(doc.root.value("groupId"), Some("org.example".to_string()));
        assert_eq!(doc.root.value("artifactId"), Some("lib".to_string()));
    }

    #[test]
    fn strips_namespace() {
        let doc = XmlDocument::parse_str(
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <groupId>org.example</groupId>
</project>"#,
        )
        .unwrap();
        assert_eq!(doc.root.name, "project");
        assert_eq!(doc.root.value("groupId"), Some("org.example".to_string()));
    }

    #[test]
    fn elements_returns_ordered_matches() {
        let doc = XmlDocument::parse_str(
            r#"<project>
  <dependencies>
    <dependency><artifactId>a</artifactId></dependency>
    <dependency><artifactId>b</artifactId></dependency>
  </dependencies>
</project>"#,
        )
        .unwrap();
        let deps = doc.root.elements("dependencies/dependency");
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].value("artifactId"), Some("a".to_string()));
        assert_eq!(deps[1].value("artifactId"), Some("b".to_string()));
    }

    #[test]
    fn element_errors_on_ambiguous_match() {
        let doc = XmlDocument::parse_str(
            r#"<project>
  <profiles>
    <profile><id>one</id></profile>
    <profile><id>two</id></profile>
  </profiles>
</project>"#,
        )
        .unwrap();
        let result = doc.root.element("profiles/profile");
        assert!(result.is_err());
    }

    #[test]
    fn value_absent_for_missing_path() {
        let doc = XmlDocument::parse_str("<project><groupId>g</groupId></project>").unwrap();
        assert_eq!(doc.root.value("version"), None);
    }

    #[test]
    fn self_closing_element_has_empty_text() {
        let doc = XmlDocument::parse_str(
            r#"<project><parent><relativePath/></parent></project>"#,
        )
        .unwrap();
        assert_eq!(doc.root.value("parent/relativePath"), Some(String::new()));
    }

    #[test]
    fn attributes_are_captured() {
        let doc = XmlDocument::parse_str(r#"<project><a id="x">text</a></project>"#).unwrap();
        let el = doc.root.element("a").unwrap().unwrap();
        assert_eq!(el.attr("id"), Some("x"));
        assert_eq!(el.text, "text");
    }
}
