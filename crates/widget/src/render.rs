/// Tags rendered without closing tag or content.
const VOID_TAGS: &[&str] = &["br", "img", "input"];

/// One node of the widget's renderable structure.
///
/// Classes carry all styling and classification (position, design variant,
/// animation, visual state); attributes carry interaction data such as
/// `data-phone` / `data-message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    // ── Builder-style construction ───────────────────────────────────────

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    // ── Class manipulation ───────────────────────────────────────────────

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Remove every class starting with `prefix`.
    pub fn clear_class_prefix(&mut self, prefix: &str) {
        self.classes.retain(|c| !c.starts_with(prefix));
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the first node carrying `class`, including
    /// this node itself.
    pub fn find(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(class))
    }

    pub fn find_mut(&mut self, class: &str) -> Option<&mut Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(class))
    }

    /// All nodes carrying `class`, in document order.
    pub fn find_all(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(class, &mut out);
        out
    }

    fn collect<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self.has_class(class) {
            out.push(self);
        }
        for child in &self.children {
            child.collect(class, out);
        }
    }

    // ── Serialization ────────────────────────────────────────────────────

    /// Serialize the subtree as embeddable HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape(&self.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_serialize() {
        let el = Element::new("div")
            .class("cb-panel")
            .attr("data-phone", "+100")
            .child(Element::new("span").class("cb-header").text("Chat with us"));
        assert_eq!(
            el.to_html(),
            "<div class=\"cb-panel\" data-phone=\"+100\">\
             <span class=\"cb-header\">Chat with us</span></div>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let el = Element::new("span").text("a < b & \"c\"");
        assert_eq!(el.to_html(), "<span>a &lt; b &amp; &quot;c&quot;</span>");
    }

    #[test]
    fn test_void_tag_has_no_closing() {
        let el = Element::new("img").class("cb-avatar").attr("src", "a.png");
        assert_eq!(el.to_html(), "<img class=\"cb-avatar\" src=\"a.png\">");
    }

    #[test]
    fn test_class_manipulation() {
        let mut el = Element::new("div").class("cb-anim-bounce").class("cb-open");
        el.add_class("cb-open"); // no duplicate
        el.clear_class_prefix("cb-anim-");
        el.add_class("cb-anim-pulse");
        assert!(!el.has_class("cb-anim-bounce"));
        assert!(el.has_class("cb-anim-pulse"));
        el.remove_class("cb-open");
        assert!(!el.has_class("cb-open"));
        assert_eq!(el.to_html(), "<div class=\"cb-anim-pulse\"></div>");
    }

    #[test]
    fn test_find_descends_depth_first() {
        let tree = Element::new("div").child(
            Element::new("div")
                .class("cb-panel")
                .child(Element::new("button").class("cb-agent-chat")),
        );
        assert!(tree.find("cb-agent-chat").is_some());
        assert!(tree.find("cb-missing").is_none());
    }
}
