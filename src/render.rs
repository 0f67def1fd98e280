use crate::dom::{Dom, NodeId};

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

pub fn render_html(dom: &Dom) -> String {
    let mut out = String::new();
    render_node(dom, dom.root(), 0, &mut out);
    out
}

fn render_node(dom: &Dom, node: NodeId, depth: usize, out: &mut String) {
    let Some(element) = dom.get(node) else {
        return;
    };
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(element.tag());
    if let Some(id) = element.id() {
        push_attr(out, "id", id);
    }
    if !element.classes().is_empty() {
        push_attr(out, "class", &element.classes().join(" "));
    }
    for (name, value) in element.attrs().filter(|(name, _)| *name != "id" && *name != "value") {
        push_attr(out, name, value);
    }
    if element.tag() == "input" && !element.value().is_empty() {
        push_attr(out, "value", element.value());
    }
    if element.is_disabled() {
        out.push_str(" disabled");
    }
    out.push('>');

    if VOID_TAGS.contains(&element.tag()) {
        out.push('\n');
        return;
    }

    let inline = if element.tag() == "textarea" {
        element.value()
    } else {
        element.text()
    };
    out.push_str(&escape(inline));
    if !element.children().is_empty() {
        out.push('\n');
        for child in element.children() {
            render_node(dom, *child, depth + 1, out);
        }
        out.push_str(&indent);
    }
    out.push_str("</");
    out.push_str(element.tag());
    out.push_str(">\n");
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_markup_with_state() {
        let mut dom = Dom::new();
        let root = dom.root();
        let form = dom.append_element(root, "form");
        dom.set_attr(form, "id", "signup");
        dom.add_class(form, "loading");
        let input = dom.append_element(form, "input");
        dom.set_attr(input, "name", "email");
        dom.set_value(input, "a@b.co");
        let button = dom.append_element(form, "button");
        dom.set_text(button, "Submitting...");
        dom.set_disabled(button, true);

        let html = render_html(&dom);
        assert!(html.contains(r#"<form id="signup" class="loading">"#));
        assert!(html.contains(r#"<input name="email" value="a@b.co">"#));
        assert!(html.contains("<button disabled>Submitting...</button>"));
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut dom = Dom::new();
        let root = dom.root();
        let p = dom.append_element(root, "p");
        dom.set_attr(p, "title", "\"quoted\"");
        dom.set_text(p, "1 < 2 & 3");
        let html = render_html(&dom);
        assert!(html.contains(r#"title="&quot;quoted&quot;""#));
        assert!(html.contains("1 &lt; 2 &amp; 3"));
    }
}
