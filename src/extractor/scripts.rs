//! JavaScript probes evaluated through the [`Session`](crate::session::Session).
//!
//! Every probe is a function declaration tagged with a leading marker comment
//! (`/* eddy:<name> */`) so it is recognisable in DevTools and in test fakes.
//! Selectors and labels are embedded as JSON string literals.

pub const COUNT_NODES: &str = "eddy:count-nodes";
pub const CLASSIFY_NODE: &str = "eddy:classify-node";
pub const LOCATE_CONTAINER: &str = "eddy:locate-container";
pub const SCROLL_PULSE: &str = "eddy:scroll-pulse";
pub const CLICK_LOAD_MORE: &str = "eddy:click-load-more";
pub const DISMISS_POPUP: &str = "eddy:dismiss-popup";
pub const OPEN_COMMENT_VIEW: &str = "eddy:open-comment-view";

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

fn js_string_array<S: AsRef<str>>(values: &[S]) -> String {
    let items: Vec<String> = values.iter().map(|v| js_string(v.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

/// Number of elements currently matching `selector`.
pub fn count_nodes(selector: &str) -> String {
    format!(
        r#"/* {COUNT_NODES} */ function () {{
            return document.querySelectorAll({selector}).length;
        }}"#,
        selector = js_string(selector)
    )
}

/// Classify one comment node by the position of its innermost text element.
///
/// Returns `{ kind: "unclassifiable" }` when no text element exists yet,
/// `{ kind: "reply" }` when that element sits under a link, and
/// `{ kind: "top_level", text }` otherwise.
pub fn classify_node(text_selector: &str) -> String {
    format!(
        r#"/* {CLASSIFY_NODE} */ function (node) {{
            const spans = node.querySelectorAll({text_selector});
            if (spans.length === 0) {{
                return {{ kind: 'unclassifiable' }};
            }}
            const target = spans[spans.length - 1];
            const parent = target.parentElement;
            if (parent && parent.closest('a')) {{
                return {{ kind: 'reply' }};
            }}
            return {{ kind: 'top_level', text: target.innerText || target.textContent || '' }};
        }}"#,
        text_selector = js_string(text_selector)
    )
}

/// Find the element that scrolls the comment list.
///
/// Looks for the functional signature of a scroll region rather than any
/// class name: computed `overflow-y: scroll` with overflowing content. Falls
/// back to the last overflowing element inside the first dialog.
pub fn locate_container() -> String {
    format!(
        r#"/* {LOCATE_CONTAINER} */ function () {{
            const all = document.querySelectorAll('*');
            for (let i = 0; i < all.length; i++) {{
                const el = all[i];
                const style = window.getComputedStyle(el);
                if (style.getPropertyValue('overflow-y') === 'scroll' && el.scrollHeight > el.clientHeight) {{
                    return el;
                }}
            }}
            const dialog = document.querySelector("[role='dialog']");
            if (dialog) {{
                const inner = dialog.querySelectorAll('*');
                for (let i = inner.length - 1; i >= 0; i--) {{
                    if (inner[i].scrollHeight > inner[i].clientHeight) {{
                        return inner[i];
                    }}
                }}
            }}
            return null;
        }}"#
    )
}

/// Jump the container to its bottom and notify scroll listeners.
pub fn scroll_pulse() -> String {
    format!(
        r#"/* {SCROLL_PULSE} */ function (container) {{
            container.scrollTop = container.scrollHeight;
            container.dispatchEvent(new Event('scroll', {{ bubbles: true }}));
            return container.scrollTop;
        }}"#
    )
}

/// Activate the next visible, enabled "load more" affordance not yet
/// activated in this pass. Returns the matched label, or null when none is
/// left.
pub fn click_load_more<S: AsRef<str>>(labels: &[S], pass: usize) -> String {
    format!(
        r#"/* {CLICK_LOAD_MORE} */ function () {{
            const labels = {labels};
            const pass = '{pass}';
            const candidates = document.querySelectorAll('span, button');
            for (const el of candidates) {{
                if (el.dataset.eddyPass === pass) {{
                    continue;
                }}
                const ownText = Array.from(el.childNodes)
                    .filter(n => n.nodeType === Node.TEXT_NODE)
                    .map(n => n.textContent)
                    .join('');
                const label = labels.find(l => ownText.includes(l));
                if (!label) {{
                    continue;
                }}
                const visible = el.getClientRects().length > 0
                    && window.getComputedStyle(el).visibility !== 'hidden';
                const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
                if (!visible || !enabled) {{
                    continue;
                }}
                el.dataset.eddyPass = pass;
                el.scrollIntoView(true);
                el.click();
                return label;
            }}
            return null;
        }}"#,
        labels = js_string_array(labels),
    )
}

/// Click the first popup close control matching any selector.
pub fn dismiss_popup<S: AsRef<str>>(selectors: &[S]) -> String {
    format!(
        r#"/* {DISMISS_POPUP} */ function () {{
            const selectors = {selectors};
            for (const selector of selectors) {{
                const el = document.querySelector(selector);
                if (el) {{
                    const target = el.closest('button, [role="button"]') || el.parentElement || el;
                    target.click();
                    return true;
                }}
            }}
            return false;
        }}"#,
        selectors = js_string_array(selectors),
    )
}

/// Click the comment icon's parent to open the comment view.
pub fn open_comment_view(icon_selector: &str) -> String {
    format!(
        r#"/* {OPEN_COMMENT_VIEW} */ function () {{
            const icon = document.querySelector({icon_selector});
            if (!icon) {{
                return false;
            }}
            (icon.parentNode || icon).click();
            return true;
        }}"#,
        icon_selector = js_string(icon_selector)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_carry_markers() {
        assert!(count_nodes("div").contains(COUNT_NODES));
        assert!(classify_node("span").contains(CLASSIFY_NODE));
        assert!(locate_container().contains(LOCATE_CONTAINER));
        assert!(scroll_pulse().contains(SCROLL_PULSE));
        assert!(click_load_more(&["Load more"], 1).contains(CLICK_LOAD_MORE));
        assert!(dismiss_popup(&["svg"]).contains(DISMISS_POPUP));
        assert!(open_comment_view("svg").contains(OPEN_COMMENT_VIEW));
    }

    #[test]
    fn test_selectors_are_escaped() {
        let script = count_nodes(r#"svg[aria-label="Comment"]"#);
        assert!(script.contains(r#"document.querySelectorAll("svg[aria-label=\"Comment\"]")"#));
    }

    #[test]
    fn test_click_load_more_embeds_labels_and_pass() {
        let script = click_load_more(&["View more comments", "Load more"], 7);
        assert!(script.contains(r#"["View more comments", "Load more"]"#));
        assert!(script.contains("const pass = '7';"));
    }

    #[test]
    fn test_classify_node_uses_last_span_and_link_ancestor() {
        let script = classify_node("span._ap3a");
        assert!(script.contains(r#"node.querySelectorAll("span._ap3a")"#));
        assert!(script.contains("spans[spans.length - 1]"));
        assert!(script.contains("target.parentElement"));
        assert!(script.contains("parent.closest('a')"));
        assert!(script.contains("kind: 'reply'"));
        assert!(script.contains("kind: 'top_level'"));
        assert!(script.contains("kind: 'unclassifiable'"));
    }

    #[test]
    fn test_locate_container_checks_overflow_and_dialog() {
        let script = locate_container();
        assert!(script.contains("overflow-y"));
        assert!(script.contains("[role='dialog']"));
        assert!(script.contains("scrollHeight > el.clientHeight"));
    }
}
