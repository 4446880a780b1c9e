//! Event handler attribute recognition.

use serde::{Deserialize, Serialize};

/// Recognized event handler attribute names, sorted.
pub const EVENT_HANDLERS: &[&str] = &[
    "onabort",
    "onafterprint",
    "onanimationend",
    "onanimationiteration",
    "onanimationstart",
    "onbeforeprint",
    "onbeforeunload",
    "onblur",
    "oncanplay",
    "oncanplaythrough",
    "onchange",
    "onclick",
    "oncontextmenu",
    "oncopy",
    "oncut",
    "ondblclick",
    "ondrag",
    "ondragend",
    "ondragenter",
    "ondragleave",
    "ondragover",
    "ondragstart",
    "ondrop",
    "ondurationchange",
    "onended",
    "onerror",
    "onfocus",
    "onfocusin",
    "onfocusout",
    "onfullscreenchange",
    "onfullscreenerror",
    "onhashchange",
    "oninput",
    "oninvalid",
    "onkeydown",
    "onkeypress",
    "onkeyup",
    "onload",
    "onloadeddata",
    "onloadedmetadata",
    "onloadstart",
    "onmessage",
    "onmousedown",
    "onmouseenter",
    "onmouseleave",
    "onmousemove",
    "onmouseout",
    "onmouseover",
    "onmouseup",
    "onoffline",
    "ononline",
    "onopen",
    "onpagehide",
    "onpageshow",
    "onpaste",
    "onpause",
    "onplay",
    "onplaying",
    "onprogress",
    "onratechange",
    "onreset",
    "onresize",
    "onscroll",
    "onsearch",
    "onseeked",
    "onseeking",
    "onselect",
    "onshow",
    "onstalled",
    "onsubmit",
    "onsuspend",
    "ontimeupdate",
    "ontoggle",
    "ontouchcancel",
    "ontouchend",
    "ontouchmove",
    "ontouchstart",
    "ontransitionend",
    "onunload",
    "onvolumechange",
    "onwaiting",
    "onwheel",
];

/// Which attributes count as event handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HandlerMode {
    /// Only names in [`EVENT_HANDLERS`].
    #[default]
    Known,
    /// Any `on<letter>…` attribute.
    Prefixed,
}

impl HandlerMode {
    /// Whether the (lowercased) attribute name is a handler under this mode.
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Known => EVENT_HANDLERS.binary_search(&name).is_ok(),
            Self::Prefixed => name
                .strip_prefix("on")
                .and_then(|rest| rest.bytes().next())
                .is_some_and(|b| b.is_ascii_alphabetic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_sorted_and_unique() {
        assert!(EVENT_HANDLERS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_known_mode() {
        assert!(HandlerMode::Known.matches("onclick"));
        assert!(HandlerMode::Known.matches("onwheel"));
        assert!(!HandlerMode::Known.matches("onpointerdown"));
        assert!(!HandlerMode::Known.matches("one"));
    }

    #[test]
    fn test_prefixed_mode() {
        assert!(HandlerMode::Prefixed.matches("onpointerdown"));
        assert!(HandlerMode::Prefixed.matches("one"));
        assert!(!HandlerMode::Prefixed.matches("on"));
        assert!(!HandlerMode::Prefixed.matches("on-click"));
        assert!(!HandlerMode::Prefixed.matches("class"));
    }
}
