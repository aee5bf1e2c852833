//! The delegation table of the shadow container.
//!
//! Every member the container supports is listed here together with the target it
//! resolves against. Members not in this table are not supported.

/// Where a delegated member is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Against the synthetic fragment, so the container identifies as a fragment.
    Fragment,
    /// Against the embedded document.
    Document,
    /// A property read or written on the current body.
    Body,
    /// A method invoked on the current body.
    BodyMethod,
    /// A fixed value of the container itself.
    Container,
}

/// A member of the shadow container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Mode,
    NodeName,
    NodeType,
    TagName,
    ActiveElement,
    InnerHtml,
    TextContent,
    ChildNodes,
    FirstChild,
    LastChild,
    ChildElementCount,
    AppendChild,
    InsertBefore,
    RemoveChild,
    ReplaceChild,
    Contains,
    HasChildNodes,
    GetElementById,
    GetElementsByTagName,
    AddEventListener,
    RemoveEventListener,
    DispatchEvent,
}

/// The delegation table: member, DOM name, resolution.
pub const DELEGATES: &[(Member, &str, Resolution)] = &[
    (Member::Mode, "mode", Resolution::Container),
    (Member::NodeName, "nodeName", Resolution::Fragment),
    (Member::NodeType, "nodeType", Resolution::Fragment),
    (Member::TagName, "tagName", Resolution::Fragment),
    (Member::ActiveElement, "activeElement", Resolution::Document),
    (Member::InnerHtml, "innerHTML", Resolution::Body),
    (Member::TextContent, "textContent", Resolution::Body),
    (Member::ChildNodes, "childNodes", Resolution::Body),
    (Member::FirstChild, "firstChild", Resolution::Body),
    (Member::LastChild, "lastChild", Resolution::Body),
    (Member::ChildElementCount, "childElementCount", Resolution::Body),
    (Member::AppendChild, "appendChild", Resolution::BodyMethod),
    (Member::InsertBefore, "insertBefore", Resolution::BodyMethod),
    (Member::RemoveChild, "removeChild", Resolution::BodyMethod),
    (Member::ReplaceChild, "replaceChild", Resolution::BodyMethod),
    (Member::Contains, "contains", Resolution::BodyMethod),
    (Member::HasChildNodes, "hasChildNodes", Resolution::BodyMethod),
    (Member::GetElementById, "getElementById", Resolution::BodyMethod),
    (Member::GetElementsByTagName, "getElementsByTagName", Resolution::BodyMethod),
    (Member::AddEventListener, "addEventListener", Resolution::BodyMethod),
    (Member::RemoveEventListener, "removeEventListener", Resolution::BodyMethod),
    (Member::DispatchEvent, "dispatchEvent", Resolution::BodyMethod),
];

impl Member {
    /// Find a member by its DOM name.
    pub fn from_name(name: &str) -> Option<Self> {
        DELEGATES
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(m, _, _)| *m)
    }

    /// The DOM name of the member.
    pub fn name(self) -> &'static str {
        Self::entry(self).1
    }

    /// Where the member is resolved.
    pub fn resolution(self) -> Resolution {
        Self::entry(self).2
    }

    fn entry(self) -> &'static (Member, &'static str, Resolution) {
        match DELEGATES.iter().find(|(m, _, _)| *m == self) {
            Some(x) => x,
            None => unreachable!("member {:?} missing from the delegation table", self),
        }
    }
}
