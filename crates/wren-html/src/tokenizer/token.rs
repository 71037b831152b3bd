use core::fmt;

use wren_dom::Attribute;
use wren_dom::dtd::{EndTag, TagId, TagInterner, end_tag_requirement};

/// A `<!DOCTYPE ...>` declaration.
///
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "DOCTYPE tokens have a name, a public identifier, a system identifier"
///
/// Identifiers are stored with their whitespace simplified; the internal
/// subset (the `[...]` part of an SGML declaration) is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeToken {
    /// "a name"
    pub name: String,
    /// "a public identifier"
    pub public_id: String,
    /// "a system identifier"
    pub system_id: String,
    /// Everything between `[` and `]`.
    pub internal_subset: String,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Character data is delivered in runs rather than one token per character,
/// and the end of input is signalled by the tokenizer running dry instead of
/// an end-of-file token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A complete doctype declaration.
    Doctype(DoctypeToken),

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// Numeric identity of the name; custom names get ids above the
        /// known range.
        tag: TagId,
        /// "a tag name", lowercased
        name: String,
        /// "a list of attributes". The first occurrence of a name wins.
        attributes: Vec<Attribute>,
        /// "a self-closing flag". Kept only for `script` and void elements.
        self_closing: bool,
    },

    /// End tag token. Attributes written on end tags are dropped.
    EndTag {
        /// Numeric identity of the name.
        tag: TagId,
        /// "a tag name", lowercased
        name: String,
    },

    /// A run of character data with entities already decoded.
    Text(String),

    /// "Comment and character tokens have data."
    Comment(String),
}

impl Token {
    /// Tag id of the token: the element id for tags, the `#text` and
    /// `#comment` pseudo tags for character data, [`TagId::NONE`] for doctypes.
    #[must_use]
    pub const fn tag_id(&self) -> TagId {
        match self {
            Self::StartTag { tag, .. } | Self::EndTag { tag, .. } => *tag,
            Self::Text(_) => TagId::TEXT,
            Self::Comment(_) => TagId::COMMENT,
            Self::Doctype(_) => TagId::NONE,
        }
    }

    /// Returns true if this is a start tag with the given id.
    #[must_use]
    pub fn is_start_tag(&self, id: TagId) -> bool {
        matches!(self, Self::StartTag { tag, .. } if *tag == id)
    }

    /// Returns true if this is an end tag with the given id.
    #[must_use]
    pub fn is_end_tag(&self, id: TagId) -> bool {
        matches!(self, Self::EndTag { tag, .. } if *tag == id)
    }

    /// Value of the named attribute on a start tag.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } => attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype(doctype) => {
                write!(f, "<!DOCTYPE {}", doctype.name)?;
                if !doctype.public_id.is_empty() {
                    write!(f, " PUBLIC \"{}\"", doctype.public_id)?;
                }
                if !doctype.system_id.is_empty() {
                    write!(f, " \"{}\"", doctype.system_id)?;
                }
                if !doctype.internal_subset.is_empty() {
                    write!(f, " [{}]", doctype.internal_subset)?;
                }
                write!(f, ">")
            }
            Self::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    if attr.value.is_empty() {
                        write!(f, " {}", attr.name)?;
                    } else {
                        write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                    }
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Text(data) => write!(f, "{data:?}"),
            Self::Comment(data) => write!(f, "<!--{data}-->"),
        }
    }
}

/// A tag under construction.
///
/// The attribute states append to the *current* attribute, which only joins
/// the list once its value is complete so that duplicates can be dropped.
#[derive(Debug, Default)]
pub(super) struct TagBuilder {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Vec<Attribute>,
    attr_name: String,
    attr_value: String,
    has_attr: bool,
}

impl TagBuilder {
    pub(super) fn start() -> Self {
        Self::default()
    }

    pub(super) fn end() -> Self {
        Self {
            is_end: true,
            ..Self::default()
        }
    }

    pub(super) fn push_name(&mut self, c: char) {
        self.name.push(c.to_ascii_lowercase());
    }

    pub(super) const fn set_self_closing(&mut self) {
        self.self_closing = true;
    }

    pub(super) fn begin_attribute(&mut self) {
        self.finish_attribute();
        self.has_attr = true;
    }

    pub(super) fn push_attr_name(&mut self, c: char) {
        self.attr_name.push(c.to_ascii_lowercase());
    }

    pub(super) fn push_attr_value(&mut self, c: char) {
        self.attr_value.push(c);
    }

    /// Quoted values lose trailing line breaks.
    pub(super) fn trim_attr_value_newlines(&mut self) {
        let trimmed = self.attr_value.trim_end_matches('\n').len();
        self.attr_value.truncate(trimmed);
    }

    /// Move the current attribute into the list. The first occurrence of a
    /// name wins.
    pub(super) fn finish_attribute(&mut self) {
        if !self.has_attr {
            return;
        }
        self.has_attr = false;
        let name = std::mem::take(&mut self.attr_name);
        let value = std::mem::take(&mut self.attr_value);
        if name.is_empty() || self.attributes.iter().any(|a| a.name == name) {
            return;
        }
        self.attributes.push(Attribute::new(name, value));
    }

    pub(super) fn into_token(mut self, interner: &mut TagInterner) -> Token {
        self.finish_attribute();
        let tag = interner.intern(&self.name);
        if self.is_end {
            return Token::EndTag {
                tag,
                name: self.name,
            };
        }
        // Only void elements and scripts honour `/>`.
        let self_closing = self.self_closing
            && (tag == TagId::SCRIPT || end_tag_requirement(tag) == EndTag::Forbidden);
        Token::StartTag {
            tag,
            name: self.name,
            attributes: self.attributes,
            self_closing,
        }
    }
}
