//! Tag identities and the static content-model tables.
//!
//! Every known HTML element name maps to a small integer [`TagId`]. The ids
//! index three per-tag columns that the tree builder consults on every
//! insertion:
//!
//! - **priority** - an element may only be closed implicitly by a close tag
//!   of equal or higher priority. Priority 0 elements are never pushed on the
//!   open-element stack.
//! - **end tag requirement** - [`EndTag::Required`], [`EndTag::Optional`] or
//!   [`EndTag::Forbidden`].
//! - **children** - a [`ChildRule`] describing which children the element
//!   accepts. [`check_child`] evaluates it.
//!
//! The content model is the relaxed HTML 4 grammar that legacy browsers
//! actually accept: formatting elements may hold blocks, paragraphs may hold
//! tables in non-strict documents, and so on.
//!
//! Ids above [`TagId::LAST_TAG`] (other than [`TagId::COMMENT`]) denote
//! custom elements. All lookups treat them exactly like `<span>`.
//!
//! These tables never change at runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Numeric identity of an element name.
///
/// Known names have fixed ids (`1..=LAST_TAG`), two pseudo-tags identify text
/// and comment nodes, and custom names get ids above [`TagId::COMMENT`] from a
/// [`TagInterner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub u16);

/// Whether an element's end tag must, may, or must not appear in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTag {
    /// The element is closed only by its end tag (or by error recovery).
    Required,
    /// The end tag may be omitted; the element is closed implicitly.
    Optional,
    /// The element is void: it never has an end tag and is never pushed.
    Forbidden,
}

/// Which children an element accepts.
///
/// `strict` is the document's strictness; variants that say "strict flow"
/// always evaluate the flow set in strict mode regardless of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRule {
    /// Nothing at all (void elements, and elements whose content is
    /// consumed by the tokenizer).
    Empty,
    /// Inline or block content (formatting and phrase elements).
    Phrase,
    /// Inline content, plus `<table>` when not strict.
    Paragraph,
    /// Inline content, plus non-heading strict block content when not strict.
    Heading,
    /// Inline content, plus `<p>` when not strict.
    Address,
    /// Inline content, plus strict block content other than `<dl>` when not
    /// strict.
    Term,
    /// Inline content, plus strict block content when not strict.
    Label,
    /// Strict flow, `<area>`, and `<script>` when not strict.
    Map,
    /// Flow content evaluated with the document's strictness.
    Flow,
    /// Flow content with the document's strictness, or one of the listed tags.
    FlowOr(&'static [TagId]),
    /// Flow content evaluated strictly, or one of the listed tags.
    StrictFlowOr(&'static [TagId]),
    /// Exactly the listed tags.
    Only(&'static [TagId]),
}

/// Per-tag row of the content-model table.
#[derive(Debug, Clone, Copy)]
struct TagInfo {
    name: &'static str,
    priority: u16,
    end_tag: EndTag,
    children: ChildRule,
}

macro_rules! tag_table {
    ($($konst:ident = $id:literal, $name:literal, $priority:literal, $end:ident, $children:expr;)*) => {
        impl TagId {
            $(
                #[doc = concat!("The `", $name, "` tag.")]
                pub const $konst: Self = Self($id);
            )*
        }

        static TAGS: &[TagInfo] = &[
            TagInfo { name: "", priority: 0, end_tag: EndTag::Required, children: ChildRule::Empty },
            $(
                TagInfo {
                    name: $name,
                    priority: $priority,
                    end_tag: EndTag::$end,
                    children: $children,
                },
            )*
        ];
    };
}

use ChildRule::{
    Address, Empty, Flow, FlowOr, Heading, Label, Map, Only, Paragraph, Phrase, StrictFlowOr,
    Term,
};

const SELECT_CHILDREN: &[TagId] = &[
    TagId::TEXT,
    TagId::OPTGROUP,
    TagId::OPTION,
    TagId::COMMENT,
    TagId::SCRIPT,
];
const FRAMESET_CHILDREN: &[TagId] = &[
    TagId::FRAMESET,
    TagId::FRAME,
    TagId::NOFRAMES,
    TagId::COMMENT,
];
const HEAD_CHILDREN: &[TagId] = &[
    TagId::SCRIPT,
    TagId::STYLE,
    TagId::META,
    TagId::LINK,
    TagId::TITLE,
    TagId::ISINDEX,
    TagId::BASE,
    TagId::COMMENT,
];
const TABLE_CHILDREN: &[TagId] = &[
    TagId::CAPTION,
    TagId::COL,
    TagId::COLGROUP,
    TagId::THEAD,
    TagId::TFOOT,
    TagId::TBODY,
    TagId::FORM,
    TagId::SCRIPT,
];
const SECTION_CHILDREN: &[TagId] = &[TagId::TR, TagId::SCRIPT];
const ROW_CHILDREN: &[TagId] = &[TagId::TH, TagId::TD, TagId::SCRIPT];
const HTML_CHILDREN: &[TagId] = &[
    TagId::HEAD,
    TagId::BODY,
    TagId::FRAMESET,
    TagId::NOFRAMES,
    TagId::SCRIPT,
];
const TEXT_ONLY: &[TagId] = &[TagId::TEXT];

tag_table! {
    A = 1, "a", 1, Required, Phrase;
    ABBR = 2, "abbr", 1, Required, Phrase;
    ACRONYM = 3, "acronym", 1, Required, Phrase;
    ADDRESS = 4, "address", 5, Required, Address;
    APPLET = 5, "applet", 1, Required, StrictFlowOr(&[TagId::PARAM]);
    AREA = 6, "area", 0, Forbidden, Empty;
    AUDIO = 7, "audio", 1, Required, StrictFlowOr(&[TagId::SOURCE]);
    B = 8, "b", 1, Required, Phrase;
    BASE = 9, "base", 0, Forbidden, Empty;
    BASEFONT = 10, "basefont", 0, Forbidden, Empty;
    BDO = 11, "bdo", 1, Required, Phrase;
    BIG = 12, "big", 1, Required, Phrase;
    BLOCKQUOTE = 13, "blockquote", 5, Required, Flow;
    BODY = 14, "body", 10, Required, Flow;
    BR = 15, "br", 0, Forbidden, Empty;
    BUTTON = 16, "button", 1, Required, Flow;
    CANVAS = 17, "canvas", 1, Required, Flow;
    CAPTION = 18, "caption", 5, Required, Flow;
    CENTER = 19, "center", 5, Required, Flow;
    CITE = 20, "cite", 1, Required, Phrase;
    CODE = 21, "code", 1, Required, Phrase;
    COL = 22, "col", 0, Forbidden, Empty;
    COLGROUP = 23, "colgroup", 1, Optional, Only(&[TagId::COL]);
    DD = 24, "dd", 5, Optional, Flow;
    DEL = 25, "del", 1, Required, Flow;
    DFN = 26, "dfn", 1, Required, Phrase;
    DIR = 27, "dir", 5, Required, FlowOr(&[TagId::LI]);
    DIV = 28, "div", 5, Required, Flow;
    DL = 29, "dl", 5, Required, FlowOr(&[TagId::DT, TagId::DD]);
    DT = 30, "dt", 5, Optional, Term;
    EM = 31, "em", 1, Required, Phrase;
    EMBED = 32, "embed", 0, Required, StrictFlowOr(&[TagId::PARAM]);
    FIELDSET = 33, "fieldset", 5, Required, FlowOr(&[TagId::TEXT, TagId::LEGEND]);
    FONT = 34, "font", 1, Required, Phrase;
    FORM = 35, "form", 3, Required, Flow;
    FRAME = 36, "frame", 0, Forbidden, Empty;
    FRAMESET = 37, "frameset", 10, Required, Only(FRAMESET_CHILDREN);
    H1 = 38, "h1", 5, Required, Heading;
    H2 = 39, "h2", 5, Required, Heading;
    H3 = 40, "h3", 5, Required, Heading;
    H4 = 41, "h4", 5, Required, Heading;
    H5 = 42, "h5", 5, Required, Heading;
    H6 = 43, "h6", 5, Required, Heading;
    HEAD = 44, "head", 10, Optional, Only(HEAD_CHILDREN);
    HR = 45, "hr", 0, Forbidden, Empty;
    HTML = 46, "html", 11, Required, Only(HTML_CHILDREN);
    I = 47, "i", 1, Required, Phrase;
    IFRAME = 48, "iframe", 1, Required, Flow;
    ILAYER = 49, "ilayer", 1, Required, Flow;
    IMAGE = 50, "image", 0, Forbidden, Empty;
    IMG = 51, "img", 0, Forbidden, Empty;
    INPUT = 52, "input", 0, Forbidden, Empty;
    INS = 53, "ins", 1, Required, Flow;
    ISINDEX = 54, "isindex", 0, Forbidden, Empty;
    KBD = 55, "kbd", 1, Required, Phrase;
    KEYGEN = 56, "keygen", 0, Required, Only(SELECT_CHILDREN);
    LABEL = 57, "label", 1, Required, Label;
    LAYER = 58, "layer", 1, Required, Flow;
    LEGEND = 59, "legend", 1, Required, Phrase;
    LI = 60, "li", 5, Optional, Flow;
    LINK = 61, "link", 0, Forbidden, Empty;
    LISTING = 62, "listing", 5, Required, StrictFlowOr(&[]);
    MAP = 63, "map", 1, Required, Map;
    MARQUEE = 64, "marquee", 5, Required, Flow;
    MENU = 65, "menu", 5, Required, FlowOr(&[TagId::LI]);
    META = 66, "meta", 0, Forbidden, Empty;
    NOBR = 67, "nobr", 5, Required, Phrase;
    NOEMBED = 68, "noembed", 10, Required, Empty;
    NOFRAMES = 69, "noframes", 10, Required, Flow;
    NOSCRIPT = 70, "noscript", 3, Required, Flow;
    NOLAYER = 71, "nolayer", 1, Required, Empty;
    OBJECT = 72, "object", 5, Required, StrictFlowOr(&[TagId::PARAM]);
    OL = 73, "ol", 5, Required, FlowOr(&[TagId::LI]);
    OPTGROUP = 74, "optgroup", 1, Required, Only(&[TagId::OPTION]);
    OPTION = 75, "option", 2, Optional, Only(&[TagId::SCRIPT, TagId::TEXT]);
    P = 76, "p", 5, Optional, Paragraph;
    PARAM = 77, "param", 0, Forbidden, Empty;
    PLAINTEXT = 78, "plaintext", 5, Required, StrictFlowOr(&[]);
    PRE = 79, "pre", 5, Required, StrictFlowOr(&[]);
    Q = 80, "q", 1, Required, Phrase;
    S = 81, "s", 1, Required, Phrase;
    SAMP = 82, "samp", 1, Required, Phrase;
    SCRIPT = 83, "script", 1, Required, Only(TEXT_ONLY);
    SELECT = 84, "select", 6, Required, Only(SELECT_CHILDREN);
    SMALL = 85, "small", 1, Required, Phrase;
    SOURCE = 86, "source", 0, Forbidden, Empty;
    SPAN = 87, "span", 1, Required, Flow;
    STRIKE = 88, "strike", 1, Required, Phrase;
    STRONG = 89, "strong", 1, Required, Phrase;
    STYLE = 90, "style", 1, Required, Only(TEXT_ONLY);
    SUB = 91, "sub", 1, Required, Phrase;
    SUP = 92, "sup", 1, Required, Phrase;
    TABLE = 93, "table", 9, Required, Only(TABLE_CHILDREN);
    TBODY = 94, "tbody", 8, Optional, Only(SECTION_CHILDREN);
    TD = 95, "td", 6, Optional, Flow;
    TEXTAREA = 96, "textarea", 1, Required, Only(TEXT_ONLY);
    TFOOT = 97, "tfoot", 8, Optional, Only(SECTION_CHILDREN);
    TH = 98, "th", 6, Optional, Flow;
    THEAD = 99, "thead", 8, Optional, Only(SECTION_CHILDREN);
    TITLE = 100, "title", 1, Required, Only(TEXT_ONLY);
    TR = 101, "tr", 7, Optional, Only(ROW_CHILDREN);
    TT = 102, "tt", 1, Required, Phrase;
    U = 103, "u", 1, Required, Phrase;
    UL = 104, "ul", 5, Required, FlowOr(&[TagId::LI]);
    VAR = 105, "var", 1, Required, Phrase;
    VIDEO = 106, "video", 1, Required, StrictFlowOr(&[TagId::SOURCE]);
    WBR = 107, "wbr", 0, Forbidden, Phrase;
    XMP = 108, "xmp", 5, Required, StrictFlowOr(&[]);
    TEXT = 109, "#text", 0, Required, Empty;
    COMMENT = 110, "#comment", 0, Required, Empty;
}

impl TagId {
    /// No tag. Used as the "not an element" sentinel.
    pub const NONE: Self = Self(0);

    /// The highest id of a known element (text counts as known).
    pub const LAST_TAG: Self = Self::TEXT;

    /// The first id handed out to custom element names.
    pub const FIRST_CUSTOM: Self = Self(Self::COMMENT.0 + 1);

    /// Look up the id of a known element name (ASCII case-insensitive).
    ///
    /// Returns `None` for custom names; see [`TagInterner`] for those.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        static BY_NAME: LazyLock<HashMap<&'static str, TagId>> = LazyLock::new(|| {
            TAGS.iter()
                .enumerate()
                .skip(1)
                .filter(|(_, info)| !info.name.starts_with('#'))
                .filter_map(|(i, info)| u16::try_from(i).ok().map(|id| (info.name, TagId(id))))
                .collect()
        });

        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
        } else {
            BY_NAME.get(name).copied()
        }
    }

    /// Whether this id names a custom (unknown) element.
    #[must_use]
    pub const fn is_custom(self) -> bool {
        self.0 > Self::COMMENT.0
    }

    /// The canonical lowercase name of a known tag, or `None` for custom ids.
    #[must_use]
    pub fn known_name(self) -> Option<&'static str> {
        if self.is_custom() || self == Self::NONE {
            None
        } else {
            TAGS.get(usize::from(self.0)).map(|info| info.name)
        }
    }

    /// Custom elements behave exactly like `<span>` in every table.
    #[must_use]
    pub const fn normalized(self) -> Self {
        if self.is_custom() { Self::SPAN } else { self }
    }

    fn info(self) -> &'static TagInfo {
        &TAGS[usize::from(self.normalized().0)]
    }

    /// `<h1>` through `<h6>`.
    #[must_use]
    pub const fn is_heading(self) -> bool {
        self.0 >= Self::H1.0 && self.0 <= Self::H6.0
    }

    /// Table structure tags that cannot hold flow content themselves.
    #[must_use]
    pub const fn is_table_related(self) -> bool {
        matches!(
            self,
            Self::TR | Self::TD | Self::TABLE | Self::TBODY | Self::TFOOT | Self::THEAD | Self::TH
        )
    }

    /// `<thead>`, `<tbody>` or `<tfoot>`.
    #[must_use]
    pub const fn is_table_section(self) -> bool {
        matches!(self, Self::THEAD | Self::TBODY | Self::TFOOT)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "#custom{}", self.0),
        }
    }
}

/// Priority of a tag. Closing a tag of higher priority closes open tags of
/// lower priority.
///
/// | level | elements |
/// |-------|----------|
/// | 0 | void elements and text (never pushed) |
/// | 1 | formatting elements |
/// | 2 | option |
/// | 3 | form, noscript |
/// | 5 | block elements, nobr |
/// | 6 | td, th, select |
/// | 7 | tr |
/// | 8 | tbody, thead, tfoot |
/// | 9 | table |
/// | 10 | body, frameset, head, noembed, noframes |
/// | 11 | html |
#[must_use]
pub fn tag_priority(tag: TagId) -> u16 {
    if tag == TagId::COMMENT {
        return 0;
    }
    tag.info().priority
}

/// End-tag requirement of a tag.
#[must_use]
pub fn end_tag_requirement(tag: TagId) -> EndTag {
    if tag == TagId::COMMENT {
        return EndTag::Required;
    }
    tag.info().end_tag
}

/// Tags that stop an upward scope search for a matching open element.
#[must_use]
pub const fn is_scope_boundary(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::APPLET
            | TagId::CAPTION
            | TagId::HTML
            | TagId::TABLE
            | TagId::TD
            | TagId::TH
            | TagId::BUTTON
            | TagId::MARQUEE
            | TagId::OBJECT
    )
}

/// Formatting tags whose style spans block boundaries and is re-opened after
/// a misnested close.
#[must_use]
pub const fn is_residual_style(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::A
            | TagId::B
            | TagId::BIG
            | TagId::EM
            | TagId::FONT
            | TagId::I
            | TagId::NOBR
            | TagId::S
            | TagId::SMALL
            | TagId::STRIKE
            | TagId::STRONG
            | TagId::TT
            | TagId::U
            | TagId::DFN
            | TagId::CODE
            | TagId::SAMP
            | TagId::KBD
            | TagId::VAR
            | TagId::DEL
            | TagId::INS
    )
}

/// Tags across which residual style is carried: the formatting tags
/// themselves plus the common block containers.
#[must_use]
pub const fn is_affected_by_residual_style(tag: TagId) -> bool {
    is_residual_style(tag)
        || matches!(
            tag,
            TagId::P
                | TagId::DIV
                | TagId::BLOCKQUOTE
                | TagId::ADDRESS
                | TagId::H1
                | TagId::H2
                | TagId::H3
                | TagId::H4
                | TagId::H5
                | TagId::H6
                | TagId::CENTER
                | TagId::UL
                | TagId::OL
                | TagId::LI
                | TagId::DL
                | TagId::DT
                | TagId::DD
                | TagId::PRE
                | TagId::LISTING
        )
}

/// Inline (phrasing) content.
#[must_use]
pub const fn is_inline(tag: TagId, strict: bool) -> bool {
    let inline = matches!(
        tag,
        TagId::TEXT
            | TagId::TT
            | TagId::I
            | TagId::B
            | TagId::BIG
            | TagId::SMALL
            | TagId::U
            | TagId::S
            | TagId::STRIKE
            | TagId::FONT
            | TagId::BASEFONT
            | TagId::EM
            | TagId::STRONG
            | TagId::DFN
            | TagId::CODE
            | TagId::Q
            | TagId::SAMP
            | TagId::KBD
            | TagId::VAR
            | TagId::CITE
            | TagId::ABBR
            | TagId::ACRONYM
            | TagId::SUB
            | TagId::SUP
            | TagId::INPUT
            | TagId::SELECT
            | TagId::TEXTAREA
            | TagId::LABEL
            | TagId::BUTTON
            | TagId::A
            | TagId::OBJECT
            | TagId::IMAGE
            | TagId::IMG
            | TagId::APPLET
            | TagId::IFRAME
            | TagId::EMBED
            | TagId::BR
            | TagId::SPAN
            | TagId::BDO
            | TagId::MAP
            | TagId::SCRIPT
            | TagId::INS
            | TagId::DEL
            | TagId::ILAYER
            | TagId::NOBR
            | TagId::WBR
            | TagId::CANVAS
            | TagId::AUDIO
            | TagId::VIDEO
    );
    // <noscript> is a block, but parsed as inline by legacy browsers.
    inline || (!strict && matches!(tag, TagId::NOSCRIPT))
}

/// Block content.
#[must_use]
pub const fn is_block(tag: TagId, strict: bool) -> bool {
    let block = matches!(
        tag,
        TagId::TEXT
            | TagId::P
            | TagId::H1
            | TagId::H2
            | TagId::H3
            | TagId::H4
            | TagId::H5
            | TagId::H6
            | TagId::UL
            | TagId::OL
            | TagId::DL
            | TagId::DIR
            | TagId::MENU
            | TagId::LISTING
            | TagId::PRE
            | TagId::HR
            | TagId::BLOCKQUOTE
            | TagId::ADDRESS
            | TagId::PLAINTEXT
            | TagId::XMP
            | TagId::CENTER
            | TagId::DIV
            | TagId::FIELDSET
            | TagId::TABLE
            | TagId::NOSCRIPT
            | TagId::NOFRAMES
            | TagId::FORM
            | TagId::ISINDEX
            | TagId::LAYER
            | TagId::MARQUEE
    );
    // Blocks allowed for quirky error recovery.
    block || (!strict && matches!(tag, TagId::LI | TagId::DD))
}

/// Flow content: block or inline.
#[must_use]
pub const fn is_flow(tag: TagId, strict: bool) -> bool {
    is_block(tag, strict) || is_inline(tag, strict)
}

/// Whether `parent` accepts `child` as a child node.
///
/// Comments are accepted under any element. Custom ids on either side are
/// treated as `<span>`.
#[must_use]
pub fn check_child(parent: TagId, child: TagId, strict: bool) -> bool {
    if child == TagId::COMMENT {
        return true;
    }
    if parent == TagId::COMMENT || parent == TagId::NONE {
        return false;
    }

    let child = child.normalized();
    match parent.info().children {
        Empty => false,
        Phrase => is_inline(child, strict) || is_block(child, strict),
        Paragraph => is_inline(child, strict) || (!strict && child == TagId::TABLE),
        Heading => {
            is_inline(child, strict) || (!strict && is_block(child, true) && !child.is_heading())
        }
        Address => is_inline(child, strict) || (!strict && child == TagId::P),
        Term => is_inline(child, strict) || (!strict && is_block(child, true) && child != TagId::DL),
        Label => is_inline(child, strict) || (!strict && is_block(child, true)),
        Map => {
            is_flow(child, true) || child == TagId::AREA || (!strict && child == TagId::SCRIPT)
        }
        Flow => is_flow(child, strict),
        FlowOr(extra) => extra.contains(&child) || is_flow(child, strict),
        StrictFlowOr(extra) => extra.contains(&child) || is_flow(child, true),
        Only(allowed) => allowed.contains(&child),
    }
}

/// Counters of tags that may not be opened while certain elements are open.
///
/// For example, a `<button>` forbids a nested `<button>`, `<a>` or `<form>`.
/// The counters are bumped when such an element is pushed on the open
/// element stack and lowered when it is popped.
#[derive(Debug, Clone)]
pub struct ForbiddenTags {
    counts: Vec<u16>,
}

impl ForbiddenTags {
    /// All counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: vec![0; TAGS.len()],
        }
    }

    /// Whether any open element currently forbids `tag`.
    #[must_use]
    pub fn is_forbidden(&self, tag: TagId) -> bool {
        self.counts
            .get(usize::from(tag.0))
            .is_some_and(|&count| count > 0)
    }

    /// Record that `tag` has been pushed on the open element stack.
    pub fn add(&mut self, tag: TagId) {
        for &forbidden in Self::forbidden_by(tag) {
            self.counts[usize::from(forbidden.0)] += 1;
        }
    }

    /// Record that `tag` has been popped from the open element stack.
    pub fn remove(&mut self, tag: TagId) {
        for &forbidden in Self::forbidden_by(tag) {
            let count = &mut self.counts[usize::from(forbidden.0)];
            *count = count.saturating_sub(1);
        }
    }

    /// Reset every counter (used when the parser is reset).
    pub fn clear(&mut self) {
        self.counts.fill(0);
    }

    const fn forbidden_by(tag: TagId) -> &'static [TagId] {
        match tag {
            // <nobr> additionally forbids what <pre> forbids.
            TagId::NOBR => &[
                TagId::PRE,
                TagId::LISTING,
                TagId::OBJECT,
                TagId::EMBED,
                TagId::APPLET,
                TagId::BASEFONT,
            ],
            TagId::PRE | TagId::LISTING | TagId::XMP | TagId::PLAINTEXT => &[
                TagId::OBJECT,
                TagId::EMBED,
                TagId::APPLET,
                TagId::BASEFONT,
            ],
            TagId::LABEL => &[TagId::LABEL],
            TagId::BUTTON => &[
                TagId::A,
                TagId::INPUT,
                TagId::SELECT,
                TagId::TEXTAREA,
                TagId::LABEL,
                TagId::BUTTON,
                TagId::FORM,
                TagId::ISINDEX,
                TagId::FIELDSET,
                TagId::IFRAME,
            ],
            // Nested anchors are allowed; the innermost one wins.
            _ => &[],
        }
    }
}

impl Default for ForbiddenTags {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out stable ids for element names, including custom ones.
///
/// Known names always map to their fixed id. Each distinct custom name gets
/// the next id starting at [`TagId::FIRST_CUSTOM`].
#[derive(Debug, Clone, Default)]
pub struct TagInterner {
    custom: HashMap<String, TagId>,
    names: Vec<String>,
}

impl TagInterner {
    /// An interner with no custom names yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for `name` (expected lowercase), allocating one for new custom
    /// names. Falls back to `<span>` if the custom id space is exhausted.
    pub fn intern(&mut self, name: &str) -> TagId {
        if let Some(id) = TagId::from_name(name) {
            return id;
        }
        if let Some(&id) = self.custom.get(name) {
            return id;
        }
        let next = usize::from(TagId::FIRST_CUSTOM.0) + self.names.len();
        let Ok(raw) = u16::try_from(next) else {
            return TagId::SPAN;
        };
        let id = TagId(raw);
        self.names.push(name.to_string());
        let _ = self.custom.insert(name.to_string(), id);
        id
    }

    /// The name behind any id this interner (or the static table) knows.
    #[must_use]
    pub fn name(&self, id: TagId) -> Option<&str> {
        id.known_name().or_else(|| {
            let index = usize::from(id.0.checked_sub(TagId::FIRST_CUSTOM.0)?);
            self.names.get(index).map(String::as_str)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_id() {
        for (i, info) in TAGS.iter().enumerate().skip(1) {
            let id = TagId(u16::try_from(i).unwrap());
            assert_eq!(id.known_name(), Some(info.name));
            if !info.name.starts_with('#') {
                assert_eq!(TagId::from_name(info.name), Some(id), "{}", info.name);
            }
        }
        assert_eq!(TAGS.len(), usize::from(TagId::COMMENT.0) + 1);
    }

    #[test]
    fn test_void_elements_have_priority_zero() {
        for (i, info) in TAGS.iter().enumerate() {
            if info.end_tag == EndTag::Forbidden {
                assert_eq!(info.priority, 0, "tag #{i}");
            }
        }
    }
}
