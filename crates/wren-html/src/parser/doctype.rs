//! Compatibility mode selection from the document's doctype.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
//!
//! Legacy engines pick one of three rendering modes by looking the lowercased
//! public identifier up in a fixed table. Each row says which mode applies
//! when the doctype has no system identifier and which one applies when it
//! has one.

use std::collections::HashMap;
use std::sync::LazyLock;

use wren_dom::ParseMode;

use crate::tokenizer::DoctypeToken;

/// Mode of a known public identifier: `(without system id, with system id)`.
type ModePair = (ParseMode, ParseMode);

const QUIRKS: ModePair = (ParseMode::Compat, ParseMode::Compat);
const TRANSITIONAL: ModePair = (ParseMode::Compat, ParseMode::AlmostStandards);
const ALMOST_STANDARDS: ModePair = (ParseMode::AlmostStandards, ParseMode::AlmostStandards);

static PUBLIC_IDS: LazyLock<HashMap<&'static str, ModePair>> = LazyLock::new(|| {
    [
        ("+//silmaril//dtd html pro v0r11 19970101//en", QUIRKS),
        ("-//advasoft ltd//dtd html 3.0 aswedit + extensions//en", QUIRKS),
        ("-//as//dtd html 3.0 aswedit + extensions//en", QUIRKS),
        ("-//ietf//dtd html 2.0 level 1//en", QUIRKS),
        ("-//ietf//dtd html 2.0 level 2//en", QUIRKS),
        ("-//ietf//dtd html 2.0 strict level 1//en", QUIRKS),
        ("-//ietf//dtd html 2.0 strict level 2//en", QUIRKS),
        ("-//ietf//dtd html 2.0 strict//en", QUIRKS),
        ("-//ietf//dtd html 2.0//en", QUIRKS),
        ("-//ietf//dtd html 2.1e//en", QUIRKS),
        ("-//ietf//dtd html 3.0//en", QUIRKS),
        ("-//ietf//dtd html 3.0//en//", QUIRKS),
        ("-//ietf//dtd html 3.2 final//en", QUIRKS),
        ("-//ietf//dtd html 3.2//en", QUIRKS),
        ("-//ietf//dtd html 3//en", QUIRKS),
        ("-//ietf//dtd html level 0//en", QUIRKS),
        ("-//ietf//dtd html level 0//en//2.0", QUIRKS),
        ("-//ietf//dtd html level 1//en", QUIRKS),
        ("-//ietf//dtd html level 1//en//2.0", QUIRKS),
        ("-//ietf//dtd html level 2//en", QUIRKS),
        ("-//ietf//dtd html level 2//en//2.0", QUIRKS),
        ("-//ietf//dtd html level 3//en", QUIRKS),
        ("-//ietf//dtd html level 3//en//3.0", QUIRKS),
        ("-//ietf//dtd html strict level 0//en", QUIRKS),
        ("-//ietf//dtd html strict level 0//en//2.0", QUIRKS),
        ("-//ietf//dtd html strict level 1//en", QUIRKS),
        ("-//ietf//dtd html strict level 1//en//2.0", QUIRKS),
        ("-//ietf//dtd html strict level 2//en", QUIRKS),
        ("-//ietf//dtd html strict level 2//en//2.0", QUIRKS),
        ("-//ietf//dtd html strict level 3//en", QUIRKS),
        ("-//ietf//dtd html strict level 3//en//3.0", QUIRKS),
        ("-//ietf//dtd html strict//en", QUIRKS),
        ("-//ietf//dtd html strict//en//2.0", QUIRKS),
        ("-//ietf//dtd html strict//en//3.0", QUIRKS),
        ("-//ietf//dtd html//en", QUIRKS),
        ("-//ietf//dtd html//en//2.0", QUIRKS),
        ("-//ietf//dtd html//en//3.0", QUIRKS),
        ("-//metrius//dtd metrius presentational//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 2.0 html strict//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 2.0 html//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 2.0 tables//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 3.0 html strict//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 3.0 html//en", QUIRKS),
        ("-//microsoft//dtd internet explorer 3.0 tables//en", QUIRKS),
        ("-//netscape comm. corp.//dtd html//en", QUIRKS),
        ("-//netscape comm. corp.//dtd strict html//en", QUIRKS),
        ("-//o'reilly and associates//dtd html 2.0//en", QUIRKS),
        ("-//o'reilly and associates//dtd html extended 1.0//en", QUIRKS),
        ("-//spyglass//dtd html 2.0 extended//en", QUIRKS),
        ("-//sq//dtd html 2.0 hotmetal + extensions//en", QUIRKS),
        ("-//sun microsystems corp.//dtd hotjava html//en", QUIRKS),
        ("-//sun microsystems corp.//dtd hotjava strict html//en", QUIRKS),
        ("-//w3c//dtd html 3 1995-03-24//en", QUIRKS),
        ("-//w3c//dtd html 3.2 draft//en", QUIRKS),
        ("-//w3c//dtd html 3.2 final//en", QUIRKS),
        ("-//w3c//dtd html 3.2//en", QUIRKS),
        ("-//w3c//dtd html 3.2s draft//en", QUIRKS),
        ("-//w3c//dtd html 4.0 frameset//en", QUIRKS),
        ("-//w3c//dtd html 4.0 transitional//en", QUIRKS),
        ("-//w3c//dtd html 4.01 frameset//en", TRANSITIONAL),
        ("-//w3c//dtd html 4.01 transitional//en", TRANSITIONAL),
        ("-//w3c//dtd html experimental 19960712//en", QUIRKS),
        ("-//w3c//dtd html experimental 970421//en", QUIRKS),
        ("-//w3c//dtd w3 html//en", QUIRKS),
        ("-//w3c//dtd xhtml 1.0 frameset//en", ALMOST_STANDARDS),
        ("-//w3c//dtd xhtml 1.0 transitional//en", ALMOST_STANDARDS),
        ("-//w3o//dtd w3 html 3.0//en", QUIRKS),
        ("-//w3o//dtd w3 html 3.0//en//", QUIRKS),
        ("-//w3o//dtd w3 html strict 3.0//en//", QUIRKS),
        ("-//webtechs//dtd mozilla html 2.0//en", QUIRKS),
        ("-//webtechs//dtd mozilla html//en", QUIRKS),
        ("-/w3c/dtd html 4.0 transitional/en", QUIRKS),
        ("html", QUIRKS),
    ]
    .into_iter()
    .collect()
});

/// Select the compatibility mode for a doctype.
///
/// - A name other than `html` is a malformed doctype: [`ParseMode::Compat`].
/// - An internal subset, or no public identifier at all, means
///   [`ParseMode::Strict`].
/// - Otherwise the lowercased public identifier is looked up; identifiers
///   missing from the table are taken to be strict.
#[must_use]
pub fn select_parse_mode(doctype: &DoctypeToken) -> ParseMode {
    if !doctype.name.eq_ignore_ascii_case("html") {
        return ParseMode::Compat;
    }
    if !doctype.internal_subset.is_empty() || doctype.public_id.is_empty() {
        return ParseMode::Strict;
    }

    let public_id = doctype.public_id.to_ascii_lowercase();
    match PUBLIC_IDS.get(public_id.as_str()) {
        None => ParseMode::Strict,
        Some(&(without_system_id, with_system_id)) => {
            if doctype.system_id.is_empty() {
                without_system_id
            } else {
                with_system_id
            }
        }
    }
}
