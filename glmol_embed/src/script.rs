//##############################
//#  Representation script grammar
//##############################

use crate::{
    error::SelectorError,
    selector::{SelectionValue, Selector, SelectorKind, SubSelector},
};
use thiserror::Error;

peg::parser! {
    grammar script_parser() for str {
        // Optional whitespace
        rule _ = [' ' | '\t']*
        // Mandatory whitespace
        rule __ = [' ' | '\t']+

        rule int() -> i32
            = n:$("-"? ['0'..='9']+)
            {? n.parse().or(Err("integer")) }

        // Characters allowed inside of a selection value, `Selector::new`
        // additionally rejects any other whitespace
        rule value_char() = [^ ' ' | '\t' | '\n' | '\r' | ',' | ';' | ':']

        rule token() -> String
            = s:$(value_char()+) { s.to_owned() }

        // Longer keywords go first since they share prefixes
        rule kind() -> SelectorKind
            = "chain_number" { SelectorKind::ChainNumber }
            / "chain" { SelectorKind::Chain }
            / "residue_number" { SelectorKind::ResidueNumber }
            / "resi" { SelectorKind::Residue }
            / "atomi" { SelectorKind::Atom }

        rule range() -> SelectionValue
            = b:int() "-" e:int() !value_char()
            { SelectionValue::Range(b, e) }

        rule set() -> SelectionValue
            = v:(token() **<2,> ",")
            { SelectionValue::Set(v) }

        rule single() -> SelectionValue
            = v:token() { SelectionValue::Single(v) }

        rule value() -> SelectionValue = range() / set() / single()

        rule base() -> Selector
            = "all" !value_char() { Selector::all() }
            / k:kind() __ v:value()
            {? Selector::new(k, v).or(Err("well-formed selection")) }

        rule sub() -> SubSelector
            = "elem" __ "C" { SubSelector::Carbon }
            / "heavy" { SubSelector::Heavyatom }
            / "bb" { SubSelector::Backbone }

        pub rule selector() -> Selector
            = _ b:base() subs:(_ ";" _ s:sub() {s})* _
            { subs.into_iter().fold(b, |sel, s| sel + s) }

        pub rule sub_selector() -> SubSelector
            = _ s:sub() _ { s }

        rule repr_type() -> &'input str
            = $(['a'..='z' | 'A'..='Z' | '0'..='9' | '_']+)

        pub rule entry() -> (&'input str, &'input str)
            = _ t:repr_type() _ ":" v:$([^ '\n']*)
            { (t, v.trim()) }
    } // grammar
} // parser

/// Error in the representation script
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("syntax error at line {line}:{msg}")]
    Syntax { line: usize, msg: String },
}

fn format_error(s: &str, e: &peg::error::ParseError<peg::str::LineCol>) -> String {
    format!(
        "\n{s}\n{}^\nExpected {}",
        "-".repeat(e.location.column.saturating_sub(1)),
        e.expected
    )
}

/// Parses a selector string like `residue_number 5-10; bb`
pub(crate) fn parse_selector(s: &str) -> Result<Selector, SelectorError> {
    script_parser::selector(s).map_err(|e| SelectorError::Syntax(s.to_owned(), format_error(s, &e)))
}

/// Parses a single sub-selector keyword like `elem C`
pub(crate) fn parse_sub_selector(s: &str) -> Result<SubSelector, SelectorError> {
    script_parser::sub_selector(s)
        .map_err(|e| SelectorError::Syntax(s.to_owned(), format_error(s, &e)))
}

/// Splits the representation script into `(type, selection)` pairs.
/// Blank lines are skipped, order is preserved.
pub fn parse_script(script: &str) -> Result<Vec<(String, String)>, ScriptError> {
    let mut entries = vec![];
    for (i, line) in script.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (t, v) = script_parser::entry(line).map_err(|e| ScriptError::Syntax {
            line: i + 1,
            msg: format_error(line, &e),
        })?;
        entries.push((t.to_owned(), v.to_owned()));
    }
    Ok(entries)
}

//##############################
//#  Tests
//##############################

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> String {
        parse_selector(s).unwrap().selector_string()
    }

    #[test]
    fn selector_syntax() {
        assert_eq!(sel("all"), "all");
        assert_eq!(sel("chain A"), "chain A");
        assert_eq!(sel("chain_number 2"), "chain_number 2");
        assert_eq!(sel("residue_number 5-10"), "residue_number 5-10");
        assert_eq!(sel("resi 1,2,5"), "resi 1,2,5");
        assert_eq!(sel("  all;heavy ; bb  "), "all; heavy; bb");
        assert_eq!(sel("atomi 53-82; elem C"), "atomi 53-82; elem C");
    }

    #[test]
    fn selector_values() {
        let s = parse_selector("residue_number -4--1").unwrap();
        assert_eq!(s.value(), Some(&SelectionValue::Range(-4, -1)));

        let s = parse_selector("resi 1,2").unwrap();
        assert_eq!(
            s.value(),
            Some(&SelectionValue::Set(vec!["1".into(), "2".into()]))
        );
        assert_eq!(s.kind(), SelectorKind::Residue);
    }

    #[test]
    fn selector_errors() {
        assert!(parse_selector("").is_err());
        assert!(parse_selector("chain").is_err());
        assert!(parse_selector("all; sidechain").is_err());
        assert!(parse_selector("residue 5").is_err());
    }

    #[test]
    fn sub_selector_keywords() {
        assert_eq!(parse_sub_selector(" elem C "), Ok(SubSelector::Carbon));
        assert_eq!(parse_sub_selector("bb"), Ok(SubSelector::Backbone));
        assert!(parse_sub_selector("sidechain").is_err());
    }

    #[test]
    fn script_entries() {
        let script = "ribbon:all\n\nline:all; heavy\ncolor:#ff0000:residue 5\n";
        let entries = parse_script(script).unwrap();
        assert_eq!(
            entries,
            vec![
                ("ribbon".to_owned(), "all".to_owned()),
                ("line".to_owned(), "all; heavy".to_owned()),
                ("color".to_owned(), "#ff0000:residue 5".to_owned()),
            ]
        );
    }

    #[test]
    fn script_error_line() {
        let err = parse_script("ribbon:all\nnot an entry").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 2, .. }));
    }
}
