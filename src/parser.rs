//! Grammar-driven parsing of surface text into [`Formula`] trees, plus a
//! defensive regex-style fallback used only to accept/reject input when
//! the full parser cannot be exercised (see `validate_syntax_fallback`).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::formula::{Formula, Term};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct FormulaParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
    #[error("malformed number literal: {0}")]
    Number(String),
}

/// Parses a single formula. The input must already be normalized for the
/// result to be storage-ready, but parsing itself accepts both canonical
/// and legacy/ASCII operator surfaces (see `grammar.pest`).
pub fn parse(input: &str) -> Result<Formula, ParseError> {
    let mut pairs =
        FormulaParser::parse(Rule::formula, input).map_err(|e| ParseError::Pest(Box::new(e)))?;
    let formula_pair = pairs.next().expect("formula rule always produces a pair");
    let mut inner = formula_pair.into_inner();
    let implication = inner.next().expect("formula contains an implication");
    build_implication(implication)
}

/// Distinct predicate names referenced by `input`, in first-occurrence
/// order. Fails the same way `parse` does.
pub fn extract_predicates(input: &str) -> Result<Vec<String>, ParseError> {
    Ok(parse(input)?.extract_predicates())
}

fn build_implication(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    debug_assert_eq!(pair.as_rule(), Rule::implication);
    let mut inner = pair.into_inner();
    let left = build_disjunction(inner.next().expect("implication has a left side"))?;
    match inner.next() {
        Some(rest) => Ok(Formula::Implies(
            Box::new(left),
            Box::new(build_implication(rest)?),
        )),
        None => Ok(left),
    }
}

fn build_disjunction(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    debug_assert_eq!(pair.as_rule(), Rule::disjunction);
    let mut inner = pair.into_inner();
    let mut acc = build_conjunction(inner.next().expect("disjunction has a first conjunct"))?;
    for next in inner {
        acc = Formula::Or(Box::new(acc), Box::new(build_conjunction(next)?));
    }
    Ok(acc)
}

fn build_conjunction(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    debug_assert_eq!(pair.as_rule(), Rule::conjunction);
    let mut inner = pair.into_inner();
    let mut acc = build_negation(inner.next().expect("conjunction has a first conjunct"))?;
    for next in inner {
        acc = Formula::And(Box::new(acc), Box::new(build_negation(next)?));
    }
    Ok(acc)
}

fn build_negation(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    debug_assert_eq!(pair.as_rule(), Rule::negation);
    let inner = pair
        .into_inner()
        .next()
        .expect("negation wraps atom_level or a nested negation");
    match inner.as_rule() {
        Rule::negation => Ok(build_negation(inner)?.negated()),
        Rule::atom_level => build_atom_level(inner),
        other => unreachable!("unexpected rule under negation: {other:?}"),
    }
}

fn build_atom_level(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    debug_assert_eq!(pair.as_rule(), Rule::atom_level);
    let inner = pair
        .into_inner()
        .next()
        .expect("atom_level always has exactly one alternative");
    match inner.as_rule() {
        Rule::forall => build_forall(inner),
        Rule::equality => build_equality(inner),
        Rule::predicate => build_predicate(inner),
        Rule::paren => {
            let implication = inner
                .into_inner()
                .next()
                .expect("paren wraps an implication");
            build_implication(implication)
        }
        other => unreachable!("unexpected rule under atom_level: {other:?}"),
    }
}

fn build_forall(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    let mut inner = pair.into_inner();
    let var = inner.next().expect("forall binds a variable").as_str().to_string();
    let body = build_atom_level(inner.next().expect("forall has a body"))?;
    Ok(Formula::ForAll(var, Box::new(body)))
}

fn build_equality(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    let mut inner = pair.into_inner();
    let lhs = build_term(inner.next().expect("equality has a left term"))?;
    let rhs = build_term(inner.next().expect("equality has a right term"))?;
    Ok(Formula::Equals(lhs, rhs))
}

fn build_predicate(pair: Pair<Rule>) -> Result<Formula, ParseError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .expect("predicate always has a name")
        .as_str()
        .to_string();
    let args = inner.map(build_term).collect::<Result<Vec<_>, _>>()?;
    Ok(Formula::Atom {
        predicate: name,
        args,
    })
}

fn build_term(pair: Pair<Rule>) -> Result<Term, ParseError> {
    let inner = pair.into_inner().next().expect("term has one alternative");
    match inner.as_rule() {
        Rule::number => {
            let cleaned: String = inner.as_str().chars().filter(|c| *c != '_').collect();
            cleaned
                .parse::<i64>()
                .map(Term::Number)
                .map_err(|_| ParseError::Number(inner.as_str().to_string()))
        }
        Rule::constant => Ok(Term::Constant(inner.as_str().to_string())),
        Rule::variable => Ok(Term::Variable(inner.as_str().to_string())),
        other => unreachable!("unexpected rule under term: {other:?}"),
    }
}

/// A defensive secondary acceptance check, used only when the caller
/// needs a cheap accept/reject answer without building a tree (e.g. a
/// prover's `validate_syntax`). Real parsing always goes through
/// [`parse`]; this exists so that path has its own, separately testable
/// fallback rather than being the only way in.
pub fn validate_syntax_fallback(input: &str) -> (bool, String) {
    let trimmed = input.trim();
    if !trimmed.ends_with('.') {
        return (false, "formula must end with '.'".to_string());
    }
    let body = &trimmed[..trimmed.len() - 1];
    if body.is_empty() {
        return (false, "formula body is empty".to_string());
    }
    let allowed = |c: char| {
        c.is_alphanumeric()
            || " ()[]{},_=-.¬∧∨→∀".contains(c)
            || "~&|".contains(c)
    };
    if let Some(bad) = body.chars().find(|c| !allowed(*c)) {
        return (false, format!("unexpected character '{bad}'"));
    }
    let mut depth = 0i32;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return (false, "unbalanced parentheses".to_string());
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return (false, "unbalanced parentheses".to_string());
    }
    (true, "syntax plausible".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_atom() {
        let f = parse("IsPhilosopher(Socrates).").unwrap();
        assert_eq!(f.canonical(), "IsPhilosopher(Socrates).");
    }

    #[test]
    fn parses_nullary_predicate() {
        let f = parse("IsOnline().").unwrap();
        assert_eq!(f.canonical(), "IsOnline().");
    }

    #[test]
    fn parses_negation_with_ascii_operator() {
        let f = parse("~IsOnline(ServerA).").unwrap();
        assert_eq!(f.canonical(), "¬IsOnline(ServerA).");
    }

    #[test]
    fn double_negation_collapses_while_parsing() {
        let f = parse("~~IsOnline(ServerA).").unwrap();
        assert_eq!(f.canonical(), "IsOnline(ServerA).");
    }

    #[test]
    fn parses_implication_and_quantifier() {
        let f = parse("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap();
        assert_eq!(
            f.canonical(),
            "∀x.(IsLegacy(x) → ShouldRefactor(x))."
        );
    }

    #[test]
    fn implication_is_right_associative() {
        let f = parse("A() -> B() -> C().").unwrap();
        match f {
            Formula::Implies(_, rhs) => assert!(matches!(*rhs, Formula::Implies(_, _))),
            other => panic!("expected nested implication, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unterminated_formula() {
        assert!(parse("IsPhilosopher(Socrates)").is_err());
    }

    #[test]
    fn extract_predicates_matches_formula_method() {
        let preds = extract_predicates("A() & (B() -> A()).").unwrap();
        assert_eq!(preds, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn fallback_rejects_unbalanced_parens() {
        let (ok, _) = validate_syntax_fallback("Foo(Bar.");
        assert!(!ok);
    }

    #[test]
    fn fallback_accepts_plausible_formula() {
        let (ok, _) = validate_syntax_fallback("Foo(Bar).");
        assert!(ok);
    }
}
