//! Absolute-path query engine.
//!
//! Grammar: `/step/step...` selects elements by name from the document
//! root; `count(path)` and `number(path)` wrap a path; `true()` and
//! `false()` are literals. Results coerce between string, number and
//! boolean the XPath way: the number of a non-numeric or absent string is
//! NaN, the boolean of a path is match-existence.

use crate::tree::{Document, Node, is_name_byte};
use crate::Error;

enum Expr {
    Path(Vec<String>),
    Count(Vec<String>),
    NumberOf(Vec<String>),
    True,
    False,
}

/// A compiled query.
pub struct Query {
    expr: Expr,
}

impl Query {
    /// Compile query text; rejects anything outside the grammar.
    pub fn compile(text: &str) -> Result<Query, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::QueryCompile("empty query"));
        }
        let expr = if let Some(rest) = text.strip_prefix("count(") {
            Expr::Count(parse_call_path(rest)?)
        } else if let Some(rest) = text.strip_prefix("number(") {
            Expr::NumberOf(parse_call_path(rest)?)
        } else if text == "true()" {
            Expr::True
        } else if text == "false()" {
            Expr::False
        } else if text.starts_with('/') {
            Expr::Path(parse_path(text)?)
        } else {
            return Err(Error::QueryCompile("expected absolute path or function"));
        };
        Ok(Query { expr })
    }

    /// Evaluate to a string.
    #[must_use]
    pub fn evaluate_string(&self, doc: &Document) -> String {
        match &self.expr {
            Expr::Path(steps) => select(doc, steps)
                .first()
                .map_or_else(String::new, |node| node.text().to_owned()),
            Expr::Count(steps) => format_number(select(doc, steps).len() as f64),
            Expr::NumberOf(steps) => format_number(path_number(doc, steps)),
            Expr::True => "true".to_owned(),
            Expr::False => "false".to_owned(),
        }
    }

    /// Evaluate to a number.
    #[must_use]
    pub fn evaluate_number(&self, doc: &Document) -> f64 {
        match &self.expr {
            Expr::Path(steps) | Expr::NumberOf(steps) => path_number(doc, steps),
            Expr::Count(steps) => select(doc, steps).len() as f64,
            Expr::True => 1.0,
            Expr::False => 0.0,
        }
    }

    /// Evaluate to a boolean.
    #[must_use]
    pub fn evaluate_boolean(&self, doc: &Document) -> bool {
        match &self.expr {
            Expr::Path(steps) => !select(doc, steps).is_empty(),
            Expr::Count(steps) => !select(doc, steps).is_empty(),
            Expr::NumberOf(steps) => {
                let n = path_number(doc, steps);
                n != 0.0 && !n.is_nan()
            }
            Expr::True => true,
            Expr::False => false,
        }
    }
}

fn parse_call_path(rest: &str) -> Result<Vec<String>, Error> {
    let inner = rest
        .strip_suffix(')')
        .ok_or(Error::QueryCompile("missing closing parenthesis"))?;
    parse_path(inner.trim())
}

fn parse_path(text: &str) -> Result<Vec<String>, Error> {
    let Some(rest) = text.strip_prefix('/') else {
        return Err(Error::QueryCompile("expected absolute path"));
    };
    let mut steps = Vec::new();
    for step in rest.split('/') {
        if step.is_empty() {
            return Err(Error::QueryCompile("empty path step"));
        }
        if !step.bytes().all(is_name_byte) {
            return Err(Error::QueryCompile("invalid path step"));
        }
        steps.push(step.to_owned());
    }
    Ok(steps)
}

fn select<'a>(doc: &'a Document, steps: &[String]) -> Vec<Node<'a>> {
    let mut current = vec![doc.root()];
    for step in steps {
        let mut next = Vec::new();
        for node in current {
            next.extend(node.children().filter(|c| c.name() == step.as_str()));
        }
        current = next;
    }
    current
}

fn path_number(doc: &Document, steps: &[String]) -> f64 {
    select(doc, steps)
        .first()
        .map_or(f64::NAN, |node| match node.text().trim() {
            "" => f64::NAN,
            text => text.parse::<f64>().unwrap_or(f64::NAN),
        })
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::parse("<shop><item>12</item><item>7</item><tag>sale</tag></shop>")
            .expect("sample document")
    }

    #[test]
    fn path_selects_first_match_text() {
        let doc = sample();
        let query = Query::compile("/shop/item").expect("compile");
        assert_eq!(query.evaluate_string(&doc), "12");
        assert!(query.evaluate_boolean(&doc));
        assert_eq!(query.evaluate_number(&doc), 12.0);
    }

    #[test]
    fn missing_path_is_empty_false_and_nan() {
        let doc = sample();
        let query = Query::compile("/shop/missing").expect("compile");
        assert_eq!(query.evaluate_string(&doc), "");
        assert!(!query.evaluate_boolean(&doc));
        assert!(query.evaluate_number(&doc).is_nan());
    }

    #[test]
    fn count_reports_match_cardinality() {
        let doc = sample();
        let query = Query::compile("count(/shop/item)").expect("compile");
        assert_eq!(query.evaluate_number(&doc), 2.0);
        assert_eq!(query.evaluate_string(&doc), "2");
        assert!(query.evaluate_boolean(&doc));
    }

    #[test]
    fn number_of_non_numeric_text_is_nan() {
        let doc = sample();
        let query = Query::compile("number(/shop/tag)").expect("compile");
        assert!(query.evaluate_number(&doc).is_nan());
        assert_eq!(query.evaluate_string(&doc), "NaN");
        assert!(!query.evaluate_boolean(&doc));
    }

    #[test]
    fn boolean_literals_evaluate_to_themselves() {
        let doc = sample();
        assert!(Query::compile("true()").expect("compile").evaluate_boolean(&doc));
        assert!(!Query::compile("false()").expect("compile").evaluate_boolean(&doc));
        assert_eq!(
            Query::compile("true()").expect("compile").evaluate_number(&doc),
            1.0
        );
    }

    #[test]
    fn grammar_violations_fail_to_compile() {
        for bad in ["", "   ", "item", "count(/shop/item", "/shop//item", "/shop/it em", "name(/a)"] {
            assert!(
                matches!(Query::compile(bad), Err(Error::QueryCompile(_))),
                "{bad:?} must not compile"
            );
        }
    }
}
