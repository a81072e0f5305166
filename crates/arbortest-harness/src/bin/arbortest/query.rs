//! Query tests: path selection, coercions, literals and compile rejection.

use arbortest_dom::{Document, Query};
use arbortest_harness::{
    TestContext, TestRegistry, TestResult, check_double, check_query_boolean, check_query_fail,
    check_query_number, check_query_number_nan, check_query_string,
};

pub fn register(registry: &mut TestRegistry) {
    registry.add_fn("query_path_selects_first_match", path_selects_first_match);
    registry.add_fn("query_count_reports_cardinality", count_reports_cardinality);
    registry.add_fn("query_boolean_is_match_existence", boolean_is_match_existence);
    registry.add_fn("query_number_coercions", number_coercions);
    registry.add_fn("query_non_numeric_text_is_nan", non_numeric_text_is_nan);
    registry.add_fn("query_literals_evaluate_to_themselves", literals_evaluate_to_themselves);
    registry.add_fn("query_grammar_violations_do_not_compile", grammar_violations_do_not_compile);
}

fn sample() -> Result<Document, arbortest_dom::Error> {
    Document::parse("<shop><item>12</item><item>7</item><price>2.5</price><tag>sale</tag></shop>")
}

fn path_selects_first_match(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_string!(doc, "/shop/item", "12");
    check_query_string!(doc, "/shop/tag", "sale");
    check_query_string!(doc, "/shop/missing", "");
    Ok(())
}

fn count_reports_cardinality(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_number!(doc, "count(/shop/item)", 2.0);
    check_query_number!(doc, "count(/shop/missing)", 0.0);
    check_query_string!(doc, "count(/shop/item)", "2");
    Ok(())
}

fn boolean_is_match_existence(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_boolean!(doc, "/shop/item", true);
    check_query_boolean!(doc, "/shop/missing", false);
    Ok(())
}

fn number_coercions(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_number!(doc, "/shop/item", 12.0);
    check_query_number!(doc, "/shop/price", 2.5);
    check_query_number!(doc, "number(/shop/price)", 2.5);

    let compiled = Query::compile("/shop/price")?;
    check_double!(compiled.evaluate_number(&doc), 2.5);
    Ok(())
}

fn non_numeric_text_is_nan(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_number_nan!(doc, "number(/shop/tag)");
    check_query_number_nan!(doc, "number(/shop/missing)");
    check_query_string!(doc, "number(/shop/tag)", "NaN");
    Ok(())
}

fn literals_evaluate_to_themselves(_cx: &TestContext<'_>) -> TestResult {
    let doc = sample()?;
    check_query_boolean!(doc, "true()", true);
    check_query_boolean!(doc, "false()", false);
    check_query_string!(doc, "true()", "true");
    check_query_number!(doc, "true()", 1.0);
    Ok(())
}

fn grammar_violations_do_not_compile(_cx: &TestContext<'_>) -> TestResult {
    check_query_fail!("");
    check_query_fail!("item");
    check_query_fail!("count(/shop/item");
    check_query_fail!("/shop//item");
    check_query_fail!("name(/shop)");
    Ok(())
}
