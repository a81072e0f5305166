//! Document tests: parsing, navigation, mutation and serialization.

use arbortest_dom::{Document, Format};
use arbortest_harness::{
    TestContext, TestRegistry, TestResult, check, check_name_value, check_node, check_node_ex,
    check_string,
};

pub fn register(registry: &mut TestRegistry) {
    registry.add_fn("document_parse_round_trips", parse_round_trips);
    registry.add_fn("document_navigation_reads_names_and_text", navigation_reads_names_and_text);
    registry.add_fn("document_builder_constructs_subtrees", builder_constructs_subtrees);
    registry.add_fn("document_set_value_replaces_text", set_value_replaces_text);
    registry.add_fn("document_entities_round_trip", entities_round_trip);
    registry.add_fn("document_pretty_serialization_indents", pretty_serialization_indents);
    registry.add_fn("document_parse_rejects_malformed_input", parse_rejects_malformed_input);
}

fn parse_round_trips(_cx: &TestContext<'_>) -> TestResult {
    let doc = Document::parse("<node><child>text</child><empty/></node>")?;
    check_node!(doc.root(), "<node><child>text</child><empty/></node>");
    Ok(())
}

fn navigation_reads_names_and_text(_cx: &TestContext<'_>) -> TestResult {
    let doc = Document::parse("<node><child>text</child></node>")?;
    check!(doc.root().child("node").is_some());

    if let Some(node) = doc.root().child("node") {
        check_name_value!(node, "node", "");
        check_string!(node.child("child").map_or("", |c| c.text()), "text");
        check!(node.child("absent").is_none());
    }
    Ok(())
}

fn builder_constructs_subtrees(_cx: &TestContext<'_>) -> TestResult {
    let mut doc = Document::new();
    let root = doc.root_id();
    let node = doc.append_child(root, "node")?;
    doc.append_child(node, "child")?;
    doc.append_text(node, "payload")?;

    check_node!(doc.root(), "<node><child/>payload</node>");
    Ok(())
}

fn set_value_replaces_text(_cx: &TestContext<'_>) -> TestResult {
    let mut doc = Document::parse("<node>old</node>")?;
    let text_id = doc
        .root()
        .child("node")
        .and_then(|n| n.first_child())
        .map(|n| n.id());
    check!(text_id.is_some());

    if let Some(id) = text_id {
        doc.set_value(id, "new")?;
    }
    check_node!(doc.root(), "<node>new</node>");
    Ok(())
}

fn entities_round_trip(_cx: &TestContext<'_>) -> TestResult {
    let doc = Document::parse("<node>1 &lt; 2 &amp; 3 &gt; 2</node>")?;
    check_string!(doc.root().child("node").map_or("", |n| n.text()), "1 < 2 & 3 > 2");
    check_node!(doc.root(), "<node>1 &lt; 2 &amp; 3 &gt; 2</node>");
    Ok(())
}

fn pretty_serialization_indents(_cx: &TestContext<'_>) -> TestResult {
    let doc = Document::parse("<node><child>text</child><empty/></node>")?;
    check_node_ex!(
        doc.root(),
        "<node>\n\t<child>text</child>\n\t<empty/>\n</node>\n",
        Format::Pretty
    );
    Ok(())
}

fn parse_rejects_malformed_input(_cx: &TestContext<'_>) -> TestResult {
    check!(Document::parse("<node>").is_err());
    check!(Document::parse("</node>").is_err());
    check!(Document::parse("<node></other>").is_err());
    check!(Document::parse("<node attr=\"1\"/>").is_err());
    check!(Document::parse("<node>&bogus;</node>").is_err());
    Ok(())
}
