use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};
use test_log::test;

use docmark_core::{
    apitree::{ApiKind, ApiObject, ApiRef, ApiSuite, SuiteResolver},
    diagnostic::{DiagnosticSink, UnresolvedReport},
    error::DocmarkError,
    interfaces::{Processor, Resolver, ResolverV2},
    processors::{crossref::parse_link_directive, CrossrefProcessor},
};

/// Resolver backed by a fixed name→address table. Records every lookup it is
/// asked to perform so tests can assert on the keys the engine used.
#[derive(Default)]
struct MapResolver {
    hrefs: BTreeMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl MapResolver {
    fn with(entries: &[(&str, &str)]) -> Self {
        MapResolver {
            hrefs: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            requested: Mutex::new(vec![]),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

impl Resolver for MapResolver {
    fn resolve_ref(
        &self,
        _scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<String>, DocmarkError> {
        self.requested.lock().push(reference.to_string());
        Ok(self.hrefs.get(reference).cloned())
    }
}

struct FailingResolver;

impl Resolver for FailingResolver {
    fn resolve_ref(
        &self,
        scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<String>, DocmarkError> {
        Err(DocmarkError::resolver(
            scope.fqid(),
            reference,
            "index backend offline",
        ))
    }
}

struct FailingResolverV2;

impl ResolverV2 for FailingResolverV2 {
    fn resolve_reference(
        &self,
        _suite: &ApiSuite,
        scope: &ApiObject,
        reference: &str,
    ) -> Result<Option<ApiRef>, DocmarkError> {
        Err(DocmarkError::resolver(
            scope.fqid(),
            reference,
            "suite index corrupted",
        ))
    }
}

#[derive(Default, Clone)]
struct CollectingSink(Arc<Mutex<Vec<UnresolvedReport>>>);

impl DiagnosticSink for CollectingSink {
    fn unresolved(&mut self, report: &UnresolvedReport) {
        self.0.lock().push(report.clone());
    }
}

fn module_with(name: &str, docstrings: &[(&str, &str)]) -> ApiObject {
    let mut module = ApiObject::new(ApiKind::Module, name);
    for (child, docstring) in docstrings {
        module.push_child(ApiObject::new(ApiKind::Class, *child).with_docstring(*docstring));
    }
    module
}

fn content_of<'a>(forest: &'a [ApiObject], module: usize, child: usize) -> &'a str {
    &forest[module].children[child]
        .docstring
        .as_ref()
        .unwrap()
        .content
}

#[test]
fn text_without_markers_is_byte_for_byte_unchanged() {
    let original = "A docstring with no references. Periods. Code spans `like this`.";
    let mut forest = vec![module_with("pkg", &[("Plain", original)])];
    let report = CrossrefProcessor::new().apply(&mut forest, None).unwrap();
    assert_eq!(content_of(&forest, 0, 0), original);
    assert!(report.is_empty());
}

#[test]
fn absent_resolver_falls_back_and_reports_every_token() {
    let mut forest = vec![module_with(
        "pkg",
        &[("First", "#Alpha"), ("Second", "See #Beta and #Gamma")],
    )];
    let report = CrossrefProcessor::new().apply(&mut forest, None).unwrap();

    assert_eq!(content_of(&forest, 0, 0), "`Alpha`");
    assert_eq!(content_of(&forest, 0, 1), "See `Beta` and `Gamma`");
    assert_eq!(report.len(), 2);
    assert_eq!(report.total(), 3);
    assert_eq!(report.get("pkg.First").unwrap().references, vec!["Alpha"]);
    assert_eq!(
        report.get("pkg.Second").unwrap().references,
        vec!["Beta", "Gamma"]
    );
}

#[test]
fn basic_resolver_emits_inline_hyperlinks() {
    let mut forest = vec![module_with("pkg", &[("Doc", "See #Foo for details")])];
    let resolver = MapResolver::with(&[("Foo", "/api/foo")]);
    let report = CrossrefProcessor::new()
        .apply(&mut forest, Some(&resolver))
        .unwrap();

    assert_eq!(content_of(&forest, 0, 0), "See [`Foo`](/api/foo) for details");
    assert!(report.is_empty());
}

#[test]
fn trailing_sentence_period_stays_outside_the_substitution() {
    // Unresolved: the period must sit outside the code span.
    let mut forest = vec![module_with("pkg", &[("Doc", "See #Foo.")])];
    let report = CrossrefProcessor::new().apply(&mut forest, None).unwrap();
    assert_eq!(content_of(&forest, 0, 0), "See `Foo`.");
    assert_eq!(report.get("pkg.Doc").unwrap().references, vec!["Foo"]);

    // Resolved: same rule, period outside the link.
    let mut forest = vec![module_with("pkg", &[("Doc", "See #Foo.")])];
    let resolver = MapResolver::with(&[("Foo", "/api/foo")]);
    CrossrefProcessor::new()
        .apply(&mut forest, Some(&resolver))
        .unwrap();
    assert_eq!(content_of(&forest, 0, 0), "See [`Foo`](/api/foo).");
    // The lookup key itself never carried the period.
    assert_eq!(resolver.requested(), vec!["Foo"]);
}

#[test]
fn append_mode_displays_the_suffix_but_looks_up_the_target() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#Foo#bar")])];
    let resolver = MapResolver::with(&[]);
    let report = CrossrefProcessor::new()
        .apply(&mut forest, Some(&resolver))
        .unwrap();

    assert_eq!(content_of(&forest, 0, 0), "`Foo#bar`");
    assert_eq!(resolver.requested(), vec!["Foo"]);
    assert_eq!(report.get("pkg.Doc").unwrap().references, vec!["Foo"]);
}

#[test]
fn rename_displays_the_alias_and_looks_up_the_real_name() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#this~Foo")])];
    let resolver = MapResolver::with(&[("Foo", "/api/foo")]);
    CrossrefProcessor::new()
        .apply(&mut forest, Some(&resolver))
        .unwrap();

    assert_eq!(content_of(&forest, 0, 0), "[`this`](/api/foo)");
    assert_eq!(resolver.requested(), vec!["Foo"]);
}

#[test]
fn call_suffix_is_part_of_the_display_text() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#Foo()")])];
    let resolver = MapResolver::with(&[("Foo", "/api/foo")]);
    CrossrefProcessor::new()
        .apply(&mut forest, Some(&resolver))
        .unwrap();

    assert_eq!(content_of(&forest, 0, 0), "[`Foo()`](/api/foo)");
}

#[test]
fn typed_resolver_takes_priority_over_basic() {
    let mut module = module_with("pkg", &[("Doc", "#Target")]);
    module.push_child(ApiObject::new(ApiKind::Class, "Target"));
    let mut forest = vec![module];

    let basic = MapResolver::with(&[("Target", "/api/target")]);
    let processor = CrossrefProcessor::new().with_resolver_v2(Box::new(SuiteResolver));
    let report = processor.apply(&mut forest, Some(&basic)).unwrap();

    assert_eq!(
        content_of(&forest, 0, 0),
        "{@link api:pkg.Target :with text = \"Target\"}"
    );
    assert!(report.is_empty());
    // The basic resolver is never consulted while a typed one is configured.
    assert!(basic.requested().is_empty());
}

#[test]
fn typed_resolver_miss_does_not_fall_through_to_basic() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#Nowhere")])];
    let basic = MapResolver::with(&[("Nowhere", "/api/nowhere")]);
    let processor = CrossrefProcessor::new().with_resolver_v2(Box::new(SuiteResolver));
    let report = processor.apply(&mut forest, Some(&basic)).unwrap();

    assert_eq!(content_of(&forest, 0, 0), "`Nowhere`");
    assert!(basic.requested().is_empty());
    assert_eq!(report.get("pkg.Doc").unwrap().references, vec!["Nowhere"]);
}

#[test]
fn directive_round_trips_across_modules() {
    let mut first = ApiObject::new(ApiKind::Module, "a");
    first.push_child(
        ApiObject::new(ApiKind::Function, "user").with_docstring("Wraps #Remote#attach."),
    );
    let mut second = ApiObject::new(ApiKind::Module, "b");
    second.push_child(ApiObject::new(ApiKind::Class, "Remote"));
    let mut forest = vec![first, second];

    let processor = CrossrefProcessor::new().with_resolver_v2(Box::new(SuiteResolver));
    let report = processor.apply(&mut forest, None).unwrap();
    assert!(report.is_empty());

    let content = content_of(&forest, 0, 0);
    assert_eq!(
        content,
        "Wraps {@link api:b.Remote :with text = \"Remote#attach\"}."
    );
    let directive = content
        .strip_prefix("Wraps ")
        .unwrap()
        .strip_suffix('.')
        .unwrap();
    let (target, options) = parse_link_directive(directive).unwrap();
    assert_eq!(target, "b.Remote");
    assert_eq!(options.text, "Remote#attach");
}

#[test]
fn report_keys_are_dot_joined_paths_one_entry_per_node() {
    let mut first = ApiObject::new(ApiKind::Module, "a");
    first.push_child(ApiObject::new(ApiKind::Class, "X").with_docstring("#MissingOne"));
    let mut second = ApiObject::new(ApiKind::Module, "b");
    second.push_child(ApiObject::new(ApiKind::Class, "Y").with_docstring("#MissingTwo"));
    let mut forest = vec![first, second];

    let report = CrossrefProcessor::new().apply(&mut forest, None).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report.entries()[0].scope_id, "a.X");
    assert_eq!(report.entries()[0].references, vec!["MissingOne"]);
    assert_eq!(report.entries()[1].scope_id, "b.Y");
    assert_eq!(report.entries()[1].references, vec!["MissingTwo"]);
}

#[test]
fn processing_twice_changes_nothing_further() {
    let mut forest = vec![module_with(
        "pkg",
        &[("Doc", "Mix of #Known and #Unknown#part, plus #Renamed~Known.")],
    )];
    let resolver = MapResolver::with(&[("Known", "/api/known")]);
    let processor = CrossrefProcessor::new();
    let first_report = processor.apply(&mut forest, Some(&resolver)).unwrap();
    assert_eq!(first_report.total(), 1);
    let after_first = content_of(&forest, 0, 0).to_string();

    let second_report = processor.apply(&mut forest, Some(&resolver)).unwrap();
    assert!(second_report.is_empty());
    assert_eq!(content_of(&forest, 0, 0), after_first);
}

#[test]
fn basic_resolver_malfunction_aborts_the_run() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#Anything")])];
    let result = CrossrefProcessor::new().apply(&mut forest, Some(&FailingResolver));
    assert!(matches!(result, Err(DocmarkError::Resolver { .. })));
}

#[test]
fn typed_resolver_malfunction_aborts_the_run() {
    let mut forest = vec![module_with("pkg", &[("Doc", "#Anything")])];
    let processor = CrossrefProcessor::new().with_resolver_v2(Box::new(FailingResolverV2));
    let result = processor.apply(&mut forest, None);
    assert!(matches!(result, Err(DocmarkError::Resolver { .. })));
}

#[test]
fn processor_run_hands_the_report_to_the_sink() {
    let sink = CollectingSink::default();
    let mut processor = CrossrefProcessor::new().with_sink(Box::new(sink.clone()));

    let mut forest = vec![module_with("pkg", &[("Doc", "#Missing")])];
    processor.process(&mut forest, None).unwrap();

    let reports = sink.0.lock();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].get("pkg.Doc").unwrap().references, vec!["Missing"]);
}

#[test]
fn fully_resolved_run_never_calls_the_sink() {
    let sink = CollectingSink::default();
    let mut processor = CrossrefProcessor::new().with_sink(Box::new(sink.clone()));

    let mut forest = vec![module_with("pkg", &[("Doc", "#Foo")])];
    let resolver = MapResolver::with(&[("Foo", "/api/foo")]);
    processor.process(&mut forest, Some(&resolver)).unwrap();

    assert!(sink.0.lock().is_empty());
    tracing::debug!("sink untouched, as expected");
}
