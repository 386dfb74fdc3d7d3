//! Black-box scenario tests against the public `Analyzer` API, each one a
//! named usage scenario rather than an encode/decode round-trip grid.

mod common;

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use common::MemoryProject;
use symbolscope::parsing::registry;
use symbolscope::Analyzer;

fn indexed(project: MemoryProject) -> Analyzer {
    let analyzer = Analyzer::new(Arc::new(project));
    analyzer.update(None, &AtomicBool::new(false)).expect("update should not be cancelled");
    analyzer
}

#[test]
fn a_two_hop_method_chain_resolves_across_declarations() {
    let source = r#"package p;
class Node {
    Leaf getLeaf() { return null; }
}
class Leaf {
    int value;
}
class User {
    void run() {
        Node n = new Node();
        int v = n.getLeaf().value;
    }
}
"#;
    let analyzer = indexed(MemoryProject::new(vec![("Node.java", source, registry::JAVA)]));
    let file = analyzer.file_id_for(Path::new("Node.java")).unwrap();
    let offset = source.find("value;").unwrap() + 1;

    let resolved = analyzer.infer_type_at(file, offset).unwrap();
    assert_eq!(resolved.fq_name(), "p.Leaf.value");
}

#[test]
fn overloaded_functions_are_distinct_definitions_by_signature() {
    let source = r#"
fn add(a: i32, b: i32) -> i32 { a + b }
fn add(a: i32, b: i32, c: i32) -> i32 { a + b + c }
"#;
    let analyzer = indexed(MemoryProject::new(vec![("lib.rs", source, registry::RUST)]));
    let overloads = analyzer.get_definitions("add");
    assert_eq!(overloads.len(), 2);

    let joined = analyzer.get_method_source("add", false).unwrap();
    assert!(joined.contains("fn add(a: i32, b: i32) -> i32"));
    assert!(joined.contains("fn add(a: i32, b: i32, c: i32) -> i32 { a + b + c }"));
}

#[test]
fn class_hierarchy_ancestors_include_indirect_bases() {
    let source = r#"
class Animal {}
class Mammal extends Animal {}
class Dog extends Mammal {}
"#;
    let analyzer = indexed(MemoryProject::new(vec![("Dog.java", source, registry::JAVA)]));
    let dog = analyzer.get_definitions("Dog").into_iter().next().unwrap();

    let direct = analyzer.get_direct_ancestors(&dog);
    assert_eq!(direct.iter().map(|u| u.fq_name()).collect::<HashSet<_>>(), HashSet::from(["Mammal".to_string()]));

    let all = analyzer.get_ancestors(&dog);
    assert_eq!(
        all.iter().map(|u| u.fq_name()).collect::<HashSet<_>>(),
        HashSet::from(["Mammal".to_string(), "Animal".to_string()])
    );
}

#[test]
fn skeleton_omits_bodies_but_keeps_signatures() {
    let source = r#"
class Calculator {
    int add(int a, int b) {
        return a + b;
    }
}
"#;
    let analyzer = indexed(MemoryProject::new(vec![("Calculator.java", source, registry::JAVA)]));
    let skeleton = analyzer.get_skeleton("Calculator").unwrap();
    assert!(skeleton.contains("class Calculator"));
    assert!(skeleton.contains("add"));
    assert!(!skeleton.contains("return a + b"));
}

#[test]
fn autocomplete_and_search_find_definitions_by_name() {
    let source = r#"
fn compute_total(items: i32) -> i32 { items }
fn compute_average(items: i32) -> i32 { items }
fn render(items: i32) -> i32 { items }
"#;
    let analyzer = indexed(MemoryProject::new(vec![("lib.rs", source, registry::RUST)]));

    let completions = analyzer.autocomplete_definitions("compute");
    let names: HashSet<String> = completions.iter().map(|u| u.identifier().to_string()).collect();
    assert_eq!(names, HashSet::from(["compute_total".to_string(), "compute_average".to_string()]));

    let matches = analyzer.search_definitions("^compute_total$");
    assert_eq!(matches.len(), 1);
}

#[test]
fn python_function_local_classes_get_distinct_dollar_joined_fqns() {
    let source = r#"
def test_function_1():
    class LocalClass:
        def method1(self):
            pass

def test_function_2():
    class LocalClass:
        def method2(self):
            pass

def test_function_3():
    class LocalClass:
        def method3(self):
            pass
"#;
    let analyzer = indexed(MemoryProject::new(vec![("local_classes.py", source, registry::PYTHON)]));

    for i in 1..=3 {
        let fqn = format!("local_classes.test_function_{i}$LocalClass");
        let classes = analyzer.get_definitions(&fqn);
        assert_eq!(classes.len(), 1, "expected exactly one {fqn}");
        let class = &classes[0];
        let children = analyzer.get_direct_children(class);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].identifier(), format!("method{i}"));
    }

    assert!(analyzer.get_definitions("local_classes.LocalClass").is_empty());
}

#[test]
fn typescript_sibling_interfaces_merge_into_one_class_unit() {
    let source = r#"
interface User {
    id: number;
}

interface User {
    name: string;
}
"#;
    let analyzer = indexed(MemoryProject::new(vec![("user.ts", source, registry::TYPESCRIPT)]));

    let definitions = analyzer.get_definitions("User");
    assert_eq!(definitions.len(), 1);
    let user = &definitions[0];
    assert!(user.is_class());
    assert_eq!(user.short_name.as_ref(), "User");

    let skeleton = analyzer.get_skeleton("User").unwrap();
    assert!(skeleton.contains("id"));
    assert!(skeleton.contains("name"));
}

#[test]
fn utf8_comment_does_not_corrupt_byte_accurate_extraction() {
    let source = "/* ═════ Helpers ═════ */\npublic class Helpers {\n    void run() {}\n}\n";
    let analyzer = indexed(MemoryProject::new(vec![("Helpers.java", source, registry::JAVA)]));

    let source_text = analyzer.get_class_source("Helpers", false).unwrap();
    assert!(source_text.starts_with("public class"));
    assert!(source_text.trim_end().ends_with('}'));
}

#[test]
fn call_receiver_extraction_across_languages() {
    let analyzer = indexed(MemoryProject::new(vec![("empty.rs", "", registry::RUST)]));

    assert_eq!(
        analyzer.extract_call_receiver(registry::JAVA, "GitRepo.sanitizeBranchName(...)"),
        Some("GitRepo".to_string())
    );
    assert_eq!(analyzer.extract_call_receiver(registry::CPP, "std::vector<int>::size"), None);
    assert_eq!(analyzer.extract_call_receiver(registry::PHP, "$this->service->doWork"), None);
    assert_eq!(analyzer.extract_call_receiver(registry::TYPESCRIPT, "Array.isArray"), Some("Array".to_string()));
    assert_eq!(analyzer.extract_call_receiver(registry::TYPESCRIPT, "console.log"), None);
}

#[test]
fn a_new_file_is_reflected_after_a_full_update_pass() {
    let first = indexed(MemoryProject::new(vec![("a.rs", "fn a() {}", registry::RUST)]));
    assert_eq!(first.get_all_declarations().len(), 1);

    let grown = indexed(MemoryProject::new(vec![("a.rs", "fn a() {}", registry::RUST), ("b.rs", "fn b() {}", registry::RUST)]));
    assert_eq!(grown.get_all_declarations().len(), 2);
}

#[test]
fn cancelling_an_update_leaves_the_previous_snapshot_untouched() {
    let analyzer = indexed(MemoryProject::new(vec![("lib.rs", "fn add() {}", registry::RUST)]));
    let before = analyzer.get_all_declarations();
    assert_eq!(before.len(), 1);

    let cancelled = AtomicBool::new(true);
    assert!(analyzer.update(None, &cancelled).is_none());

    let after = analyzer.get_all_declarations();
    assert_eq!(after, before);
}
