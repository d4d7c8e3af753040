//! End-to-end tests over on-disk C corpora: directory loading,
//! cross-file linking, resolution, and usage search.

use cnav::coord::Coordinate;
use cnav::engine::Engine;
use std::fs;
use std::path::Path;

fn write_corpus(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

fn abs(dir: &Path, name: &str) -> String {
    fs::canonicalize(dir.join(name))
        .unwrap()
        .to_string_lossy()
        .to_string()
}

const DEF1_H: &str = "\
struct Employee {
    char name[20];
    int id;
};
";

const DEF2_H: &str = "\
#include \"def1.h\"

struct Organization {
    struct Employee emp;
};
";

const MAIN_C: &str = "\
#include \"def2.h\"

int main() {
    struct Organization org;
    org.emp.name;
    org.emp.id;
}
";

fn chain_corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(
        dir.path(),
        &[("def1.h", DEF1_H), ("def2.h", DEF2_H), ("main.c", MAIN_C)],
    );
    dir
}

#[test]
fn scans_directory_and_skips_excluded() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(
        dir.path(),
        &[
            ("def1.h", DEF1_H),
            ("def2.h", DEF2_H),
            ("main.c", MAIN_C),
            ("README.md", "not C\n"),
            ("vendor/zlib.c", "int deflate;\n"),
        ],
    );

    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &["vendor".to_string()]);

    assert_eq!(engine.unit_count(), 3);
    assert!(
        engine
            .unit_paths()
            .all(|p| !p.contains("vendor") && !p.ends_with("README.md"))
    );
}

#[test]
fn resolves_chain_across_files_after_cross_link() {
    let dir = chain_corpus();
    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);

    let main_c = abs(dir.path(), "main.c");
    let def1_h = abs(dir.path(), "def1.h");

    // The chain crosses two headers; without a cross-link pass the
    // organization type is unknown in main.c.
    assert_eq!(engine.resolve(&Coordinate::new(&main_c, 4, 4)), None);

    engine.cross_link();

    assert_eq!(
        engine.resolve(&Coordinate::new(&main_c, 4, 4)),
        Some(Coordinate::new(&def1_h, 1, 9))
    );
    assert_eq!(
        engine.resolve(&Coordinate::new(&main_c, 5, 4)),
        Some(Coordinate::new(&def1_h, 2, 8))
    );
}

#[test]
fn cross_link_records_are_queryable_and_stable() {
    let dir = chain_corpus();
    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);

    let first = engine.cross_link();
    let recorded = engine.cross_links().len();
    assert_eq!(first.links, recorded);
    assert!(recorded > 0);
    assert_eq!(first.units, 3);

    // Re-running from scratch reproduces the same log.
    let second = engine.cross_link();
    assert_eq!(second.links, recorded);
    assert_eq!(engine.cross_links().len(), recorded);

    // Every recorded definition is a named scope the symbol now jumps to.
    for link in engine.cross_links() {
        let arena = engine.arena();
        assert_eq!(arena.node(link.symbol).jump_to, Some(link.definition));
        assert_eq!(
            arena.node(link.definition).kind,
            cnav::NodeKind::NamedScope
        );
    }
}

#[test]
fn usages_of_a_type_are_the_symbols_it_defines() {
    let dir = chain_corpus();
    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);
    engine.cross_link();

    let def1_h = abs(dir.path(), "def1.h");
    let def2_h = abs(dir.path(), "def2.h");

    // struct Employee starts at the top of def1.h.
    let mut usages = engine.find_usages(&Coordinate::new(&def1_h, 0, 0));
    usages.sort_by_key(|c| (c.path.clone(), c.line, c.column));

    // Both the type-reference and the declared field in def2.h carry
    // type Employee.
    assert_eq!(
        usages,
        vec![
            Coordinate::new(&def2_h, 3, 4),
            Coordinate::new(&def2_h, 3, 20),
        ]
    );

    // Left-inverse: each usage's jump_to lands back on the queried type.
    let employee = engine.node_at(&Coordinate::new(&def1_h, 0, 0)).unwrap();
    assert_eq!(engine.arena().node(employee).name, "Employee");
    for usage in &usages {
        let symbol = engine.node_at(usage).unwrap();
        assert_eq!(engine.arena().node(symbol).jump_to, Some(employee));
    }
}

#[test]
fn usages_of_a_symbol_match_reference_segments() {
    let dir = chain_corpus();
    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);
    engine.cross_link();

    let def1_h = abs(dir.path(), "def1.h");
    let main_c = abs(dir.path(), "main.c");

    // The `name` field declaration in def1.h.
    let usages = engine.find_usages(&Coordinate::new(&def1_h, 1, 9));
    assert_eq!(usages, vec![Coordinate::new(&main_c, 4, 4)]);
}

#[test]
fn header_definitions_come_from_companion_source() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(
        dir.path(),
        &[
            (
                "def1.h",
                "struct Holder {\n    struct Employee emp;\n};\n",
            ),
            (
                "def1.c",
                "#include \"def1.h\"\n\nstruct Employee {\n    int id;\n};\n",
            ),
            (
                "main.c",
                "#include \"def1.h\"\n\nint main() {\n    struct Holder h;\n    h.emp.id;\n}\n",
            ),
        ],
    );

    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);
    engine.cross_link();

    let def1_h = abs(dir.path(), "def1.h");
    let def1_c = abs(dir.path(), "def1.c");
    let main_c = abs(dir.path(), "main.c");

    assert_eq!(engine.companion_source(&def1_h), Some(def1_c.as_str()));

    // `h.emp.id` walks Holder (def1.h) then Employee (def1.c).
    assert_eq!(
        engine.resolve(&Coordinate::new(&main_c, 4, 4)),
        Some(Coordinate::new(&def1_c, 3, 8))
    );
}

#[test]
fn include_cycle_terminates_and_still_resolves() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(
        dir.path(),
        &[
            (
                "a.h",
                "#include \"b.h\"\n\nstruct Alpha {\n    int x;\n};\n",
            ),
            (
                "b.h",
                "#include \"a.h\"\n\nstruct Beta {\n    int y;\n};\n",
            ),
            (
                "main.c",
                "#include \"a.h\"\n\nint main() {\n    struct Alpha av;\n    av.x;\n}\n",
            ),
        ],
    );

    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);
    let stats = engine.cross_link();
    assert_eq!(stats.units, 3);

    let a_h = abs(dir.path(), "a.h");
    let main_c = abs(dir.path(), "main.c");
    assert_eq!(
        engine.resolve(&Coordinate::new(&main_c, 4, 4)),
        Some(Coordinate::new(&a_h, 3, 8))
    );
}

#[test]
fn load_failures_are_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path(), &[("ok.c", "int x;\n")]);

    let mut engine = Engine::new().unwrap();
    assert!(!engine.load_file(&dir.path().join("missing.c")));
    assert!(!engine.load_file(dir.path()));
    assert!(engine.load_file(&dir.path().join("ok.c")));
    assert_eq!(engine.unit_count(), 1);
}

#[test]
fn reload_replaces_the_unit_and_rebuilds_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("lib.c");
    fs::write(&file, "struct First {\n    int a;\n};\n").unwrap();

    let mut engine = Engine::new().unwrap();
    assert!(engine.load_file(&file));
    assert_eq!(engine.unit_count(), 1);

    fs::write(&file, "struct Second {\n    int b;\n};\n\nstruct Second s;\n").unwrap();
    assert!(engine.load_file(&file));
    assert_eq!(engine.unit_count(), 1);

    engine.cross_link();

    let lib_c = abs(dir.path(), "lib.c");
    let defs = engine.exported_definitions(&lib_c);
    assert_eq!(defs.len(), 1);
    assert_eq!(engine.arena().node(defs[0]).name, "Second");

    // The declared variable resolves against the reloaded tree.
    let usages = engine.find_usages(&Coordinate::new(&lib_c, 0, 0));
    assert!(!usages.is_empty());
}

#[test]
fn imports_and_import_resolution() {
    let dir = chain_corpus();
    let mut engine = Engine::new().unwrap();
    engine.load_directory(dir.path(), &[]);

    let def2_h = abs(dir.path(), "def2.h");
    let def1_h = abs(dir.path(), "def1.h");

    assert_eq!(engine.imports_for_unit(&def2_h), vec!["def1.h".to_string()]);
    assert_eq!(engine.resolve_import("def1.h"), Some(def1_h));
    assert_eq!(engine.resolve_import("elsewhere.h"), None);
}
