//! Benchmarks for matching test cases against a synthetic pass.
//!
//! Measures:
//! - In-order matching with variable propagation over growing bodies
//! - A DAG group whose members sit at the end of the body
//! - Parsing of the dump itself

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use irchecker::{match_test_case, parse_annotations, parse_dump, CheckerFile, DumpFile};

/// A dump with one pass of `n` instruction lines, each using the previous one.
fn synthetic_dump(n: usize) -> String {
    let mut source = String::from(
        "begin_compilation\n  method \"Bench.run()\"\nend_compilation\nbegin_cfg\n  name \"gvn (after)\"\n",
    );
    source.push_str("  i0 ParameterValue\n");
    for i in 1..n {
        source.push_str(&format!("  i{} Add [i{},i0]\n", i, i - 1));
    }
    source.push_str(&format!("  i{} Return [i{}]\n", n, n - 1));
    source.push_str("end_cfg\n");
    source
}

fn in_order_checker() -> CheckerFile {
    let source = "\
/// CHECK-START: Bench.run() gvn (after)
/// CHECK: <<Param:i\\d+>> ParameterValue
/// CHECK: i1 Add [{{i\\d+}},<<Param>>]
/// CHECK-NOT: Sub
/// CHECK: <<Ret:i\\d+>> Return
";
    parse_annotations("Bench.java", "CHECK", source, None).unwrap()
}

fn dag_checker(n: usize) -> CheckerFile {
    let source = format!(
        "/// CHECK-START: Bench.run() gvn (after)\n\
         /// CHECK-DAG: i{} Return\n\
         /// CHECK-DAG: i{} Add\n\
         /// CHECK-DAG: i0 ParameterValue\n",
        n,
        n - 1
    );
    parse_annotations("Bench.java", "CHECK", &source, None).unwrap()
}

fn parsed(n: usize) -> DumpFile {
    parse_dump("bench.cfg", &synthetic_dump(n)).unwrap()
}

fn bench_in_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("in_order");
    let checker = in_order_checker();
    for n in [100, 1_000, 10_000] {
        let dump = parsed(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &dump, |b, dump| {
            b.iter(|| match_test_case(black_box(&checker.test_cases[0]), black_box(&dump.passes[0])))
        });
    }
    group.finish();
}

fn bench_dag(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag");
    for n in [100, 1_000] {
        let dump = parsed(n);
        let checker = dag_checker(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &dump, |b, dump| {
            b.iter(|| match_test_case(black_box(&checker.test_cases[0]), black_box(&dump.passes[0])))
        });
    }
    group.finish();
}

fn bench_parse_dump(c: &mut Criterion) {
    let source = synthetic_dump(10_000);
    c.bench_function("parse_dump_10k", |b| {
        b.iter(|| parse_dump("bench.cfg", black_box(&source)))
    });
}

criterion_group!(benches, bench_in_order, bench_dag, bench_parse_dump);
criterion_main!(benches);
