//! Compiler benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tego_aterm::read;
use tego_compiler::ir::{Exp, StrategyType, Type};
use tego_compiler::{compile_units, CompilerConfig, NoopClassWriter, Normalizer, TegoCompiler};

/// A module of `count` strategies, each evaluating its parameter twice
fn generate_module(name: &str, count: usize) -> String {
    let s0 = "STRATEGY([], ANY(), ANY())";
    let s1 = format!("STRATEGY([{}], ANY(), ANY())", s0);
    let mut items = Vec::with_capacity(count * 2);
    for i in 0..count {
        let var = |n: &str, ty: &str| format!("Var(\"{}\"){{OfType({})}}", n, ty);
        let inner = format!("Eval({}, {}){{OfType(ANY())}}", var("p", s0), var("x", "ANY()"));
        let body = format!("Eval({}, {}){{OfType(ANY())}}", var("p", s0), inner);
        items.push(format!(
            "StrategyDecl([], \"s{i}\"){{OfType({s1}), OfDecl(Ref(){{TermIndex(\"bench.tego\", {i})}})}}"
        ));
        items.push(format!(
            "StrategyDef(\"s{i}\", [ParamDef(\"p\")], \"x\", {body}){{OfRef(Ref(){{TermIndex(\"bench.tego\", {i})}})}}"
        ));
    }
    format!("Module(\"{}\", [{}])", name, items.join(",\n  "))
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for count in [10, 100] {
        let term = read(&generate_module("bench/mod", count)).unwrap();
        let compiler = TegoCompiler::new(CompilerConfig::default());
        group.bench_with_input(BenchmarkId::new("module", count), &term, |b, term| {
            b.iter(|| compiler.compile_term(black_box(term)).unwrap())
        });
    }
    group.finish();
}

fn bench_units(c: &mut Criterion) {
    let units: Vec<_> = (0..16)
        .map(|i| read(&generate_module(&format!("bench/unit{}", i), 20)).unwrap())
        .collect();
    let config = CompilerConfig::default();
    c.bench_function("units_parallel", |b| {
        b.iter(|| compile_units(black_box(&units), &config, &NoopClassWriter))
    });
}

fn bench_normalize(c: &mut Criterion) {
    let s0 = Type::Strategy(StrategyType::new(vec![], Type::Any, Type::Any));
    let mut exp = Exp::var("x", Type::Any);
    for _ in 0..500 {
        exp = Exp::eval(Exp::var("s", s0.clone()), exp, Type::Any);
    }
    c.bench_function("normalize_nested_eval", |b| {
        b.iter(|| Normalizer::new().normalize(black_box(exp.clone())).unwrap())
    });
}

criterion_group!(benches, bench_compile, bench_units, bench_normalize);
criterion_main!(benches);
