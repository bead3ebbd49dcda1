//! Benchmark suite for parqsql's pipeline: parsing and end-to-end execution
//! against an in-memory reader.
//!
//! Run with: `cargo bench`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use parqsql::{execute, parse, InMemoryReader, Row, Value};

const SIMPLE_SELECT: &str = "SELECT * FROM people";

const SELECT_WITH_WHERE: &str =
    "SELECT id, name, age FROM people WHERE age > 18 AND name LIKE 'a%'";

const SELECT_WITH_JOIN: &str = "SELECT p.name, o.total \
    FROM people p \
    JOIN orders o ON p.id = o.person_id \
    WHERE o.total > 100 \
    ORDER BY o.total DESC \
    LIMIT 50";

const AGGREGATION: &str = "SELECT department, COUNT(*) AS emp_count, \
    AVG(salary) AS avg_salary, MAX(salary) AS max_salary \
    FROM employees \
    GROUP BY department \
    HAVING COUNT(*) > 1 \
    ORDER BY avg_salary DESC";

const CTE_QUERY: &str = "WITH active AS ( \
        SELECT id, name FROM people WHERE age > 18 \
    ) \
    SELECT name FROM active ORDER BY name";

const WINDOW_FUNCTION: &str = "SELECT name, department, salary, \
    ROW_NUMBER() OVER (PARTITION BY department ORDER BY salary DESC) AS rnk, \
    AVG(salary) OVER (PARTITION BY department) AS dept_avg \
    FROM employees";

const SUBQUERY: &str = "SELECT name FROM people \
    WHERE id IN (SELECT person_id FROM orders WHERE total > 500) \
    AND EXISTS (SELECT 1 FROM orders WHERE orders.total > 10)";

const CASE_EXPRESSION: &str = "SELECT name, \
    CASE \
        WHEN age > 60 THEN 'senior' \
        WHEN age > 30 THEN 'adult' \
        ELSE 'young' \
    END AS bracket \
    FROM people";

const PARSE_CASES: &[(&str, &str)] = &[
    ("simple_select", SIMPLE_SELECT),
    ("select_where", SELECT_WITH_WHERE),
    ("select_join", SELECT_WITH_JOIN),
    ("aggregation", AGGREGATION),
    ("cte", CTE_QUERY),
    ("window_function", WINDOW_FUNCTION),
    ("subquery", SUBQUERY),
    ("case_expression", CASE_EXPRESSION),
];

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    for (name, sql) in PARSE_CASES {
        group.bench_with_input(BenchmarkId::new("parse", name), sql, |b, sql| {
            b.iter(|| parse(black_box(sql)).unwrap());
        });
    }
    group.finish();
}

fn row(pairs: &[(&str, Value)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn fixture_reader() -> Arc<InMemoryReader> {
    let people = (0..500)
        .map(|i| {
            row(&[
                ("id", Value::Int(i)),
                ("name", Value::Str(format!("person-{i}"))),
                ("age", Value::Int(18 + (i % 50))),
            ])
        })
        .collect();
    let orders = (0..500)
        .map(|i| {
            row(&[
                ("person_id", Value::Int(i % 500)),
                ("total", Value::Int((i * 7) % 1000)),
            ])
        })
        .collect();
    let employees = (0..200)
        .map(|i| {
            row(&[
                ("name", Value::Str(format!("emp-{i}"))),
                ("department", Value::Str(format!("dept-{}", i % 5))),
                ("salary", Value::Int(40_000 + (i * 137) % 80_000)),
            ])
        })
        .collect();

    Arc::new(
        InMemoryReader::new()
            .with_table("people", people)
            .with_table("orders", orders)
            .with_table("employees", employees),
    )
}

fn bench_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("execution");
    let reader = fixture_reader();

    for (name, sql) in PARSE_CASES {
        let query = parse(sql).unwrap();
        group.bench_with_input(BenchmarkId::new("execute", name), &query, |b, query| {
            b.iter(|| execute(black_box(query), reader.clone()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parsing, bench_execution);
criterion_main!(benches);
