use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use station_map::models::{BindingRow, RawBinding, Srid, StationType};
use station_map::services::{CountryLookup, Predicate, Projection, StationParser, Stations};

/// A few thousand point stations on a coarse grid so that roughly one in
/// four shares its position with another station.
fn synthetic_rows(count: usize) -> Vec<BindingRow> {
    (0..count)
        .map(|i| {
            let cell = i - i / 4;
            let lat = 40.0 + (cell % 50) as f64 * 0.5;
            let lon = -10.0 + (cell / 50) as f64 * 0.5;
            let theme = ["AS", "ES", "OS"][i % 3];
            [
                ("s", RawBinding::uri(format!("http://example.org/station/{}", i))),
                ("Id", RawBinding::literal(format!("ST-{}", i))),
                ("Name", RawBinding::literal(format!("Station {}", i))),
                ("themeShort", RawBinding::literal(theme)),
                ("Country", RawBinding::literal(if i % 2 == 0 { "SE" } else { "FR" })),
                ("PI_names", RawBinding::literal("Smith;Adams;Jones")),
                ("lat", RawBinding::typed(lat.to_string(), "double")),
                ("lon", RawBinding::typed(lon.to_string(), "double")),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
        })
        .collect()
}

fn benchmark_pipeline(c: &mut Criterion) {
    let countries: CountryLookup = [("SE", "Sweden"), ("FR", "France")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let rows = synthetic_rows(4000);
    let parser = StationParser::new(
        countries,
        Some(Projection::for_srid(Srid::Laea).transform_fn()),
    );

    let mut group = c.benchmark_group("station_pipeline");

    group.bench_function("parse_4000_rows", |b| {
        b.iter(|| parser.parse(black_box(&rows)))
    });

    let stations = Stations::new(parser.parse(&rows).expect("synthetic rows parse"));
    let points = Predicate::of_type(StationType::Point);

    group.bench_function("duplicates_4000_points", |b| {
        b.iter(|| stations.get_duplicates(black_box(&points)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
